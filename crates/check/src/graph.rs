//! Structural validation of a workflow document.
//!
//! Cross-references between the document's sections: every transition
//! endpoint, critical-path entry, and mutual-exclusion member must name
//! a declared state, and the critical path must not repeat a slot.

use std::collections::BTreeSet;

use serde::Serialize;
use signalbox_engine::types::Workflow;

/// Structure result for one workflow.
#[derive(Debug, Clone, Serialize)]
pub struct GraphResult {
    pub state_count: usize,
    pub transition_count: usize,
    /// Transition endpoints naming undeclared states, as
    /// `"<transition>: <state>"`.
    pub dangling_endpoints: Vec<String>,
    pub undeclared_critical_path: BTreeSet<String>,
    pub duplicate_critical_path: Vec<String>,
    pub undeclared_exclusive: BTreeSet<String>,
    /// Alternates that are themselves critical-path slots.
    pub overlapping_exclusive: BTreeSet<String>,
}

/// Validate the workflow's internal cross-references.
pub fn check_structure(workflow: &Workflow) -> GraphResult {
    let mut dangling_endpoints = Vec::new();
    for transition in workflow.transitions() {
        let name = if transition.name.is_empty() {
            "(unnamed)"
        } else {
            transition.name.as_str()
        };
        for endpoint in [&transition.source, &transition.target] {
            if !workflow.has_state(endpoint) {
                dangling_endpoints.push(format!("{}: {}", name, endpoint));
            }
        }
    }

    let mut undeclared_critical_path = BTreeSet::new();
    let mut duplicate_critical_path = Vec::new();
    let mut seen = BTreeSet::new();
    for state in workflow.critical_path() {
        if !workflow.has_state(state) {
            undeclared_critical_path.insert(state.clone());
        }
        if !seen.insert(state.as_str()) {
            duplicate_critical_path.push(state.clone());
        }
    }

    let slots: BTreeSet<&str> = workflow.critical_path().iter().map(|s| s.as_str()).collect();
    let mut undeclared_exclusive = BTreeSet::new();
    let mut overlapping_exclusive = BTreeSet::new();
    for (anchor, alternates) in workflow.mutually_exclusive() {
        if !workflow.has_state(anchor) {
            undeclared_exclusive.insert(anchor.clone());
        }
        for alternate in alternates {
            if !workflow.has_state(alternate) {
                undeclared_exclusive.insert(alternate.clone());
            }
            if slots.contains(alternate.as_str()) {
                overlapping_exclusive.insert(alternate.clone());
            }
        }
    }

    GraphResult {
        state_count: workflow.states().len(),
        transition_count: workflow.transitions().len(),
        dangling_endpoints,
        undeclared_critical_path,
        duplicate_critical_path,
        undeclared_exclusive,
        overlapping_exclusive,
    }
}
