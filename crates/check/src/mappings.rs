//! Coverage of the tracker-status vocabulary against the workflow.
//!
//! Every declared workflow state must be either the target of a tracker
//! mapping or named on the internal-state list (states the deposit
//! pipeline enters on its own, never from polled rows). A state with
//! neither could only be reached by hand, and a tracker cell mapped
//! twice makes the resolver's answer depend on table order.

use std::collections::BTreeSet;

use serde::Serialize;
use signalbox_engine::types::Workflow;

/// The status vocabulary under check.
#[derive(Debug, Clone, Copy)]
pub struct StatusMappings<'a> {
    /// Tracker vocabulary cells paired with their workflow status targets.
    pub tracker: &'a [(&'a str, &'a str)],
    /// States the pipeline sets itself, exempt from tracker coverage.
    pub internal: &'a [&'a str],
}

/// Mapping-coverage result for one workflow.
#[derive(Debug, Clone, Serialize)]
pub struct MappingsResult {
    pub covered_states: BTreeSet<String>,
    /// Declared states neither mapped from the tracker nor internal.
    pub uncovered_states: BTreeSet<String>,
    /// Mapping targets the workflow does not declare.
    pub unknown_targets: BTreeSet<String>,
    /// Tracker cells mapped more than once, compared case-insensitively.
    pub duplicate_cells: Vec<String>,
    /// Internal entries the workflow does not declare.
    pub stale_internal: BTreeSet<String>,
}

/// Check that the tracker mapping and the internal-state list together
/// cover every declared state, and that neither names a state the
/// workflow lacks.
pub fn check_mappings(workflow: &Workflow, mappings: &StatusMappings) -> MappingsResult {
    let mut duplicate_cells = Vec::new();
    let mut seen_cells: BTreeSet<String> = BTreeSet::new();
    for (cell, _) in mappings.tracker {
        // Folded the same way the resolver folds incoming rows.
        if !seen_cells.insert(cell.trim().to_ascii_lowercase()) {
            duplicate_cells.push((*cell).to_string());
        }
    }

    let mut covered = BTreeSet::new();
    let mut unknown_targets = BTreeSet::new();
    for (_, target) in mappings.tracker {
        if workflow.has_state(target) {
            covered.insert((*target).to_string());
        } else {
            unknown_targets.insert((*target).to_string());
        }
    }

    let mut stale_internal = BTreeSet::new();
    for state in mappings.internal {
        if workflow.has_state(state) {
            covered.insert((*state).to_string());
        } else {
            stale_internal.insert((*state).to_string());
        }
    }

    let uncovered_states = workflow
        .states()
        .keys()
        .filter(|state| !covered.contains(*state))
        .cloned()
        .collect();

    MappingsResult {
        covered_states: covered,
        uncovered_states,
        unknown_targets,
        duplicate_cells,
        stale_internal,
    }
}
