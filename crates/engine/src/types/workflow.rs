//! Runtime view of a deposit workflow document.
//!
//! A [`Workflow`] wraps a parsed document with the lookups reconciliation
//! actually performs: label and kind by status name, and critical-path
//! slot membership including mutually-exclusive alternates. The graph is
//! loaded once at startup and is read-only afterwards.

use std::collections::BTreeMap;

use signalbox_wire::{StateKind, WorkflowDoc};

/// One named state, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDef {
    pub label: String,
    pub kind: StateKind,
}

/// One directed edge of the status graph.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDef {
    pub source: String,
    pub target: String,
    pub name: String,
    pub user_triggered: bool,
    pub requires_job: bool,
}

/// A deposit workflow: status graph, ordered critical path, and the
/// mutual-exclusion table grouping statuses into rendered slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    states: BTreeMap<String, StateDef>,
    transitions: Vec<TransitionDef>,
    critical_path: Vec<String>,
    mutually_exclusive: BTreeMap<String, Vec<String>>,
}

impl Workflow {
    pub fn new(doc: WorkflowDoc) -> Self {
        let states = doc
            .states
            .into_iter()
            .map(|(name, state)| {
                (
                    name,
                    StateDef {
                        label: state.label,
                        kind: state.kind,
                    },
                )
            })
            .collect();

        let transitions = doc
            .transitions
            .into_iter()
            .map(|t| TransitionDef {
                source: t.source,
                target: t.target,
                name: t.name,
                user_triggered: t.user_triggered,
                requires_job: t.requires_job,
            })
            .collect();

        Workflow {
            states,
            transitions,
            critical_path: doc.critical_path,
            mutually_exclusive: doc.mutually_exclusive,
        }
    }

    pub fn has_state(&self, status: &str) -> bool {
        self.states.contains_key(status)
    }

    /// Display label for a status; falls back to the raw status name for
    /// anything the document does not define.
    pub fn label<'a>(&'a self, status: &'a str) -> &'a str {
        self.states
            .get(status)
            .map(|s| s.label.as_str())
            .unwrap_or(status)
    }

    /// Rendering kind for a status; unknown statuses read as `Normal`.
    pub fn kind(&self, status: &str) -> StateKind {
        self.states
            .get(status)
            .map(|s| s.kind)
            .unwrap_or(StateKind::Normal)
    }

    pub fn states(&self) -> &BTreeMap<String, StateDef> {
        &self.states
    }

    pub fn transitions(&self) -> &[TransitionDef] {
        &self.transitions
    }

    pub fn critical_path(&self) -> &[String] {
        &self.critical_path
    }

    pub fn mutually_exclusive(&self) -> &BTreeMap<String, Vec<String>> {
        &self.mutually_exclusive
    }

    /// The statuses occupying critical-path slot `index`: the slot's own
    /// status first, then its mutually-exclusive alternates in table order.
    pub fn slot_members(&self, index: usize) -> Vec<&str> {
        let Some(anchor) = self.critical_path.get(index) else {
            return Vec::new();
        };
        let mut members = vec![anchor.as_str()];
        if let Some(alternates) = self.mutually_exclusive.get(anchor) {
            for alternate in alternates {
                if !members.contains(&alternate.as_str()) {
                    members.push(alternate.as_str());
                }
            }
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalbox_wire::parse_workflow_doc;
    use serde_json::json;

    fn sample() -> Workflow {
        let doc = parse_workflow_doc(&json!({
            "states": {
                "A": {"label": "First"},
                "B": {"label": "Second"},
                "B_FAILED": {"label": "Second Failed", "kind": "failure"}
            },
            "transitions": [
                {"sourceStateName": "A", "targetStateName": "B", "name": "advance"},
                {"sourceStateName": "A", "targetStateName": "B_FAILED", "name": "fail"}
            ],
            "criticalPath": ["A", "B"],
            "mutuallyExclusive": {"B": ["B_FAILED"]}
        }))
        .unwrap();
        Workflow::new(doc)
    }

    #[test]
    fn lookups_cover_known_and_unknown_statuses() {
        let workflow = sample();
        assert!(workflow.has_state("B_FAILED"));
        assert!(!workflow.has_state("C"));
        assert_eq!(workflow.label("B"), "Second");
        assert_eq!(workflow.label("C"), "C");
        assert_eq!(workflow.kind("B_FAILED"), StateKind::Failure);
        assert_eq!(workflow.kind("C"), StateKind::Normal);
    }

    #[test]
    fn slot_members_include_alternates_in_order() {
        let workflow = sample();
        assert_eq!(workflow.slot_members(0), vec!["A"]);
        assert_eq!(workflow.slot_members(1), vec!["B", "B_FAILED"]);
        assert!(workflow.slot_members(7).is_empty());
    }
}
