//! Startup validation for the deposit workflow configuration.
//!
//! Reconciliation trusts its workflow document and status mapping tables
//! completely, so every cross-reference between them is verified once at
//! startup instead of surfacing later as a silently ignored tracker row.
//! Each check is a separate module producing a serializable result
//! struct; [`check_workflow`] orchestrates all of them and aggregates
//! results into a [`CheckReport`].

pub mod graph;
pub mod mappings;
pub mod reachability;
pub mod report;

pub use graph::{check_structure, GraphResult};
pub use mappings::{check_mappings, MappingsResult, StatusMappings};
pub use reachability::{check_reachability, ReachabilityResult};
pub use report::{CheckReport, Finding, FindingSeverity};

use signalbox_engine::types::Workflow;

/// Run the full startup check suite against a parsed workflow.
///
/// Runs every check, extracts findings, and returns the aggregated
/// report. Callers gate deployment on [`CheckReport::ok`].
pub fn check_workflow(workflow: &Workflow, mappings: &StatusMappings) -> CheckReport {
    let graph = graph::check_structure(workflow);
    let reachability = reachability::check_reachability(workflow);
    let mapping_result = mappings::check_mappings(workflow, mappings);

    let mut report = CheckReport::new();
    report.graph = Some(graph);
    report.reachability = Some(reachability);
    report.mappings = Some(mapping_result);
    report.checks_run = vec![
        "graph".to_string(),
        "reachability".to_string(),
        "mappings".to_string(),
    ];

    report.extract_findings();

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalbox_wire::parse_workflow_doc;
    use serde_json::json;

    fn make_workflow() -> Workflow {
        let doc = parse_workflow_doc(&json!({
            "states": {
                "QUEUED": {"label": "Queued"},
                "CONFIRMED": {"label": "Confirmed"},
                "COMPLETE": {"label": "Complete"}
            },
            "transitions": [
                {"sourceStateName": "QUEUED", "targetStateName": "CONFIRMED", "name": "confirm"},
                {"sourceStateName": "CONFIRMED", "targetStateName": "COMPLETE", "name": "finish"}
            ],
            "criticalPath": ["QUEUED", "CONFIRMED", "COMPLETE"]
        }))
        .unwrap();
        Workflow::new(doc)
    }

    #[test]
    fn full_suite_populates_every_result() {
        let workflow = make_workflow();
        let mappings = StatusMappings {
            tracker: &[("received", "CONFIRMED"), ("complete", "COMPLETE")],
            internal: &["QUEUED"],
        };

        let report = check_workflow(&workflow, &mappings);
        assert!(report.graph.is_some());
        assert!(report.reachability.is_some());
        assert!(report.mappings.is_some());
        assert_eq!(report.checks_run.len(), 3);
        assert!(report.ok());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn report_serializes_to_json() {
        let workflow = make_workflow();
        let mappings = StatusMappings {
            tracker: &[("received", "CONFIRMED"), ("complete", "COMPLETE")],
            internal: &["QUEUED"],
        };

        let report = check_workflow(&workflow, &mappings);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.is_object());
        assert!(json.get("checks_run").unwrap().is_array());
    }
}
