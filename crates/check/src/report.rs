//! CheckReport -- aggregated output from the startup checks.
//!
//! The report collects each check's result and extracts notable findings
//! for log and CLI display. Errors mean the configuration must not be
//! deployed; warnings are suspicious but survivable.

use serde::Serialize;

use crate::graph::GraphResult;
use crate::mappings::MappingsResult;
use crate::reachability::ReachabilityResult;

/// Severity level for a startup finding.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum FindingSeverity {
    Warning,
    Error,
}

/// A notable finding from the startup checks.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub check: String,
    pub severity: FindingSeverity,
    pub message: String,
    /// State or vocabulary entry the finding is about, when one applies.
    pub subject: Option<String>,
    pub details: Option<serde_json::Value>,
}

/// Aggregated startup report containing all check results and findings.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub graph: Option<GraphResult>,
    pub reachability: Option<ReachabilityResult>,
    pub mappings: Option<MappingsResult>,
    pub checks_run: Vec<String>,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn new() -> Self {
        CheckReport {
            graph: None,
            reachability: None,
            mappings: None,
            checks_run: Vec::new(),
            findings: Vec::new(),
        }
    }

    /// True when no finding is an error. Warnings do not block startup.
    pub fn ok(&self) -> bool {
        !self
            .findings
            .iter()
            .any(|f| f.severity == FindingSeverity::Error)
    }

    /// Extract findings from populated check results.
    pub fn extract_findings(&mut self) {
        self.findings.clear();

        if let Some(ref graph) = self.graph {
            for endpoint in &graph.dangling_endpoints {
                self.findings.push(Finding {
                    check: "graph".to_string(),
                    severity: FindingSeverity::Error,
                    message: format!("transition endpoint names an undeclared state: {}", endpoint),
                    subject: Some(endpoint.clone()),
                    details: None,
                });
            }
            for state in &graph.undeclared_critical_path {
                self.findings.push(Finding {
                    check: "graph".to_string(),
                    severity: FindingSeverity::Error,
                    message: format!("critical path names an undeclared state '{}'", state),
                    subject: Some(state.clone()),
                    details: None,
                });
            }
            for state in &graph.duplicate_critical_path {
                self.findings.push(Finding {
                    check: "graph".to_string(),
                    severity: FindingSeverity::Error,
                    message: format!("critical path lists '{}' more than once", state),
                    subject: Some(state.clone()),
                    details: None,
                });
            }
            for state in &graph.undeclared_exclusive {
                self.findings.push(Finding {
                    check: "graph".to_string(),
                    severity: FindingSeverity::Error,
                    message: format!(
                        "mutual-exclusion table names an undeclared state '{}'",
                        state
                    ),
                    subject: Some(state.clone()),
                    details: None,
                });
            }
            for state in &graph.overlapping_exclusive {
                self.findings.push(Finding {
                    check: "graph".to_string(),
                    severity: FindingSeverity::Warning,
                    message: format!(
                        "'{}' is both a critical-path slot and another slot's alternate",
                        state
                    ),
                    subject: Some(state.clone()),
                    details: None,
                });
            }
        }

        if let Some(ref reach) = self.reachability {
            match &reach.entry_state {
                Some(entry) => {
                    if !reach.unreachable_states.is_empty() {
                        let dead: Vec<String> =
                            reach.unreachable_states.iter().cloned().collect();
                        self.findings.push(Finding {
                            check: "reachability".to_string(),
                            severity: FindingSeverity::Warning,
                            message: format!(
                                "{} state(s) unreachable from '{}': {}",
                                dead.len(),
                                entry,
                                dead.join(", ")
                            ),
                            subject: None,
                            details: Some(serde_json::json!({ "unreachable_states": dead })),
                        });
                    }
                }
                None => {
                    self.findings.push(Finding {
                        check: "reachability".to_string(),
                        severity: FindingSeverity::Warning,
                        message: "workflow has no critical path; reachability not checked"
                            .to_string(),
                        subject: None,
                        details: None,
                    });
                }
            }
        }

        if let Some(ref mappings) = self.mappings {
            for target in &mappings.unknown_targets {
                self.findings.push(Finding {
                    check: "mappings".to_string(),
                    severity: FindingSeverity::Error,
                    message: format!(
                        "status mapping targets '{}', which the workflow does not declare",
                        target
                    ),
                    subject: Some(target.clone()),
                    details: None,
                });
            }
            for state in &mappings.uncovered_states {
                self.findings.push(Finding {
                    check: "mappings".to_string(),
                    severity: FindingSeverity::Error,
                    message: format!(
                        "workflow state '{}' has no tracker mapping and is not declared internal; \
                         rows reaching it would be silently ignored",
                        state
                    ),
                    subject: Some(state.clone()),
                    details: None,
                });
            }
            for cell in &mappings.duplicate_cells {
                self.findings.push(Finding {
                    check: "mappings".to_string(),
                    severity: FindingSeverity::Error,
                    message: format!("tracker vocabulary '{}' is mapped more than once", cell),
                    subject: Some(cell.clone()),
                    details: None,
                });
            }
            for state in &mappings.stale_internal {
                self.findings.push(Finding {
                    check: "mappings".to_string(),
                    severity: FindingSeverity::Warning,
                    message: format!(
                        "internal-state list names '{}', which the workflow does not declare",
                        state
                    ),
                    subject: Some(state.clone()),
                    details: None,
                });
            }
        }
    }
}

impl Default for CheckReport {
    fn default() -> Self {
        CheckReport::new()
    }
}
