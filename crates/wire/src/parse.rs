//! Parsing from boundary JSON into the typed shapes in [`crate::types`].
//!
//! Each entry point takes a `&serde_json::Value` and either produces a fully
//! populated struct or a [`WireError`]. The rule of thumb: third-party
//! signals (notices, tracker rows, email) are parsed leniently, requiring
//! only the skeleton the reconciliation rules depend on; curated
//! configuration (workflow documents) is parsed strictly.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{
    Envelope, InboundEmail, StageNotice, StateDoc, StateKind, TrackerRow, TransitionDoc,
    WorkflowDoc,
};

/// Errors raised while parsing boundary JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A required field is absent.
    MissingField { field: String },
    /// A field is present but malformed.
    InvalidField { field: String, message: String },
    /// The document as a whole has the wrong shape.
    InvalidDocument(String),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::MissingField { field } => {
                write!(f, "missing required field: '{}'", field)
            }
            WireError::InvalidField { field, message } => {
                write!(f, "invalid field '{}': {}", field, message)
            }
            WireError::InvalidDocument(msg) => {
                write!(f, "invalid document: {}", msg)
            }
        }
    }
}

impl std::error::Error for WireError {}

// ── Shared helpers ──────────────────────────────────────────────────

fn required_str(obj: &serde_json::Value, field: &str) -> Result<String, WireError> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| WireError::MissingField {
            field: field.to_string(),
        })
}

fn opt_str(obj: &serde_json::Value, field: &str) -> Option<String> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Read a field that some producers send as a string and others as a
/// number (manuscript numbers, request ids).
fn opt_str_or_number(obj: &serde_json::Value, field: &str) -> Option<String> {
    match obj.get(field)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn opt_count(obj: &serde_json::Value, field: &str) -> Option<u64> {
    obj.get(field).and_then(|v| v.as_u64())
}

fn as_object<'a>(
    value: &'a serde_json::Value,
    what: &str,
) -> Result<&'a serde_json::Map<String, serde_json::Value>, WireError> {
    value
        .as_object()
        .ok_or_else(|| WireError::InvalidDocument(format!("{} must be a JSON object", what)))
}

// ── Integrity-check notices ─────────────────────────────────────────

/// Parse a status notification from the image-integrity service.
///
/// Only `state` is required. The raw payload is retained on the result so
/// the caller can append it to the matching stage's audit trail.
pub fn parse_stage_notice(value: &serde_json::Value) -> Result<StageNotice, WireError> {
    as_object(value, "stage notice")?;

    Ok(StageNotice {
        state: required_str(value, "state")?,
        report_id: opt_str(value, "report_id"),
        report_url: opt_str(value, "report_url"),
        manuscript_number: opt_str_or_number(value, "number"),
        request_id: opt_str_or_number(value, "submit_req_id"),
        subimages_total: opt_count(value, "subimages_total"),
        matches_review: opt_count(value, "matches_review"),
        matches_report: opt_count(value, "matches_report"),
        inspects_report: opt_count(value, "inspects_report"),
        message: opt_str(value, "message"),
        raw: value.clone(),
    })
}

// ── Tracker rows ────────────────────────────────────────────────────

/// Parse one record from the deposit tracker.
///
/// Cells stay raw; the typed accessors on [`TrackerRow`] apply the
/// non-empty-string reading when a rule needs a column.
pub fn parse_tracker_row(value: &serde_json::Value) -> Result<TrackerRow, WireError> {
    as_object(value, "tracker row")?;

    let row_id = required_str(value, "id")?;

    let fields = value
        .get("fields")
        .and_then(|f| f.as_object())
        .ok_or_else(|| WireError::MissingField {
            field: "fields".to_string(),
        })?
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<BTreeMap<_, _>>();

    Ok(TrackerRow { row_id, fields })
}

// ── Inbound email ───────────────────────────────────────────────────

/// Parse an inbound email webhook payload.
///
/// The envelope sender is required (sender screening depends on it); the
/// subject defaults to empty and both body parts are optional.
pub fn parse_inbound_email(value: &serde_json::Value) -> Result<InboundEmail, WireError> {
    as_object(value, "inbound email")?;

    let envelope_value = value.get("envelope").ok_or_else(|| WireError::MissingField {
        field: "envelope".to_string(),
    })?;

    let from = required_str(envelope_value, "from").map_err(|_| WireError::MissingField {
        field: "envelope.from".to_string(),
    })?;

    let to = envelope_value
        .get("to")
        .and_then(|t| t.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    // Providers differ on where the subject lands.
    let subject = value
        .get("headers")
        .and_then(|h| h.get("subject"))
        .and_then(|s| s.as_str())
        .or_else(|| value.get("subject").and_then(|s| s.as_str()))
        .unwrap_or("")
        .to_string();

    Ok(InboundEmail {
        envelope: Envelope { from, to },
        subject,
        plain: opt_str(value, "plain"),
        html: opt_str(value, "html"),
    })
}

// ── Workflow documents ──────────────────────────────────────────────

fn parse_state_kind(state: &str, obj: &serde_json::Value) -> Result<StateKind, WireError> {
    match obj.get("kind").and_then(|k| k.as_str()) {
        None => Ok(StateKind::Normal),
        Some("warning") => Ok(StateKind::Warning),
        Some("failure") => Ok(StateKind::Failure),
        Some(other) => Err(WireError::InvalidField {
            field: format!("states.{}.kind", state),
            message: format!("unknown state kind '{}'", other),
        }),
    }
}

fn parse_transition(index: usize, obj: &serde_json::Value) -> Result<TransitionDoc, WireError> {
    let source = required_str(obj, "sourceStateName").map_err(|_| WireError::InvalidField {
        field: format!("transitions[{}]", index),
        message: "missing 'sourceStateName'".to_string(),
    })?;
    let target = required_str(obj, "targetStateName").map_err(|_| WireError::InvalidField {
        field: format!("transitions[{}]", index),
        message: "missing 'targetStateName'".to_string(),
    })?;

    Ok(TransitionDoc {
        source,
        target,
        name: opt_str(obj, "name").unwrap_or_default(),
        user_triggered: obj
            .get("userTriggered")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        requires_job: obj
            .get("requiresJob")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
    })
}

/// Parse a workflow document.
///
/// Structure is checked here (every state has a label, kinds are from the
/// known set, transitions name both endpoints). Cross-references between
/// sections are a semantic concern and are left to the startup checks.
pub fn parse_workflow_doc(value: &serde_json::Value) -> Result<WorkflowDoc, WireError> {
    as_object(value, "workflow document")?;

    let states_obj = value
        .get("states")
        .and_then(|s| s.as_object())
        .ok_or_else(|| WireError::MissingField {
            field: "states".to_string(),
        })?;

    let mut states = BTreeMap::new();
    for (name, state_value) in states_obj {
        let label = required_str(state_value, "label").map_err(|_| WireError::InvalidField {
            field: format!("states.{}", name),
            message: "missing 'label'".to_string(),
        })?;
        let kind = parse_state_kind(name, state_value)?;
        states.insert(name.clone(), StateDoc { label, kind });
    }

    let mut transitions = Vec::new();
    if let Some(arr) = value.get("transitions").and_then(|t| t.as_array()) {
        for (index, obj) in arr.iter().enumerate() {
            transitions.push(parse_transition(index, obj)?);
        }
    }

    let critical_path = value
        .get("criticalPath")
        .and_then(|c| c.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let mut mutually_exclusive = BTreeMap::new();
    if let Some(obj) = value.get("mutuallyExclusive").and_then(|m| m.as_object()) {
        for (name, members) in obj {
            let members = members
                .as_array()
                .ok_or_else(|| WireError::InvalidField {
                    field: format!("mutuallyExclusive.{}", name),
                    message: "must be an array of status names".to_string(),
                })?
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect::<Vec<_>>();
            mutually_exclusive.insert(name.clone(), members);
        }
    }

    Ok(WorkflowDoc {
        states,
        transitions,
        critical_path,
        mutually_exclusive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── Stage notices ───────────────────────────────────────────────

    #[test]
    fn notice_full_payload() {
        let payload = json!({
            "state": "Report: Clean",
            "report_id": "rpt_9184",
            "report_url": "https://integrity.example.com/reports/rpt_9184",
            "number": "MS-2023-0145",
            "submit_req_id": 88210,
            "subimages_total": 42,
            "matches_review": 0,
            "matches_report": 0,
            "inspects_report": 0,
            "message": "No issues detected"
        });

        let notice = parse_stage_notice(&payload).unwrap();
        assert_eq!(notice.state, "Report: Clean");
        assert_eq!(notice.report_id.as_deref(), Some("rpt_9184"));
        assert_eq!(notice.manuscript_number.as_deref(), Some("MS-2023-0145"));
        assert_eq!(notice.request_id.as_deref(), Some("88210"));
        assert_eq!(notice.subimages_total, Some(42));
        assert_eq!(notice.raw, payload);
    }

    #[test]
    fn notice_requires_state() {
        let err = parse_stage_notice(&json!({"report_id": "rpt_1"})).unwrap_err();
        match err {
            WireError::MissingField { field } => assert_eq!(field, "state"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn notice_numeric_manuscript_number() {
        let notice = parse_stage_notice(&json!({"state": "Processing", "number": 7731})).unwrap();
        assert_eq!(notice.manuscript_number.as_deref(), Some("7731"));
    }

    #[test]
    fn notice_tolerates_unknown_state_and_extra_fields() {
        let notice = parse_stage_notice(&json!({
            "state": "Recalibrating",
            "futureField": {"nested": true}
        }))
        .unwrap();
        assert_eq!(notice.state, "Recalibrating");
        assert!(notice.report_id.is_none());
    }

    #[test]
    fn notice_rejects_non_object() {
        assert!(parse_stage_notice(&json!(22)).is_err());
        assert!(parse_stage_notice(&json!(["state"])).is_err());
    }

    // ── Tracker rows ────────────────────────────────────────────────

    #[test]
    fn tracker_row_accessors_trim_and_skip_empty() {
        let row = parse_tracker_row(&json!({
            "id": "rec0041",
            "fields": {
                "current-status": "  initial-approval  ",
                "PMID": "",
                "PMCID": "PMC9912345",
                "initial-approval-date": "2023-08-01"
            }
        }))
        .unwrap();

        assert_eq!(row.row_id, "rec0041");
        assert_eq!(row.current_status(), Some("initial-approval"));
        assert_eq!(row.pmid(), None);
        assert_eq!(row.pmcid(), Some("PMC9912345"));
        assert_eq!(row.field_str("initial-approval-date"), Some("2023-08-01"));
        assert_eq!(row.field_str("final-approval-date"), None);
    }

    #[test]
    fn tracker_row_requires_fields_object() {
        let err = parse_tracker_row(&json!({"id": "rec1"})).unwrap_err();
        match err {
            WireError::MissingField { field } => assert_eq!(field, "fields"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn tracker_row_non_string_cell_reads_as_absent() {
        let row = parse_tracker_row(&json!({
            "id": "rec2",
            "fields": {"PMID": 31415926}
        }))
        .unwrap();
        assert_eq!(row.pmid(), None);
    }

    // ── Inbound email ───────────────────────────────────────────────

    #[test]
    fn email_full_payload() {
        let email = parse_inbound_email(&json!({
            "envelope": {
                "from": "nihms-help@ncbi.nlm.nih.gov",
                "to": ["deposits@journal.example.org"]
            },
            "headers": {"subject": "Bulk submission processed"},
            "plain": "See attached results.",
            "html": "<table><tr><td>Success</td><td>ok</td></tr></table>"
        }))
        .unwrap();

        assert_eq!(email.envelope.from, "nihms-help@ncbi.nlm.nih.gov");
        assert_eq!(email.envelope.to.len(), 1);
        assert_eq!(email.subject, "Bulk submission processed");
        assert!(email.html.is_some());
    }

    #[test]
    fn email_subject_falls_back_to_top_level() {
        let email = parse_inbound_email(&json!({
            "envelope": {"from": "a@b.c"},
            "subject": "hello"
        }))
        .unwrap();
        assert_eq!(email.subject, "hello");
    }

    #[test]
    fn email_missing_subject_reads_empty() {
        let email = parse_inbound_email(&json!({"envelope": {"from": "a@b.c"}})).unwrap();
        assert_eq!(email.subject, "");
        assert_eq!(email.plain_or_empty(), "");
    }

    #[test]
    fn email_requires_envelope_from() {
        let err = parse_inbound_email(&json!({"envelope": {}})).unwrap_err();
        match err {
            WireError::MissingField { field } => assert_eq!(field, "envelope.from"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    // ── Workflow documents ──────────────────────────────────────────

    fn sample_workflow() -> serde_json::Value {
        json!({
            "states": {
                "DEPOSIT_SUBMITTED_TO_PMC": {"label": "Submitted"},
                "DEPOSIT_CONFIRMED_BY_PMC": {"label": "Confirmed"},
                "DEPOSIT_REJECTED_BY_PMC": {"label": "Rejected", "kind": "failure"}
            },
            "transitions": [
                {"sourceStateName": "DEPOSIT_SUBMITTED_TO_PMC",
                 "targetStateName": "DEPOSIT_CONFIRMED_BY_PMC", "name": "confirm"},
                {"sourceStateName": "DEPOSIT_SUBMITTED_TO_PMC",
                 "targetStateName": "DEPOSIT_REJECTED_BY_PMC", "name": "reject",
                 "requiresJob": true}
            ],
            "criticalPath": ["DEPOSIT_SUBMITTED_TO_PMC", "DEPOSIT_CONFIRMED_BY_PMC"],
            "mutuallyExclusive": {
                "DEPOSIT_CONFIRMED_BY_PMC": ["DEPOSIT_REJECTED_BY_PMC"]
            }
        })
    }

    #[test]
    fn workflow_parses_states_and_transitions() {
        let doc = parse_workflow_doc(&sample_workflow()).unwrap();
        assert_eq!(doc.states.len(), 3);
        assert_eq!(
            doc.states["DEPOSIT_REJECTED_BY_PMC"].kind,
            StateKind::Failure
        );
        assert_eq!(doc.transitions.len(), 2);
        assert!(doc.transitions[1].requires_job);
        assert!(!doc.transitions[1].user_triggered);
        assert_eq!(doc.critical_path.len(), 2);
        assert_eq!(
            doc.mutually_exclusive["DEPOSIT_CONFIRMED_BY_PMC"],
            vec!["DEPOSIT_REJECTED_BY_PMC"]
        );
    }

    #[test]
    fn workflow_rejects_unknown_state_kind() {
        let err = parse_workflow_doc(&json!({
            "states": {"X": {"label": "X", "kind": "celebratory"}}
        }))
        .unwrap_err();
        match err {
            WireError::InvalidField { field, .. } => assert_eq!(field, "states.X.kind"),
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn workflow_rejects_transition_without_target() {
        let err = parse_workflow_doc(&json!({
            "states": {"X": {"label": "X"}},
            "transitions": [{"sourceStateName": "X"}]
        }))
        .unwrap_err();
        match err {
            WireError::InvalidField { field, .. } => assert_eq!(field, "transitions[0]"),
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn workflow_rejects_state_without_label() {
        let err = parse_workflow_doc(&json!({"states": {"X": {}}})).unwrap_err();
        match err {
            WireError::InvalidField { field, .. } => assert_eq!(field, "states.X"),
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn workflow_sections_other_than_states_are_optional() {
        let doc = parse_workflow_doc(&json!({"states": {}})).unwrap();
        assert!(doc.states.is_empty());
        assert!(doc.transitions.is_empty());
        assert!(doc.critical_path.is_empty());
        assert!(doc.mutually_exclusive.is_empty());
    }
}
