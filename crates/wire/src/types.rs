//! Typed views of the JSON payloads that cross the platform boundary.
//!
//! These types are produced exclusively by the parsers in [`crate::parse`].
//! Downstream crates never touch raw `serde_json::Value` payloads directly;
//! they receive one of these structs or a parse error, never a half-valid
//! object.

use std::collections::BTreeMap;

/// A status notification posted by the image-integrity service after it
/// advances (or re-runs) a check on a manuscript's figures.
///
/// `state` is the vendor's own vocabulary and is deliberately kept as a
/// string: unknown states are meaningful input (they are recorded verbatim),
/// not a parse failure.
#[derive(Debug, Clone, PartialEq)]
pub struct StageNotice {
    /// Vendor state string, e.g. `"Processing"` or `"Report: Clean"`.
    pub state: String,
    /// Identifier of the integrity report, when one exists yet.
    pub report_id: Option<String>,
    /// Viewer URL for the integrity report.
    pub report_url: Option<String>,
    /// The manuscript number the vendor echoes back.
    pub manuscript_number: Option<String>,
    /// The vendor's identifier for the original submission request.
    pub request_id: Option<String>,
    /// Count of sub-images detected in the manuscript figures.
    pub subimages_total: Option<u64>,
    /// Count of matches awaiting human review.
    pub matches_review: Option<u64>,
    /// Count of matches included in the final report.
    pub matches_report: Option<u64>,
    /// Count of flagged inspections included in the final report.
    pub inspects_report: Option<u64>,
    /// Free-text message attached to the notification, if any.
    pub message: Option<String>,
    /// The notification exactly as it arrived. Appended to the audit trail
    /// of whichever check stage the notice resolves to.
    pub raw: serde_json::Value,
}

/// One row fetched from the deposit tracker.
///
/// The tracker is a spreadsheet-backed service, so every cell comes through
/// as loosely typed JSON. `fields` preserves the raw cells; the accessor
/// methods apply the "present and non-empty" reading used everywhere in the
/// reconciliation rules.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerRow {
    /// The tracker's own record identifier.
    pub row_id: String,
    /// Raw cells keyed by column name.
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl TrackerRow {
    /// Read a column as a trimmed string, treating missing cells, non-string
    /// cells, and whitespace-only strings all as absent.
    pub fn field_str(&self, column: &str) -> Option<&str> {
        let value = self.fields.get(column)?.as_str()?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// The curator-maintained status column, when filled in.
    pub fn current_status(&self) -> Option<&str> {
        self.field_str(columns::CURRENT_STATUS)
    }

    /// The PubMed identifier column, when filled in.
    pub fn pmid(&self) -> Option<&str> {
        self.field_str(columns::PMID)
    }

    /// The PubMed Central identifier column, when filled in.
    pub fn pmcid(&self) -> Option<&str> {
        self.field_str(columns::PMCID)
    }

    /// The NIHMS identifier column, when filled in.
    pub fn nihms_id(&self) -> Option<&str> {
        self.field_str(columns::NIHMS_ID)
    }
}

/// Column names used by the deposit tracker. Identifier columns are
/// uppercase acronyms; curator-edited columns are kebab-case.
pub mod columns {
    pub const CURRENT_STATUS: &str = "current-status";
    pub const PMID: &str = "PMID";
    pub const PMCID: &str = "PMCID";
    pub const NIHMS_ID: &str = "NIHMSID";
    pub const INITIAL_APPROVAL_DATE: &str = "initial-approval-date";
    pub const TAGGING_COMPLETE_DATE: &str = "tagging-complete-date";
    pub const FINAL_REVIEW_DATE: &str = "final-review-date";
    pub const FINAL_APPROVAL_DATE: &str = "final-approval-date";
}

/// SMTP envelope data forwarded by the inbound mail provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Envelope sender address.
    pub from: String,
    /// Envelope recipient addresses.
    pub to: Vec<String>,
}

/// An inbound email as delivered by the mail provider's webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEmail {
    pub envelope: Envelope,
    /// Decoded Subject header; empty string when the message had none.
    pub subject: String,
    /// Plain-text body part, if present.
    pub plain: Option<String>,
    /// HTML body part, if present.
    pub html: Option<String>,
}

impl InboundEmail {
    /// The body to fall back on when no HTML part exists: the plain part,
    /// or an empty string when the message carried no body at all.
    pub fn plain_or_empty(&self) -> &str {
        self.plain.as_deref().unwrap_or("")
    }
}

/// Visual flavor of a workflow state, used when rendering progress.
///
/// Carried on the wire as an optional `kind` string; anything the parser
/// does not recognize is rejected, because workflow documents are curated
/// configuration rather than third-party signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Normal,
    Warning,
    Failure,
}

/// One named state in a workflow document.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDoc {
    /// Human-readable label shown on progress displays.
    pub label: String,
    pub kind: StateKind,
}

/// One directed edge in a workflow document.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDoc {
    pub source: String,
    pub target: String,
    /// Display name of the transition; empty when the document omits it.
    pub name: String,
    /// Whether a human action drives this edge (as opposed to a poller or
    /// an inbound message).
    pub user_triggered: bool,
    /// Whether taking this edge enqueues a background job.
    pub requires_job: bool,
}

/// A deposit workflow: the directed graph of statuses a submission moves
/// through, plus the ordered "happy path" used for progress rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDoc {
    /// All named states, keyed by status name.
    pub states: BTreeMap<String, StateDoc>,
    pub transitions: Vec<TransitionDoc>,
    /// The ordered list of statuses a successful deposit passes through.
    pub critical_path: Vec<String>,
    /// For each status, the statuses that occupy the same rendered slot
    /// (e.g. a confirmation and its rejection counterpart).
    pub mutually_exclusive: BTreeMap<String, Vec<String>>,
}
