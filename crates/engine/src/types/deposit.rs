//! Deposit-side types: workflow status names, the PMC metadata block, and
//! the email-processing record embedded in it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status names for the PMC deposit lifecycle.
///
/// Statuses are plain strings throughout the platform (the workflow graph
/// is configuration, not code); these constants exist so the reconciliation
/// rules and the startup checks spell them identically.
pub mod status {
    pub const PACKAGE_QUEUED: &str = "DEPOSIT_PACKAGE_QUEUED";
    pub const SUBMITTED_TO_PMC: &str = "DEPOSIT_SUBMITTED_TO_PMC";
    pub const CONFIRMED_BY_PMC: &str = "DEPOSIT_CONFIRMED_BY_PMC";
    pub const REJECTED_BY_PMC: &str = "DEPOSIT_REJECTED_BY_PMC";
    pub const INITIAL_APPROVAL: &str = "DEPOSIT_INITIAL_APPROVAL";
    pub const TAGGING_COMPLETE: &str = "DEPOSIT_TAGGING_COMPLETE";
    pub const FINAL_REVIEW: &str = "DEPOSIT_FINAL_REVIEW";
    pub const FINAL_APPROVAL: &str = "DEPOSIT_FINAL_APPROVAL";
    pub const COMPLETE: &str = "DEPOSIT_COMPLETE";
    pub const WITHDRAWN: &str = "DEPOSIT_WITHDRAWN";
}

/// Severity of one per-package line in a PMC results email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSeverity {
    Ok,
    Warning,
    Error,
}

impl MessageSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageSeverity::Ok => "ok",
            MessageSeverity::Warning => "warning",
            MessageSeverity::Error => "error",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, MessageSeverity::Error)
    }
}

impl fmt::Display for MessageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed line from a PMC results email, kept on the submission for
/// later display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingMessage {
    pub severity: MessageSeverity,
    pub text: String,
}

/// Record of the most recent email that touched this submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailProcessing {
    pub message_id: String,
    /// RFC 3339 timestamp of the last processing pass.
    pub last_processed_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manuscript_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    /// Terminal outcome of that pass, e.g. `"SUCCESS"` or `"IGNORED"`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ProcessingMessage>,
}

/// The `pmc` block of a submission's metadata: cross-referenced external
/// identifiers plus the latest email-processing record.
///
/// Identifier fields are written only from authoritative tracker values and
/// only when the normalized value actually differs, so callers can skip
/// no-op persistence entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manuscript_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_processing: Option<EmailProcessing>,
}
