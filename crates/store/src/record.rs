use serde::{Deserialize, Serialize};

/// A snapshot of a submission as stored in the backend.
///
/// `metadata` carries the submission's reconciliation state (check stages,
/// deposit identifiers, activity history) as one JSON document; `version`
/// is the optimistic-concurrency counter a conditional write checks against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission_id: String,
    /// NIHMS manuscript identifier, assigned once a deposit is underway.
    pub manuscript_id: Option<String>,
    /// Identifier of the most recent deposit package sent out.
    pub package_id: Option<String>,
    /// Current workflow status name.
    pub status: String,
    pub metadata: serde_json::Value,
    pub version: i64,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub updated_at: String,
}

/// The audit row written for every inbound email, whatever its fate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub message_id: String,
    /// Terminal outcome: BOUNCED, IGNORED, SUCCESS, PARTIAL, or ERROR.
    pub outcome: String,
    /// Name of the handler that claimed the message, if any did.
    pub processor: Option<String>,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub received_at: String,
    /// Human-readable explanation (bounce reason, error summary).
    pub detail: Option<String>,
}
