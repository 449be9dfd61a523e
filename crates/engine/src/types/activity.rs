//! Append-only audit records of submission status changes.

use serde::{Deserialize, Serialize};

/// Activity type recorded for every reconciled status change.
pub const ACTIVITY_STATUS_CHANGE: &str = "SUBMISSION_VERSION_STATUS_CHANGE";

/// One immutable entry in a submission's status history.
///
/// Activities are only ever appended. `date_created` is RFC 3339 when the
/// change was witnessed live, or a bare `YYYY-MM-DD` when the entry was
/// materialized from a tracker milestone date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub activity_type: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
}

impl Activity {
    /// A status-change entry stamped with the given timestamp.
    pub fn status_change(status: impl Into<String>, date_created: impl Into<String>) -> Self {
        Activity {
            activity_type: ACTIVITY_STATUS_CHANGE.to_string(),
            status: status.into(),
            date_created: Some(date_created.into()),
        }
    }
}
