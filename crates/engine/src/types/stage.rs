//! State model for an image-integrity check: six ordered stages, each with
//! a status and an append-only audit trail of the notifications that
//! touched it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The six phases of an integrity check, in pipeline order.
///
/// The first four are "linear" stages driven by the vendor; the last two
/// are "review" stages with extra terminal statuses (`clean`, `flagged`,
/// `not-completed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    InitialPost,
    SubimageDetection,
    SubimageSelection,
    IntegrityDetection,
    ResultsReview,
    FinalReport,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ORDER: [Stage; 6] = [
        Stage::InitialPost,
        Stage::SubimageDetection,
        Stage::SubimageSelection,
        Stage::IntegrityDetection,
        Stage::ResultsReview,
        Stage::FinalReport,
    ];

    /// The stage's name as it appears in stored state blobs.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::InitialPost => "initialPost",
            Stage::SubimageDetection => "subimageDetection",
            Stage::SubimageSelection => "subimageSelection",
            Stage::IntegrityDetection => "integrityDetection",
            Stage::ResultsReview => "resultsReview",
            Stage::FinalReport => "finalReport",
        }
    }

    pub fn is_review(self) -> bool {
        matches!(self, Stage::ResultsReview | Stage::FinalReport)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single stage.
///
/// `Completed`, `Failed`, and `Skipped` are terminal for linear stages.
/// Review stages additionally use `Clean`, `Flagged`, and `NotCompleted`
/// (the latter marks a previously concluded review reopened by a fresh
/// review cycle).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Skipped,
    Clean,
    Flagged,
    NotCompleted,
}

impl StageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Processing => "processing",
            StageStatus::Completed => "completed",
            StageStatus::Failed => "failed",
            StageStatus::Skipped => "skipped",
            StageStatus::Clean => "clean",
            StageStatus::Flagged => "flagged",
            StageStatus::NotCompleted => "not-completed",
        }
    }

    /// Whether a linear stage with this status counts as passed, for the
    /// purpose of routing a generic `"Processing"` notification.
    pub fn is_done(self) -> bool {
        matches!(self, StageStatus::Completed | StageStatus::Skipped)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-stage record: current status, when it last changed, and every raw
/// notification that touched this stage, in arrival order.
///
/// `events` is never truncated or deduplicated. `timestamp` moves only on
/// an actual status change, so replaying an identical notification leaves
/// it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    #[serde(default)]
    pub status: StageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Failure detail carried in stored blobs; preserved verbatim across
    /// reconciliation, never written by the reducer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<serde_json::Value>,
}

/// Counters and free text mirrored from the most recent notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subimages_total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches_review: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches_report: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspects_report: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the mirrored notification was received, RFC 3339.
    #[serde(default)]
    pub received_at: String,
}

/// The full reconciled state of one integrity check.
///
/// Serializes to the JSON blob the platform stores per submission. Every
/// field tolerates absence on deserialization so blobs written by earlier
/// releases still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckState {
    #[serde(default)]
    pub initial_post: StageRecord,
    #[serde(default)]
    pub subimage_detection: StageRecord,
    #[serde(default)]
    pub subimage_selection: StageRecord,
    #[serde(default)]
    pub integrity_detection: StageRecord,
    #[serde(default)]
    pub results_review: StageRecord,
    #[serde(default)]
    pub final_report: StageRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    /// Set once the vendor reports the check deleted; never cleared.
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub summary: CheckSummary,
}

impl CheckState {
    pub fn stage(&self, stage: Stage) -> &StageRecord {
        match stage {
            Stage::InitialPost => &self.initial_post,
            Stage::SubimageDetection => &self.subimage_detection,
            Stage::SubimageSelection => &self.subimage_selection,
            Stage::IntegrityDetection => &self.integrity_detection,
            Stage::ResultsReview => &self.results_review,
            Stage::FinalReport => &self.final_report,
        }
    }

    pub fn stage_mut(&mut self, stage: Stage) -> &mut StageRecord {
        match stage {
            Stage::InitialPost => &mut self.initial_post,
            Stage::SubimageDetection => &mut self.subimage_detection,
            Stage::SubimageSelection => &mut self.subimage_selection,
            Stage::IntegrityDetection => &mut self.integrity_detection,
            Stage::ResultsReview => &mut self.results_review,
            Stage::FinalReport => &mut self.final_report,
        }
    }

    /// Status of a stage, by stage.
    pub fn status_of(&self, stage: Stage) -> StageStatus {
        self.stage(stage).status
    }
}
