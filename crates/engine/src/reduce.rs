//! Stage-transition reducer for image-integrity checks.
//!
//! The vendor reports progress as a stream of coarse notifications; this
//! module folds each one into the six-stage [`CheckState`].
//!
//! Key invariant: stages only move forward. Forcing a stage to `completed`
//! also completes every earlier stage that has not already finished (the
//! vendor skips explicit per-stage completions), and nothing ever rolls a
//! finished stage back except the re-review rules, which reset review
//! stages to `pending` / `not-completed`. The reducer is a pure function
//! of (previous state, notice, receipt time): callers may re-invoke it
//! freely inside an optimistic-concurrency retry loop.

use signalbox_wire::StageNotice;

use crate::types::{CheckState, CheckSummary, Stage, StageStatus};

/// The notification vocabulary the vendor actually sends. Anything else
/// classifies as `Other` and is recorded without touching stage statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Processing,
    AwaitingSubimageApproval,
    AwaitingReview,
    ReportClean,
    ReportFlagged,
    Deleted,
    Other,
}

impl NoticeKind {
    fn classify(state: &str) -> NoticeKind {
        match state {
            "Processing" => NoticeKind::Processing,
            "Awaiting: Sub-Image Approval" => NoticeKind::AwaitingSubimageApproval,
            "Awaiting: Review" => NoticeKind::AwaitingReview,
            "Report: Clean" => NoticeKind::ReportClean,
            "Report: Flagged" => NoticeKind::ReportFlagged,
            "Deleted" => NoticeKind::Deleted,
            _ => NoticeKind::Other,
        }
    }
}

/// Fold one vendor notification into the check state.
///
/// Pure and total: well-formed notices never fail, and an unknown
/// `notice.state` still refreshes the summary and lands in the final
/// stage's audit trail. Pass `None` for a check that has no stored state
/// yet; reduction then starts from the all-`pending` default.
pub fn apply_notice(
    current: Option<&CheckState>,
    notice: &StageNotice,
    received_at: &str,
) -> CheckState {
    let mut next = current.cloned().unwrap_or_default();

    match NoticeKind::classify(&notice.state) {
        NoticeKind::Processing => {
            let target = route_processing(&next);
            mark_processing(&mut next, target, received_at);
            push_event(&mut next, target, notice);
        }
        NoticeKind::AwaitingSubimageApproval => {
            force_completed(&mut next, Stage::SubimageDetection, received_at);
            set_status(
                &mut next,
                Stage::SubimageSelection,
                StageStatus::Pending,
                received_at,
            );
            push_event(&mut next, Stage::SubimageSelection, notice);
        }
        NoticeKind::AwaitingReview => {
            let was_completed =
                next.status_of(Stage::IntegrityDetection) == StageStatus::Completed;
            force_completed(&mut next, Stage::IntegrityDetection, received_at);

            let review = next.status_of(Stage::ResultsReview);
            let next_review = if !was_completed {
                // First arrival: review opens fresh.
                StageStatus::Pending
            } else {
                match review {
                    // A repeat while still pending, or after a concluded
                    // review, signals a re-review cycle.
                    StageStatus::Pending
                    | StageStatus::Completed
                    | StageStatus::Clean
                    | StageStatus::Flagged => StageStatus::NotCompleted,
                    other => other,
                }
            };
            set_status(&mut next, Stage::ResultsReview, next_review, received_at);

            // A fresh review cycle invalidates an already-issued report.
            if matches!(
                next.status_of(Stage::FinalReport),
                StageStatus::Clean | StageStatus::Flagged
            ) {
                set_status(
                    &mut next,
                    Stage::FinalReport,
                    StageStatus::Pending,
                    received_at,
                );
            }
            push_event(&mut next, Stage::ResultsReview, notice);
        }
        NoticeKind::ReportClean => {
            force_completed(&mut next, Stage::ResultsReview, received_at);
            set_status(&mut next, Stage::FinalReport, StageStatus::Clean, received_at);
            push_event(&mut next, Stage::FinalReport, notice);
        }
        NoticeKind::ReportFlagged => {
            force_completed(&mut next, Stage::ResultsReview, received_at);
            set_status(
                &mut next,
                Stage::FinalReport,
                StageStatus::Flagged,
                received_at,
            );
            push_event(&mut next, Stage::FinalReport, notice);
        }
        NoticeKind::Deleted => {
            next.deleted = true;
            push_event(&mut next, Stage::FinalReport, notice);
        }
        NoticeKind::Other => {
            push_event(&mut next, Stage::FinalReport, notice);
        }
    }

    // Every branch mirrors the latest payload into the headline fields,
    // absent values included.
    next.report_id = notice.report_id.clone();
    next.report_url = notice.report_url.clone();
    next.summary = CheckSummary {
        subimages_total: notice.subimages_total,
        matches_review: notice.matches_review,
        matches_report: notice.matches_report,
        inspects_report: notice.inspects_report,
        message: notice.message.clone(),
        received_at: received_at.to_string(),
    };

    next
}

// ── Transition helpers ──────────────────────────────────────────────

/// Pick which linear stage a generic `"Processing"` notification refers
/// to: the furthest stage whose prerequisite is already satisfied.
fn route_processing(state: &CheckState) -> Stage {
    if state.status_of(Stage::SubimageSelection) == StageStatus::Completed
        && state.status_of(Stage::IntegrityDetection) != StageStatus::Completed
    {
        Stage::IntegrityDetection
    } else if state.status_of(Stage::InitialPost) == StageStatus::Completed {
        Stage::SubimageDetection
    } else {
        Stage::InitialPost
    }
}

/// Move a stage to `processing` unless it already finished. A late or
/// repeated `"Processing"` must never reopen a completed stage.
fn mark_processing(state: &mut CheckState, stage: Stage, received_at: &str) {
    if !state.status_of(stage).is_done() {
        set_status(state, stage, StageStatus::Processing, received_at);
    }
}

/// Complete a stage, and complete every earlier stage that has not already
/// finished. The vendor's milestone notices imply the stages before them.
fn force_completed(state: &mut CheckState, stage: Stage, received_at: &str) {
    for earlier in Stage::ORDER {
        if earlier == stage {
            break;
        }
        if !state.status_of(earlier).is_done() {
            set_status(state, earlier, StageStatus::Completed, received_at);
        }
    }
    set_status(state, stage, StageStatus::Completed, received_at);
}

/// Write a status, moving the stage's change timestamp only when the
/// status actually differs. Replays must leave timestamps untouched.
fn set_status(state: &mut CheckState, stage: Stage, status: StageStatus, received_at: &str) {
    let record = state.stage_mut(stage);
    if record.status != status {
        record.status = status;
        record.timestamp = Some(received_at.to_string());
    }
}

/// Append the raw notification to the audit trail of the stage it touched.
fn push_event(state: &mut CheckState, stage: Stage, notice: &StageNotice) {
    state.stage_mut(stage).events.push(notice.raw.clone());
}

// ── Headline status ─────────────────────────────────────────────────

/// Coarse one-word reading of a check state, for list views and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Deleted,
    Clean,
    Flagged,
    AwaitingReview,
    AwaitingSelection,
    Processing,
    Pending,
}

impl OverallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OverallStatus::Deleted => "deleted",
            OverallStatus::Clean => "clean",
            OverallStatus::Flagged => "flagged",
            OverallStatus::AwaitingReview => "awaiting-review",
            OverallStatus::AwaitingSelection => "awaiting-selection",
            OverallStatus::Processing => "processing",
            OverallStatus::Pending => "pending",
        }
    }
}

/// Summarize a check state into its headline status.
pub fn overall_status(state: &CheckState) -> OverallStatus {
    if state.deleted {
        return OverallStatus::Deleted;
    }
    match state.status_of(Stage::FinalReport) {
        StageStatus::Clean => return OverallStatus::Clean,
        StageStatus::Flagged => return OverallStatus::Flagged,
        _ => {}
    }
    if state.status_of(Stage::IntegrityDetection) == StageStatus::Completed
        && matches!(
            state.status_of(Stage::ResultsReview),
            StageStatus::Pending | StageStatus::NotCompleted
        )
    {
        return OverallStatus::AwaitingReview;
    }
    if state.status_of(Stage::SubimageDetection) == StageStatus::Completed
        && state.status_of(Stage::SubimageSelection) == StageStatus::Pending
    {
        return OverallStatus::AwaitingSelection;
    }
    let any_processing = Stage::ORDER
        .iter()
        .any(|&s| state.status_of(s) == StageStatus::Processing);
    if any_processing {
        OverallStatus::Processing
    } else {
        OverallStatus::Pending
    }
}
