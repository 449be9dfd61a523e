//! signalbox-engine: status reconciliation for integrity checks and
//! PMC deposits.
//!
//! Four engines over externally persisted state, all pure or
//! effect-injected so a caller's optimistic-retry loop can re-run them
//! freely:
//!
//! - [`reduce`] folds image-integrity stage notifications into a
//!   check's stage state.
//! - [`resolve`] reconciles a submission's deposit status against the
//!   PMC tracker and carries identifiers across.
//! - [`mailroom`] runs inbound notification email through sender
//!   checks, handler dispatch, and per-package status updates.
//! - [`tramline`] renders the deposit workflow as an ordered line of
//!   stops for display.
//!
//! Persistence stays with the caller: every function here takes current
//! state in and hands new state back.

pub mod mailroom;
pub mod reduce;
pub mod resolve;
pub mod tramline;
pub mod types;

// ── Convenience re-exports: key types ────────────────────────────────

pub use types::{
    Activity, CheckState, CheckSummary, DepositMetadata, EmailProcessing, MessageSeverity,
    ProcessingMessage, Stage, StageRecord, StageStatus, Workflow,
};

// ── Convenience re-exports: engine entry points ──────────────────────

pub use reduce::{apply_notice, overall_status, OverallStatus};
pub use resolve::{resolve_status, sync_identifiers, Resolution};
pub use tramline::{generate_tramline, TramStop, Tramline};

/// Combined outcome of one polling pass over a tracker row.
///
/// `activity` and `metadata` are `None` whenever the corresponding
/// write would change nothing, so callers can skip the store round trip
/// entirely on a quiet poll.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerReconciliation {
    pub status: String,
    pub activity: Option<Activity>,
    pub metadata: Option<DepositMetadata>,
}

/// Run one full polling pass over a tracker row.
///
/// Composes [`resolve::resolve_status`] and
/// [`resolve::sync_identifiers`]; see those for the individual rules.
pub fn reconcile_tracker_row(
    current_status: &str,
    metadata: Option<&DepositMetadata>,
    row: &signalbox_wire::TrackerRow,
    activities: &[Activity],
    received_at: &str,
) -> TrackerReconciliation {
    let resolution = resolve::resolve_status(current_status, row, activities, received_at);
    TrackerReconciliation {
        status: resolution.status,
        activity: resolution.activity,
        metadata: resolve::sync_identifiers(metadata, row),
    }
}
