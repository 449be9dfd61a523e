//! Reconciliation of local submission status against the deposit tracker.
//!
//! The tracker (a curator-maintained spreadsheet service) is the system of
//! record for PMC's side of a deposit. Each polling pass feeds one row
//! through [`resolve_status`] and [`sync_identifiers`]; both are pure, so
//! the caller's read-compute-write retry loop can re-run them freely.
//!
//! Key invariant: an explicit, recognized `current-status` cell always
//! wins. Date inference runs only when that cell is absent or unknown, and
//! identifier columns are never a status signal (a PMCID survives a
//! withdrawal, so its presence proves nothing about where the deposit
//! stands today).

use signalbox_wire::{columns, TrackerRow};

use crate::types::{status, Activity, DepositMetadata};

/// Tracker `current-status` vocabulary mapped to workflow status names.
///
/// Kept as plain data so the startup checks can verify it row by row
/// against the workflow document.
pub const TRACKER_STATUS_MAP: &[(&str, &str)] = &[
    ("received", status::CONFIRMED_BY_PMC),
    ("initial-approval", status::INITIAL_APPROVAL),
    ("tagging-complete", status::TAGGING_COMPLETE),
    ("final-review", status::FINAL_REVIEW),
    ("final-approval", status::FINAL_APPROVAL),
    ("complete", status::COMPLETE),
    ("withdrawn", status::WITHDRAWN),
    ("error", status::REJECTED_BY_PMC),
];

/// Milestone date columns in ascending order of deposit progress, each
/// paired with the status it implies.
///
/// Ranking is by this fixed column order, never by comparing the dates
/// themselves: a backdated early milestone cannot outrank a later one.
pub const MILESTONES: &[(&str, &str)] = &[
    (columns::INITIAL_APPROVAL_DATE, status::INITIAL_APPROVAL),
    (columns::TAGGING_COMPLETE_DATE, status::TAGGING_COMPLETE),
    (columns::FINAL_REVIEW_DATE, status::FINAL_REVIEW),
    (columns::FINAL_APPROVAL_DATE, status::FINAL_APPROVAL),
];

/// Map a raw `current-status` cell to a workflow status name.
///
/// Matching ignores case; unknown vocabulary maps to `None` so the caller
/// falls through to date inference rather than failing.
pub fn map_tracker_status(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    TRACKER_STATUS_MAP
        .iter()
        .find(|(cell, _)| cell.eq_ignore_ascii_case(raw))
        .map(|(_, mapped)| *mapped)
}

/// Outcome of one status reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The status the submission should now carry.
    pub status: String,
    /// A status-change audit entry to append, when one is warranted.
    pub activity: Option<Activity>,
}

/// Resolve a submission's status against one tracker row.
///
/// Priority order: an explicit recognized `current-status` is
/// authoritative and, when it differs from `current_status`, yields one
/// activity stamped `received_at` (suppressed if the most recent entry in
/// `activities` already carries that status). An unchanged explicit status
/// is a no-op. Without a recognized cell, the highest milestone date
/// present infers the status, with no activity: inference recomputes a
/// snapshot, it does not witness a transition.
pub fn resolve_status(
    current_status: &str,
    row: &TrackerRow,
    activities: &[Activity],
    received_at: &str,
) -> Resolution {
    if let Some(mapped) = row.current_status().and_then(map_tracker_status) {
        if mapped == current_status {
            return Resolution {
                status: current_status.to_string(),
                activity: None,
            };
        }
        let already_latest = activities.last().map(|a| a.status == mapped).unwrap_or(false);
        return Resolution {
            status: mapped.to_string(),
            activity: if already_latest {
                None
            } else {
                Some(Activity::status_change(mapped, received_at))
            },
        };
    }

    let inferred = MILESTONES
        .iter()
        .rev()
        .find(|(column, _)| row.field_str(column).is_some())
        .map(|(_, mapped)| *mapped);

    Resolution {
        status: inferred.unwrap_or(current_status).to_string(),
        activity: None,
    }
}

// ── Identifier sync ─────────────────────────────────────────────────

/// Canonical form of a PMID: the bare digit string.
fn normalize_pmid(raw: &str) -> String {
    raw.trim().to_string()
}

/// Canonical form of a PMCID: uppercase with the `PMC` prefix, whether the
/// tracker stored `PMC11203344` or bare `11203344`.
fn normalize_pmcid(raw: &str) -> String {
    let trimmed = raw.trim();
    let upper = trimmed.to_ascii_uppercase();
    if upper.starts_with("PMC") {
        upper
    } else {
        format!("PMC{}", upper)
    }
}

/// Carry authoritative identifier values from a tracker row into the
/// submission's PMC metadata.
///
/// Returns `None` when nothing would change, so callers can skip the
/// write entirely. Absent tracker cells never clear a stored identifier,
/// and no activity is ever recorded: identifier assignment is bookkeeping,
/// not a workflow milestone.
pub fn sync_identifiers(
    current: Option<&DepositMetadata>,
    row: &TrackerRow,
) -> Option<DepositMetadata> {
    let incoming_pmid = row.pmid().map(normalize_pmid);
    let incoming_pmcid = row.pmcid().map(normalize_pmcid);

    let pmid_changed = match (&incoming_pmid, current.and_then(|m| m.pmid.as_deref())) {
        (Some(incoming), Some(stored)) => incoming != &normalize_pmid(stored),
        (Some(_), None) => true,
        (None, _) => false,
    };
    let pmcid_changed = match (&incoming_pmcid, current.and_then(|m| m.pmcid.as_deref())) {
        (Some(incoming), Some(stored)) => incoming != &normalize_pmcid(stored),
        (Some(_), None) => true,
        (None, _) => false,
    };

    if !pmid_changed && !pmcid_changed {
        return None;
    }

    let mut updated = current.cloned().unwrap_or_default();
    if pmid_changed {
        updated.pmid = incoming_pmid;
    }
    if pmcid_changed {
        updated.pmcid = incoming_pmcid;
    }
    Some(updated)
}

// ── Milestone materialization ───────────────────────────────────────

/// Turn a row's milestone dates into historical status-change activities,
/// one per populated column, in canonical milestone order.
///
/// Used when a submission is first imported: the entries carry the
/// milestone's own date, unlike polling appends, which are stamped with
/// the receipt time.
pub fn activities_from_dates(row: &TrackerRow) -> Vec<Activity> {
    MILESTONES
        .iter()
        .filter_map(|(column, mapped)| {
            row.field_str(column)
                .map(|date| Activity::status_change(*mapped, date))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalbox_wire::parse_tracker_row;
    use serde_json::json;

    const NOW: &str = "2023-08-02T09:30:00Z";

    fn row(fields: serde_json::Value) -> TrackerRow {
        parse_tracker_row(&json!({"id": "rec1", "fields": fields})).unwrap()
    }

    #[test]
    fn explicit_status_wins_and_appends_one_activity() {
        let row = row(json!({"current-status": "tagging-complete"}));
        let resolution = resolve_status(status::CONFIRMED_BY_PMC, &row, &[], NOW);

        assert_eq!(resolution.status, status::TAGGING_COMPLETE);
        let activity = resolution.activity.unwrap();
        assert_eq!(activity.status, status::TAGGING_COMPLETE);
        assert_eq!(activity.date_created.as_deref(), Some(NOW));
    }

    #[test]
    fn explicit_status_matching_current_is_a_no_op() {
        let row = row(json!({"current-status": "tagging-complete"}));
        let resolution = resolve_status(status::TAGGING_COMPLETE, &row, &[], NOW);

        assert_eq!(resolution.status, status::TAGGING_COMPLETE);
        assert!(resolution.activity.is_none());
    }

    #[test]
    fn duplicate_suppressed_when_latest_activity_already_has_status() {
        let row = row(json!({"current-status": "final-review"}));
        let history = vec![
            Activity::status_change(status::CONFIRMED_BY_PMC, "2023-07-01"),
            Activity::status_change(status::FINAL_REVIEW, "2023-07-21"),
        ];
        let resolution = resolve_status(status::CONFIRMED_BY_PMC, &row, &history, NOW);

        assert_eq!(resolution.status, status::FINAL_REVIEW);
        assert!(resolution.activity.is_none());
    }

    #[test]
    fn older_matching_activity_does_not_suppress_a_fresh_one() {
        let row = row(json!({"current-status": "final-review"}));
        let history = vec![
            Activity::status_change(status::FINAL_REVIEW, "2023-07-21"),
            Activity::status_change(status::WITHDRAWN, "2023-07-25"),
        ];
        let resolution = resolve_status(status::WITHDRAWN, &row, &history, NOW);

        assert_eq!(resolution.status, status::FINAL_REVIEW);
        assert!(resolution.activity.is_some());
    }

    #[test]
    fn repeated_polls_with_same_row_stay_stable() {
        let row = row(json!({"current-status": "complete"}));
        let mut history: Vec<Activity> = Vec::new();

        let first = resolve_status(status::FINAL_APPROVAL, &row, &history, NOW);
        assert_eq!(first.status, status::COMPLETE);
        history.extend(first.activity.clone());

        let second = resolve_status(&first.status, &row, &history, NOW);
        assert_eq!(second.status, status::COMPLETE);
        assert!(second.activity.is_none());
    }

    #[test]
    fn unknown_vocabulary_falls_through_to_dates() {
        let row = row(json!({
            "current-status": "in-limbo",
            "initial-approval-date": "2023-06-12"
        }));
        let resolution = resolve_status(status::CONFIRMED_BY_PMC, &row, &[], NOW);

        assert_eq!(resolution.status, status::INITIAL_APPROVAL);
        assert!(resolution.activity.is_none());
    }

    #[test]
    fn highest_milestone_present_wins() {
        let row = row(json!({
            "initial-approval-date": "2023-06-12",
            "final-approval-date": "2023-08-01"
        }));
        let resolution = resolve_status(status::CONFIRMED_BY_PMC, &row, &[], NOW);
        assert_eq!(resolution.status, status::FINAL_APPROVAL);
    }

    #[test]
    fn milestone_rank_ignores_backdated_values() {
        // final-approval-date earlier than initial-approval-date: column
        // order still decides.
        let row = row(json!({
            "initial-approval-date": "2023-08-01",
            "final-approval-date": "2023-01-05"
        }));
        let resolution = resolve_status(status::CONFIRMED_BY_PMC, &row, &[], NOW);
        assert_eq!(resolution.status, status::FINAL_APPROVAL);
    }

    #[test]
    fn milestone_inference_ignores_identifier_presence() {
        let with_pmcid = row(json!({
            "final-approval-date": "2023-08-01",
            "PMCID": "PMC11203344"
        }));
        let without_pmcid = row(json!({"final-approval-date": "2023-08-01"}));

        let a = resolve_status(status::CONFIRMED_BY_PMC, &with_pmcid, &[], NOW);
        let b = resolve_status(status::CONFIRMED_BY_PMC, &without_pmcid, &[], NOW);
        assert_eq!(a.status, status::FINAL_APPROVAL);
        assert_eq!(a.status, b.status);
    }

    #[test]
    fn no_signals_at_all_keeps_current_status() {
        let row = row(json!({"NIHMSID": "NIHMS2041577"}));
        let resolution = resolve_status(status::SUBMITTED_TO_PMC, &row, &[], NOW);
        assert_eq!(resolution.status, status::SUBMITTED_TO_PMC);
        assert!(resolution.activity.is_none());
    }

    #[test]
    fn empty_date_cell_is_not_a_milestone() {
        let row = row(json!({
            "initial-approval-date": "2023-06-12",
            "final-approval-date": "   "
        }));
        let resolution = resolve_status(status::CONFIRMED_BY_PMC, &row, &[], NOW);
        assert_eq!(resolution.status, status::INITIAL_APPROVAL);
    }

    // ── Identifier sync ─────────────────────────────────────────────

    #[test]
    fn identifiers_first_seen_create_the_metadata_block() {
        let row = row(json!({"PMID": "38917210", "PMCID": "11203344"}));
        let updated = sync_identifiers(None, &row).unwrap();

        assert_eq!(updated.pmid.as_deref(), Some("38917210"));
        assert_eq!(updated.pmcid.as_deref(), Some("PMC11203344"));
        assert!(updated.manuscript_id.is_none());
    }

    #[test]
    fn matching_identifiers_need_no_write() {
        let row = row(json!({"PMID": " 38917210 ", "PMCID": "pmc11203344"}));
        let current = DepositMetadata {
            pmid: Some("38917210".to_string()),
            pmcid: Some("PMC11203344".to_string()),
            ..DepositMetadata::default()
        };
        assert!(sync_identifiers(Some(&current), &row).is_none());
    }

    #[test]
    fn changed_pmcid_updates_only_that_field() {
        let row = row(json!({"PMCID": "PMC99000001"}));
        let current = DepositMetadata {
            manuscript_id: Some("NIHMS2041577".to_string()),
            pmid: Some("38917210".to_string()),
            pmcid: Some("PMC11203344".to_string()),
            ..DepositMetadata::default()
        };

        let updated = sync_identifiers(Some(&current), &row).unwrap();
        assert_eq!(updated.pmcid.as_deref(), Some("PMC99000001"));
        assert_eq!(updated.pmid.as_deref(), Some("38917210"));
        assert_eq!(updated.manuscript_id.as_deref(), Some("NIHMS2041577"));
    }

    #[test]
    fn absent_cells_never_clear_stored_identifiers() {
        let row = row(json!({"current-status": "complete"}));
        let current = DepositMetadata {
            pmid: Some("38917210".to_string()),
            pmcid: Some("PMC11203344".to_string()),
            ..DepositMetadata::default()
        };
        assert!(sync_identifiers(Some(&current), &row).is_none());
    }

    // ── Milestone materialization ───────────────────────────────────

    #[test]
    fn dates_materialize_in_canonical_order_with_their_own_dates() {
        let row = row(json!({
            "final-approval-date": "2023-08-01",
            "initial-approval-date": "2023-06-12",
            "current-status": "complete"
        }));

        let activities = activities_from_dates(&row);
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].status, status::INITIAL_APPROVAL);
        assert_eq!(activities[0].date_created.as_deref(), Some("2023-06-12"));
        assert_eq!(activities[1].status, status::FINAL_APPROVAL);
        assert_eq!(activities[1].date_created.as_deref(), Some("2023-08-01"));
    }

    #[test]
    fn no_dates_materialize_nothing() {
        let row = row(json!({"current-status": "received"}));
        assert!(activities_from_dates(&row).is_empty());
    }
}
