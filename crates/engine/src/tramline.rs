//! Rendering of a submission's progress as an ordered line of stops.
//!
//! The tramline is the presentation-ready view of the deposit workflow:
//! one stop per critical-path slot, each annotated with completion,
//! error/warning flavor, and a human-readable date. It is derived
//! entirely from the persisted activity trail plus the current status,
//! so it can be recomputed at any time without touching storage.
//!
//! The renderer reads no clock. The caller passes `reference` (normally
//! the request time) and identical inputs always produce identical
//! output.

use serde::Serialize;
use signalbox_wire::StateKind;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::types::{Activity, Workflow};

/// One stop on the rendered line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TramStop {
    /// Workflow status name this stop currently represents.
    pub status: String,
    /// Display label for that status.
    pub title: String,
    /// Date annotation, when the trail or current status provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub completed: bool,
    pub error: bool,
    pub warning: bool,
}

/// A rendered tramline: the stops in critical-path order, and whether
/// the submission has reached the end of the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tramline {
    pub stops: Vec<TramStop>,
    pub ended: bool,
}

/// Render the tramline for one submission.
///
/// Each critical-path slot covers its anchor state plus that anchor's
/// mutually-exclusive alternates, so a rejection or withdrawal shows up
/// in the slot of the state it displaced. A slot is `completed` once it
/// or any later slot has been reached, which keeps earlier stops filled
/// in even when their activities were never recorded.
///
/// A `current_status` missing from the workflow renders as a single
/// errored stop rather than failing: stored statuses can drift ahead of
/// the workflow document, and the line must still draw.
pub fn generate_tramline(
    workflow: &Workflow,
    current_status: &str,
    activities: &[Activity],
    reference: &str,
) -> Tramline {
    if workflow.states().is_empty() && workflow.critical_path().is_empty() {
        return Tramline {
            stops: Vec::new(),
            ended: false,
        };
    }

    if !workflow.has_state(current_status) {
        return Tramline {
            stops: vec![TramStop {
                status: current_status.to_string(),
                title: format!("Unknown Status: {}", current_status),
                subtitle: None,
                completed: true,
                error: true,
                warning: false,
            }],
            ended: true,
        };
    }

    let path = workflow.critical_path();
    let slots: Vec<Vec<&str>> = (0..path.len()).map(|i| workflow.slot_members(i)).collect();

    let reached: Vec<bool> = slots
        .iter()
        .map(|members| {
            members
                .iter()
                .any(|m| *m == current_status || activities.iter().any(|a| a.status == *m))
        })
        .collect();

    let stops = slots
        .iter()
        .enumerate()
        .map(|(i, members)| {
            let holds_current = members.iter().any(|m| *m == current_status);

            // The member shown for this slot: the current status when it
            // sits here, else the most recently recorded member, else the
            // critical-path anchor.
            let shown = if holds_current {
                current_status
            } else {
                activities
                    .iter()
                    .rev()
                    .find(|a| members.iter().any(|m| *m == a.status))
                    .map(|a| a.status.as_str())
                    .unwrap_or(path[i].as_str())
            };

            let (error, warning) = if holds_current {
                match workflow.kind(current_status) {
                    StateKind::Failure => (true, false),
                    StateKind::Warning => (false, true),
                    StateKind::Normal => (false, false),
                }
            } else {
                (false, false)
            };

            let subtitle = activities
                .iter()
                .rev()
                .filter(|a| members.iter().any(|m| *m == a.status))
                .find_map(|a| a.date_created.as_deref())
                .map(format_stop_date)
                .or_else(|| holds_current.then(|| format_stop_date(reference)));

            TramStop {
                status: shown.to_string(),
                title: workflow.label(shown).to_string(),
                subtitle,
                completed: reached[i..].iter().any(|r| *r),
                error,
                warning,
            }
        })
        .collect();

    let ended = reached.last().copied().unwrap_or(false);
    Tramline { stops, ended }
}

/// Format a stored timestamp for display, e.g. `2 Aug 2023`.
///
/// Accepts RFC 3339 or bare `YYYY-MM-DD` values; anything else passes
/// through unchanged so a malformed trail still renders.
fn format_stop_date(raw: &str) -> String {
    let display = format_description!("[day padding:none] [month repr:short] [year]");
    let date_only = format_description!("[year]-[month]-[day]");

    let parsed = OffsetDateTime::parse(raw, &Rfc3339)
        .map(|dt| dt.date())
        .or_else(|_| Date::parse(raw, date_only));

    match parsed {
        Ok(date) => date.format(display).unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}
