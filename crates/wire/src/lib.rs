//! Boundary JSON shapes and validated parsing for signalbox.
//!
//! Everything the reconciliation core hears from the outside world arrives
//! as JSON: status notifications from the image-integrity service, rows
//! polled from the deposit tracker, inbound email webhooks, and curated
//! workflow documents. This crate owns the typed shapes of those payloads
//! and the one place where raw JSON is validated into them.
//!
//! The parsers reject malformed skeletons and normalize the rest, so the
//! engine crate never branches on "was this field really a string". See
//! [`parse`] for the entry points and the lenient/strict split.

pub mod parse;
pub mod types;

pub use parse::{
    parse_inbound_email, parse_stage_notice, parse_tracker_row, parse_workflow_doc, WireError,
};
pub use types::{
    columns, Envelope, InboundEmail, StageNotice, StateDoc, StateKind, TrackerRow, TransitionDoc,
    WorkflowDoc,
};
