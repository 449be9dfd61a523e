//! Inbound email processing for deposit notifications.
//!
//! One message moves through a fixed pipeline: sender check, handler
//! identification, handler validation, then processing. Every path ends
//! in a terminal outcome with a [`StoredMessage`] audit row, so the
//! webhook endpoint always has something structured to persist and
//! return. Nothing here throws past the pipeline: handler trouble is
//! folded into an `ERROR` outcome.
//!
//! Handlers read and write through [`MailroomCtx`], which carries the
//! caller's store handle and a [`DepositSink`] for the status updates a
//! message triggers. The pipeline itself never persists anything.

use std::fmt;

use serde::{Deserialize, Serialize};
use signalbox_store::{StoreError, StoredMessage, SubmissionStore};
use signalbox_wire::InboundEmail;
use tracing::{debug, warn};

mod bulk;
mod catchall;
mod extract;
mod registry;

pub use bulk::BulkSubmissionHandler;
pub use catchall::CatchAllHandler;
pub use extract::{classify_severity, manuscript_id, package_id, scan_table, BulkRow};
pub use registry::{EmailHandler, HandlerRegistry};


/// Terminal outcome of one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageOutcome {
    /// Sender not on the allow-list; nothing was processed.
    Bounced,
    /// No handler claimed the message, validation failed, or the
    /// catch-all looked at it without being authoritative.
    Ignored,
    /// Every extracted item processed.
    Success,
    /// Some items processed, some failed.
    Partial,
    /// Nothing processed.
    Error,
}

impl MessageOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageOutcome::Bounced => "BOUNCED",
            MessageOutcome::Ignored => "IGNORED",
            MessageOutcome::Success => "SUCCESS",
            MessageOutcome::Partial => "PARTIAL",
            MessageOutcome::Error => "ERROR",
        }
    }
}

impl fmt::Display for MessageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A handler's verdict on whether a message it identified is one it can
/// actually work with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid { reason: String },
}

/// What a handler's `process` step produced.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub status: MessageOutcome,
    /// Deposit packages whose status update went through.
    pub deposits_processed: u32,
    /// Per-item failure descriptions; processing continues past each.
    pub errors: Vec<String>,
    /// Structured view of what was parsed, for the audit trail.
    pub parsed: Option<serde_json::Value>,
}

/// Full result of running one message through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReport {
    pub outcome: MessageOutcome,
    /// Handler that claimed the message, if one did.
    pub processor: Option<String>,
    pub deposits_processed: u32,
    pub errors: Vec<String>,
    pub parsed: Option<serde_json::Value>,
    /// Audit row for the caller to persist.
    pub message: StoredMessage,
}

/// Caller-injected mailroom settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailroomConfig {
    /// Accepted envelope senders. An empty list accepts everyone. Each
    /// entry is a full address, or a domain written as `@ncbi.nlm.nih.gov`
    /// to accept the whole domain. Matching ignores case.
    pub allowed_senders: Vec<String>,
    pub bulk: BulkConfig,
}

/// Settings for the bulk-submission handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    /// Subject substrings, at least one of which must appear for a bulk
    /// message to validate. An empty list skips the check.
    pub subject_patterns: Vec<String>,
}

/// Where handlers send the status updates a message triggers.
///
/// The engine stays pure by handing each update to the caller; a real
/// implementation resolves the package to a submission and runs the
/// optimistic-write loop, a test implementation records the calls.
pub trait DepositSink {
    /// A bulk results row resolved to a deposit package: move that
    /// package's submission to `target_status`.
    fn record_deposit_result(
        &mut self,
        package_id: &str,
        manuscript_id: Option<&str>,
        target_status: &str,
        note: &str,
    ) -> Result<(), StoreError>;

    /// A message mentioned a submission without being authoritative for
    /// it; refresh that submission's email-processing bookkeeping only.
    fn record_observation(&mut self, submission_id: &str, message_id: &str)
        -> Result<(), StoreError>;
}

/// Everything a handler may touch while processing one message.
pub struct MailroomCtx<'a> {
    pub store: &'a dyn SubmissionStore,
    pub sink: &'a mut dyn DepositSink,
    /// RFC 3339 receipt time, stamped on the audit row.
    pub received_at: &'a str,
}

/// Run one inbound message through the pipeline.
///
/// Always returns a report; the caller persists `report.message` and, on
/// processing outcomes, whatever its [`DepositSink`] accumulated.
pub fn process_inbound(
    registry: &HandlerRegistry,
    config: &MailroomConfig,
    ctx: &mut MailroomCtx<'_>,
    email: &InboundEmail,
    message_id: &str,
) -> ProcessReport {
    if !sender_allowed(config, &email.envelope.from) {
        warn!(sender = %email.envelope.from, message_id, "bounced email from disallowed sender");
        let reason = format!("sender {} is not on the allow-list", email.envelope.from);
        return terminal(MessageOutcome::Bounced, None, Some(reason), ctx, message_id);
    }

    let handler = match registry.identify(email) {
        Some(handler) => handler,
        None => {
            debug!(message_id, "no handler identified the message");
            let reason = "no handler identified the message".to_string();
            return terminal(MessageOutcome::Ignored, None, Some(reason), ctx, message_id);
        }
    };
    let processor = handler.name().to_string();

    if let Validation::Invalid { reason } = handler.validate(email, config) {
        debug!(handler = %processor, message_id, %reason, "message failed validation");
        return terminal(
            MessageOutcome::Ignored,
            Some(processor),
            Some(reason),
            ctx,
            message_id,
        );
    }

    let outcome = handler.process(ctx, email, message_id);
    debug!(
        handler = %processor,
        message_id,
        outcome = %outcome.status,
        deposits = outcome.deposits_processed,
        "message processed"
    );

    let detail = if outcome.errors.is_empty() {
        None
    } else {
        Some(outcome.errors.join("; "))
    };
    ProcessReport {
        outcome: outcome.status,
        processor: Some(processor.clone()),
        deposits_processed: outcome.deposits_processed,
        errors: outcome.errors,
        parsed: outcome.parsed,
        message: StoredMessage {
            message_id: message_id.to_string(),
            outcome: outcome.status.as_str().to_string(),
            processor: Some(processor),
            received_at: ctx.received_at.to_string(),
            detail,
        },
    }
}

fn terminal(
    outcome: MessageOutcome,
    processor: Option<String>,
    detail: Option<String>,
    ctx: &MailroomCtx<'_>,
    message_id: &str,
) -> ProcessReport {
    ProcessReport {
        outcome,
        processor: processor.clone(),
        deposits_processed: 0,
        errors: Vec::new(),
        parsed: None,
        message: StoredMessage {
            message_id: message_id.to_string(),
            outcome: outcome.as_str().to_string(),
            processor,
            received_at: ctx.received_at.to_string(),
            detail,
        },
    }
}

fn sender_allowed(config: &MailroomConfig, from: &str) -> bool {
    if config.allowed_senders.is_empty() {
        return true;
    }
    let from = from.trim().to_ascii_lowercase();
    config.allowed_senders.iter().any(|entry| {
        let entry = entry.trim().to_ascii_lowercase();
        if entry.starts_with('@') {
            from.ends_with(&entry)
        } else {
            from == entry
        }
    })
}
