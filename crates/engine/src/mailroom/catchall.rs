//! Last-resort handler for email nobody else claims.
//!
//! PMC sends plenty of correspondence that is about a manuscript
//! without being a result notice: review reminders, curator questions,
//! galley approvals. This handler looks for a NIHMS identifier, ties
//! the message to the matching submission when one exists, and leaves
//! the submission's status alone. Its messages are recorded as
//! `IGNORED`, never `SUCCESS`: seeing a manuscript mentioned is not the
//! same as being the authoritative handler for the message.

use serde_json::json;
use signalbox_wire::InboundEmail;

use super::extract;
use super::{
    EmailHandler, HandlerOutcome, MailroomConfig, MailroomCtx, MessageOutcome, Validation,
};

pub struct CatchAllHandler;

impl EmailHandler for CatchAllHandler {
    fn name(&self) -> &'static str {
        "catch-all"
    }

    fn identify(&self, _email: &InboundEmail) -> bool {
        true
    }

    fn validate(&self, _email: &InboundEmail, _config: &MailroomConfig) -> Validation {
        Validation::Valid
    }

    fn process(
        &self,
        ctx: &mut MailroomCtx<'_>,
        email: &InboundEmail,
        message_id: &str,
    ) -> HandlerOutcome {
        let manuscript = extract::manuscript_id(&email.subject)
            .or_else(|| email.plain.as_deref().and_then(extract::manuscript_id))
            .or_else(|| email.html.as_deref().and_then(extract::manuscript_id));

        let manuscript = match manuscript {
            Some(manuscript) => manuscript,
            None => {
                return HandlerOutcome {
                    status: MessageOutcome::Ignored,
                    deposits_processed: 0,
                    errors: Vec::new(),
                    parsed: None,
                }
            }
        };
        let parsed = Some(json!({ "manuscriptId": manuscript }));

        match ctx.store.find_by_manuscript_id(&manuscript) {
            Ok(Some(record)) => {
                match ctx.sink.record_observation(&record.submission_id, message_id) {
                    Ok(()) => HandlerOutcome {
                        status: MessageOutcome::Ignored,
                        deposits_processed: 0,
                        errors: Vec::new(),
                        parsed,
                    },
                    Err(err) => HandlerOutcome {
                        status: MessageOutcome::Error,
                        deposits_processed: 0,
                        errors: vec![format!("submission {}: {}", record.submission_id, err)],
                        parsed,
                    },
                }
            }
            Ok(None) => HandlerOutcome {
                status: MessageOutcome::Ignored,
                deposits_processed: 0,
                errors: Vec::new(),
                parsed,
            },
            Err(err) => HandlerOutcome {
                status: MessageOutcome::Error,
                deposits_processed: 0,
                errors: vec![format!("manuscript lookup failed: {}", err)],
                parsed,
            },
        }
    }
}
