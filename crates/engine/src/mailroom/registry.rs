//! Handler registration and dispatch.

use signalbox_wire::InboundEmail;

use super::{
    BulkSubmissionHandler, CatchAllHandler, HandlerOutcome, MailroomConfig, MailroomCtx,
    MessageOutcome, Validation,
};

/// One kind of notification email the mailroom knows how to act on.
///
/// `identify` is a cheap shape check; `validate` applies the injected
/// configuration; `process` does the work. Splitting the three keeps
/// "not ours", "ours but unusable", and "ours and handled" as distinct
/// outcomes in the audit trail.
pub trait EmailHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Does this message look like this handler's kind?
    fn identify(&self, email: &InboundEmail) -> bool;

    /// Is this message actually usable under the current configuration?
    fn validate(&self, email: &InboundEmail, config: &MailroomConfig) -> Validation;

    /// Act on the message. Per-item failures are reported in the
    /// outcome, never panicked.
    fn process(
        &self,
        ctx: &mut MailroomCtx<'_>,
        email: &InboundEmail,
        message_id: &str,
    ) -> HandlerOutcome;
}

/// Ordered handler list; the first handler whose `identify` accepts a
/// message claims it.
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn EmailHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        HandlerRegistry {
            handlers: Vec::new(),
        }
    }

    /// The production lineup: bulk-submission first, catch-all last so
    /// every message finds some handler.
    pub fn standard() -> Self {
        let mut registry = HandlerRegistry::new();
        registry.register(Box::new(BulkSubmissionHandler));
        registry.register(Box::new(CatchAllHandler));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn EmailHandler>) {
        self.handlers.push(handler);
    }

    pub fn identify(&self, email: &InboundEmail) -> Option<&dyn EmailHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.identify(email))
            .map(|handler| handler.as_ref())
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        HandlerRegistry::new()
    }
}
