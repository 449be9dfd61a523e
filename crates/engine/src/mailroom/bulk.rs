//! Handler for PMC bulk-submission result emails.
//!
//! One email reports the fate of a whole batch of deposit packages,
//! one table row per package. Each row is resolved independently: a
//! success or warning row confirms its package's deposit, an error row
//! rejects it, and one bad row never blocks its siblings.

use serde_json::json;
use signalbox_wire::InboundEmail;

use super::extract;
use super::{
    EmailHandler, HandlerOutcome, MailroomConfig, MailroomCtx, MessageOutcome, Validation,
};
use crate::types::status;

pub struct BulkSubmissionHandler;

impl EmailHandler for BulkSubmissionHandler {
    fn name(&self) -> &'static str {
        "bulk-submission"
    }

    fn identify(&self, email: &InboundEmail) -> bool {
        email.subject.to_ascii_lowercase().contains("bulk submission")
    }

    fn validate(&self, email: &InboundEmail, config: &MailroomConfig) -> Validation {
        if !config.bulk.subject_patterns.is_empty() {
            let subject = email.subject.to_ascii_lowercase();
            let matched = config
                .bulk
                .subject_patterns
                .iter()
                .any(|pattern| subject.contains(&pattern.to_ascii_lowercase()));
            if !matched {
                return Validation::Invalid {
                    reason: "subject matches no configured bulk-submission pattern".to_string(),
                };
            }
        }

        let html_empty = email.html.as_deref().map(str::trim).unwrap_or("").is_empty();
        if html_empty && email.plain_or_empty().trim().is_empty() {
            return Validation::Invalid {
                reason: "message has no body to parse".to_string(),
            };
        }
        Validation::Valid
    }

    fn process(
        &self,
        ctx: &mut MailroomCtx<'_>,
        email: &InboundEmail,
        _message_id: &str,
    ) -> HandlerOutcome {
        let rows = collect_rows(email);
        if rows.is_empty() {
            return HandlerOutcome {
                status: MessageOutcome::Error,
                deposits_processed: 0,
                errors: vec!["no result rows found in message body".to_string()],
                parsed: None,
            };
        }

        let mut processed = 0u32;
        let mut errors = Vec::new();
        let mut parsed_rows = Vec::new();

        for row in &rows {
            let severity = extract::classify_severity(&row.status_text);
            parsed_rows.push(json!({
                "status": row.status_text,
                "message": row.message,
                "severity": severity.as_str(),
            }));

            let package = match extract::package_id(&row.message) {
                Some(package) => package,
                None => {
                    errors.push(format!(
                        "row \"{}\" names no deposit package",
                        &row.status_text
                    ));
                    continue;
                }
            };
            let manuscript = if severity.is_error() {
                None
            } else {
                extract::manuscript_id(&row.message)
            };
            let target = if severity.is_error() {
                status::REJECTED_BY_PMC
            } else {
                status::CONFIRMED_BY_PMC
            };

            match ctx
                .sink
                .record_deposit_result(&package, manuscript.as_deref(), target, &row.message)
            {
                Ok(()) => processed += 1,
                Err(err) => errors.push(format!("package {}: {}", package, err)),
            }
        }

        let outcome = if processed == 0 {
            MessageOutcome::Error
        } else if errors.is_empty() {
            MessageOutcome::Success
        } else {
            MessageOutcome::Partial
        };
        HandlerOutcome {
            status: outcome,
            deposits_processed: processed,
            errors,
            parsed: Some(json!({ "rows": parsed_rows })),
        }
    }
}

/// Rows from the HTML table, or the whole plain body as one row when no
/// table turned up.
fn collect_rows(email: &InboundEmail) -> Vec<extract::BulkRow> {
    if let Some(html) = email.html.as_deref() {
        let rows = extract::scan_table(html);
        if !rows.is_empty() {
            return rows;
        }
    }

    let plain = email.plain_or_empty().trim();
    if plain.is_empty() {
        return Vec::new();
    }
    vec![extract::BulkRow {
        status_text: plain.to_string(),
        message: plain.to_string(),
    }]
}
