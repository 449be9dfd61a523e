//! Identifier and table extraction from notification email bodies.
//!
//! PMC's bulk-submission notices arrive as loosely formatted HTML with a
//! results table, or occasionally as plain text. Extraction is best
//! effort over a small, stable surface: NIHMS manuscript identifiers,
//! deposit package filenames, and `<tr><td>status</td><td>message</td>`
//! result rows.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::MessageSeverity;

/// NIHMS manuscript identifier, tolerating an optional space after the
/// prefix ("NIHMS2041577", "nihms 2041577").
static MANUSCRIPT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bNIHMS\s?(\d{6,8})\b").unwrap());

/// Deposit package filename as it appears in notices, e.g.
/// `bulksub_2023_07_31_1.zip` or `pkg.tar.gz`.
static PACKAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Za-z0-9][A-Za-z0-9_.\-]*\.(?:zip|tar(?:\.gz)?))\b").unwrap()
});

/// First NIHMS identifier in `text`, normalized to `NIHMS<digits>`.
pub fn manuscript_id(text: &str) -> Option<String> {
    MANUSCRIPT_ID
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|digits| format!("NIHMS{}", digits.as_str()))
}

/// First deposit package filename in `text`, verbatim as matched.
pub fn package_id(text: &str) -> Option<String> {
    PACKAGE_ID
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
}

/// Classify a result row's status cell.
///
/// PMC wording varies ("Error", "Failed", "Rejected - duplicate"), so
/// matching is by substring, with error phrasing checked before warning
/// phrasing.
pub fn classify_severity(text: &str) -> MessageSeverity {
    let lower = text.to_ascii_lowercase();
    if lower.contains("error") || lower.contains("fail") || lower.contains("reject") {
        MessageSeverity::Error
    } else if lower.contains("warn") {
        MessageSeverity::Warning
    } else {
        MessageSeverity::Ok
    }
}

/// One `<tr>` of a bulk results table, reduced to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRow {
    /// First cell, the row's status wording.
    pub status_text: String,
    /// Remaining cells joined, the row's message.
    pub message: String,
}

/// Pull result rows out of an HTML body.
///
/// A deliberately small scanner rather than a DOM parser: the notices
/// are machine-generated with flat `<tr>`/`<td>` structure. Rows with
/// fewer than two cells (header decoration, spacers) are dropped.
pub fn scan_table(html: &str) -> Vec<BulkRow> {
    // ASCII lowering keeps byte offsets aligned with the original.
    let lower = html.to_ascii_lowercase();
    let mut rows = Vec::new();
    let mut at = 0;

    while let Some(tr_open) = find_from(&lower, "<tr", at) {
        let body_start = match lower[tr_open..].find('>') {
            Some(i) => tr_open + i + 1,
            None => break,
        };
        let tr_end = find_from(&lower, "</tr", body_start).unwrap_or(lower.len());
        let cells = scan_cells(&html[body_start..tr_end], &lower[body_start..tr_end]);
        if cells.len() >= 2 {
            rows.push(BulkRow {
                status_text: cells[0].clone(),
                message: cells[1..].join(" "),
            });
        }
        at = tr_end;
    }
    rows
}

fn scan_cells(row_html: &str, row_lower: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut at = 0;

    while let Some(td_open) = find_from(row_lower, "<td", at) {
        let body_start = match row_lower[td_open..].find('>') {
            Some(i) => td_open + i + 1,
            None => break,
        };
        let td_end = find_from(row_lower, "</td", body_start).unwrap_or(row_lower.len());
        cells.push(clean_fragment(&row_html[body_start..td_end]));
        at = td_end;
    }
    cells
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack.get(from..)?.find(needle).map(|i| i + from)
}

/// Strip tags, decode the entities PMC notices actually use, and
/// collapse whitespace.
fn clean_fragment(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    // Ampersand last, so double-escaped text decodes one level only.
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
