//! Validates the shared fixture payloads against the formal schemas in
//! schema/ and confirms the parsers accept every fixture.
//!
//! Fixtures are grouped by filename prefix: notice-*, tracker-row-*,
//! email-*, workflow-*.

use std::path::{Path, PathBuf};

use signalbox_wire::{
    parse_inbound_email, parse_stage_notice, parse_tracker_row, parse_workflow_doc,
};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn load_validator(schema_file: &str) -> jsonschema::Validator {
    let schema_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../schema")
        .join(schema_file);
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile {}: {}", schema_file, e))
}

fn collect_fixtures(prefix: &str) -> Vec<PathBuf> {
    let mut paths: Vec<_> = std::fs::read_dir(fixtures_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().map_or(false, |e| e == "json")
                && p.file_name()
                    .map_or(false, |n| n.to_string_lossy().starts_with(prefix))
        })
        .collect();
    paths.sort();
    paths
}

fn check_family<P>(prefix: &str, schema_file: &str, parse: P)
where
    P: Fn(&serde_json::Value) -> bool,
{
    let validator = load_validator(schema_file);
    let mut tested = 0usize;
    let mut failures = Vec::new();

    for path in collect_fixtures(prefix) {
        let src = std::fs::read_to_string(&path).unwrap();
        let instance: serde_json::Value = serde_json::from_str(&src).unwrap();

        if let Err(error) = validator.validate(&instance) {
            failures.push(format!("{}: schema: {}", path.display(), error));
        }
        if !parse(&instance) {
            failures.push(format!("{}: parser rejected fixture", path.display()));
        }
        tested += 1;
    }

    assert!(tested > 0, "No {}* fixtures found -- check paths", prefix);
    assert!(
        failures.is_empty(),
        "{} of {} {}* fixtures failed:\n{}",
        failures.len(),
        tested,
        prefix,
        failures.join("\n")
    );
}

#[test]
fn stage_notice_fixtures_validate_and_parse() {
    check_family("notice-", "stage-notice.schema.json", |v| {
        parse_stage_notice(v).is_ok()
    });
}

#[test]
fn tracker_row_fixtures_validate_and_parse() {
    check_family("tracker-row-", "tracker-row.schema.json", |v| {
        parse_tracker_row(v).is_ok()
    });
}

#[test]
fn email_fixtures_validate_and_parse() {
    check_family("email-", "inbound-email.schema.json", |v| {
        parse_inbound_email(v).is_ok()
    });
}

#[test]
fn workflow_fixtures_validate_and_parse() {
    check_family("workflow-", "workflow.schema.json", |v| {
        parse_workflow_doc(v).is_ok()
    });
}
