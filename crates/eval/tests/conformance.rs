//! Evaluator conformance test suite.
//!
//! Each test case is a fixture triplet under `conformance/`:
//! - `<name>.survey.json`    -- survey document
//! - `<name>.responses.json` -- one respondent's response document
//! - `<name>.expected.json`  -- expected outcome
//!
//! Expected files list only the fields a case cares about: `visible`,
//! `visibleCount`, `pages`, `blocksSubmission`, `failures` (as
//! `item/rule`), or `error` (a prefix of the error message).

use std::path::{Path, PathBuf};

fn conformance_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("conformance")
}

fn read_json(path: &Path) -> serde_json::Value {
    let src = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&src)
        .unwrap_or_else(|e| panic!("Invalid JSON in {}: {}", path.display(), e))
}

/// Run a conformance fixture.
///
/// 1. Load survey and responses
/// 2. Evaluate survey for the respondent
/// 3. Compare the fields present in the expected file
fn run_fixture(name: &str) {
    let dir = conformance_dir();
    let survey = read_json(&dir.join(format!("{}.survey.json", name)));
    let responses = read_json(&dir.join(format!("{}.responses.json", name)));
    let expected = read_json(&dir.join(format!("{}.expected.json", name)));

    let result = canvass_eval::evaluate_survey(&survey, &responses, None);

    if let Some(message) = expected.get("error").and_then(|v| v.as_str()) {
        let err = match result {
            Ok(r) => panic!("Expected error for {}, got {:?}", name, r.visible),
            Err(e) => e.to_string(),
        };
        assert!(
            err.starts_with(message),
            "Error mismatch for {}\n\nActual: {}\nExpected prefix: {}",
            name,
            err,
            message
        );
        return;
    }

    let result = result.unwrap_or_else(|e| panic!("Evaluation failed for {}: {}", name, e));

    if let Some(visible) = expected.get("visible") {
        assert_eq!(
            &serde_json::json!(result.visible),
            visible,
            "Visible items mismatch for {}",
            name
        );
    }
    if let Some(count) = expected.get("visibleCount").and_then(|v| v.as_u64()) {
        assert_eq!(result.visible.len() as u64, count, "Visible count mismatch for {}", name);
    }
    if let Some(pages) = expected.get("pages") {
        assert_eq!(&serde_json::json!(result.pages), pages, "Pages mismatch for {}", name);
    }
    if let Some(blocks) = expected.get("blocksSubmission").and_then(|v| v.as_bool()) {
        assert_eq!(
            result.validation.blocks_submission(),
            blocks,
            "Submission blocking mismatch for {}",
            name
        );
    }
    if let Some(failures) = expected.get("failures") {
        let actual: Vec<String> = result
            .validation
            .failures()
            .map(|(item, o)| format!("{}/{}", item, o.key))
            .collect();
        assert_eq!(&serde_json::json!(actual), failures, "Failures mismatch for {}", name);
    }
}

// ──────────────────────────────────────────────
// Visibility
// ──────────────────────────────────────────────

#[test]
fn dependent_item_shown() {
    run_fixture("dependent_item_shown");
}

#[test]
fn dependent_item_hidden() {
    run_fixture("dependent_item_hidden");
}

#[test]
fn group_condition_false() {
    run_fixture("group_condition_false");
}

#[test]
fn forward_reference() {
    run_fixture("forward_reference");
}

#[test]
fn participant_flags_and_context() {
    run_fixture("participant_flags_and_context");
}

#[test]
fn recent_date() {
    run_fixture("recent_date");
}

#[test]
fn condition_error() {
    run_fixture("condition_error");
}

// ──────────────────────────────────────────────
// Selection and paging
// ──────────────────────────────────────────────

#[test]
fn random_subset() {
    run_fixture("random_subset");
}

#[test]
fn random_subset_is_stable_across_runs() {
    let dir = conformance_dir();
    let survey = read_json(&dir.join("random_subset.survey.json"));
    let responses = read_json(&dir.join("random_subset.responses.json"));
    let first = canvass_eval::evaluate_survey(&survey, &responses, None).unwrap();
    let second = canvass_eval::evaluate_survey(&survey, &responses, None).unwrap();
    assert_eq!(first.visible, second.visible);

    let fixed_a = canvass_eval::evaluate_survey(&survey, &responses, Some(9)).unwrap();
    let fixed_b = canvass_eval::evaluate_survey(&survey, &responses, Some(9)).unwrap();
    assert_eq!(fixed_a.visible, fixed_b.visible);
}

#[test]
fn page_breaks() {
    run_fixture("page_breaks");
}

// ──────────────────────────────────────────────
// Validation
// ──────────────────────────────────────────────

#[test]
fn hard_rule_blocks() {
    run_fixture("hard_rule_blocks");
}

#[test]
fn hard_rule_blocks_nested_empty() {
    run_fixture("hard_rule_blocks_nested_empty");
}

// ──────────────────────────────────────────────
// Schema
// ──────────────────────────────────────────────

#[test]
fn all_fixture_surveys_match_schema() {
    let schema_path = conformance_dir()
        .parent()
        .unwrap()
        .join("docs")
        .join("survey-schema.json");
    let schema = read_json(&schema_path);
    let validator = jsonschema::validator_for(&schema)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e));

    let mut paths: Vec<_> = std::fs::read_dir(conformance_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.to_string_lossy().ends_with(".survey.json"))
        .collect();
    paths.sort();

    let mut failures = Vec::new();
    for path in &paths {
        if let Err(error) = validator.validate(&read_json(path)) {
            failures.push(format!("{}: {}", path.display(), error));
        }
    }

    assert!(!paths.is_empty(), "No survey fixtures found -- check paths");
    assert!(
        failures.is_empty(),
        "Schema validation failed for {} of {} files:\n{}",
        failures.len(),
        paths.len(),
        failures.join("\n")
    );
}

#[test]
fn schema_rejects_unknown_operator() {
    let schema = read_json(&conformance_dir().parent().unwrap().join("docs/survey-schema.json"));
    let validator = jsonschema::validator_for(&schema).unwrap();
    let doc = serde_json::json!({
        "id": "x",
        "root": { "kind": "question", "key": "q", "role": "text",
                  "condition": { "name": "frobnicate", "args": [] } }
    });
    assert!(!validator.is_valid(&doc));
}
