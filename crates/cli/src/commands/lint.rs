use std::path::Path;
use std::process;

use canvass_eval::{LintFinding, LintKind, Survey};

use super::{read_json_file, RunOptions};
use crate::OutputFormat;

static SURVEY_SCHEMA_STR: &str = include_str!("../../../../docs/survey-schema.json");

/// Check a survey document against the JSON Schema, then run the
/// authoring checks on the parsed tree.
///
/// Schema errors, duplicate keys and unknown references exit with status 1.
/// Forward references are reported but allowed.
pub(crate) fn cmd_lint(survey_path: &Path, opts: &RunOptions) {
    let schema: serde_json::Value = match serde_json::from_str(SURVEY_SCHEMA_STR) {
        Ok(s) => s,
        Err(e) => opts.fail(&format!(
            "internal error: failed to parse embedded survey schema: {}",
            e
        )),
    };
    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(e) => opts.fail(&format!("internal error: failed to compile schema: {}", e)),
    };

    let doc = read_json_file(survey_path, "survey", opts);
    let schema_errors: Vec<String> = validator
        .iter_errors(&doc)
        .map(|e| format!("{}", e))
        .collect();

    // The tree checks need a parseable survey; skip them when the
    // document does not even match the schema.
    let findings: Vec<LintFinding> = if schema_errors.is_empty() {
        match Survey::from_json(&doc) {
            Ok(survey) => canvass_eval::lint(&survey.root),
            Err(e) => opts.fail(&format!("error: invalid survey {}: {}", survey_path.display(), e)),
        }
    } else {
        Vec::new()
    };

    let failing = !schema_errors.is_empty()
        || findings
            .iter()
            .any(|f| f.kind != LintKind::ForwardReference);

    if !opts.quiet {
        match opts.output {
            OutputFormat::Text => {
                for e in &schema_errors {
                    println!("[schema] {}", e);
                }
                for f in &findings {
                    println!("{}", f);
                }
                if schema_errors.is_empty() && findings.is_empty() {
                    println!("clean");
                }
            }
            OutputFormat::Json => {
                let out = serde_json::json!({
                    "valid": !failing,
                    "schemaErrors": schema_errors,
                    "findings": findings.iter().map(LintFinding::to_json).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
            }
        }
    }

    if failing {
        process::exit(1);
    }
}
