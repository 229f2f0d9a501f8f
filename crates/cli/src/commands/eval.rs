use std::path::Path;

use super::{evaluation_failed, load_context, read_json_file, RunOptions};
use crate::OutputFormat;

/// Evaluate one expression file against a response document.
pub(crate) fn cmd_eval(expr_path: &Path, responses_path: &Path, opts: &RunOptions) {
    let raw = read_json_file(expr_path, "expression", opts);
    let expr = match canvass_eval::parse_expression(&raw) {
        Ok(e) => e,
        Err(e) => opts.fail(&format!("error: invalid expression {}: {}", expr_path.display(), e)),
    };
    let ctx = load_context(responses_path, opts);

    let value = match canvass_eval::evaluate(&expr, &ctx) {
        Ok(v) => v,
        Err(e) => evaluation_failed(&e, opts),
    };

    if opts.quiet {
        return;
    }
    match opts.output {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            let out = serde_json::json!({
                "expression": expr.to_string(),
                "value": value.to_json(),
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
    }
}
