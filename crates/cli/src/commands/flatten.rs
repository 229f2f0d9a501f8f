use std::path::Path;

use super::{evaluation_failed, load_context, load_survey, RunOptions};
use crate::OutputFormat;

pub(crate) fn cmd_flatten(survey_path: &Path, responses_path: &Path, opts: &RunOptions) {
    let survey = load_survey(survey_path, opts);
    let ctx = load_context(responses_path, opts);
    let seeder = canvass_eval::seeder_for(opts.seed);

    let visible = match canvass_eval::flatten_with(&survey.root, &ctx, &*seeder) {
        Ok(items) => items,
        Err(e) => evaluation_failed(&e, opts),
    };

    if opts.quiet {
        return;
    }
    match opts.output {
        OutputFormat::Text => {
            for item in &visible {
                println!("{}", item.key);
            }
        }
        OutputFormat::Json => {
            let keys: Vec<&str> = visible.iter().map(|i| i.key.as_str()).collect();
            let out = serde_json::json!({ "survey": survey.id, "visible": keys });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
    }
}
