use std::path::Path;

use super::{evaluation_failed, load_context, load_survey, RunOptions};
use crate::OutputFormat;

pub(crate) fn cmd_pages(survey_path: &Path, responses_path: &Path, opts: &RunOptions) {
    let survey = load_survey(survey_path, opts);
    let ctx = load_context(responses_path, opts);
    let seeder = canvass_eval::seeder_for(opts.seed);

    let pages = match canvass_eval::pages_with(&survey.root, &ctx, &*seeder) {
        Ok(p) => p,
        Err(e) => evaluation_failed(&e, opts),
    };
    let pages: Vec<Vec<&str>> = pages
        .iter()
        .map(|page| page.iter().map(|i| i.key.as_str()).collect())
        .collect();

    if opts.quiet {
        return;
    }
    match opts.output {
        OutputFormat::Text => {
            for (n, page) in pages.iter().enumerate() {
                println!("page {}: {}", n + 1, page.join(", "));
            }
        }
        OutputFormat::Json => {
            let out = serde_json::json!({ "survey": survey.id, "pages": pages });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
    }
}
