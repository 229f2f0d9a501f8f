use std::path::Path;
use std::process;

use canvass_eval::RuleStatus;

use super::{evaluation_failed, load_context, load_survey, RunOptions};
use crate::OutputFormat;

/// Run all validation rules of the visible items.
///
/// Exits with status 1 when a hard rule failed or could not be evaluated.
pub(crate) fn cmd_validate(survey_path: &Path, responses_path: &Path, opts: &RunOptions) {
    let survey = load_survey(survey_path, opts);
    let ctx = load_context(responses_path, opts);
    let seeder = canvass_eval::seeder_for(opts.seed);

    let report = match canvass_eval::validate_visible(&survey.root, &ctx, &*seeder) {
        Ok(r) => r,
        Err(e) => evaluation_failed(&e, opts),
    };
    let blocked = report.blocks_submission();

    if !opts.quiet {
        match opts.output {
            OutputFormat::Text => {
                for item in &report.items {
                    for o in &item.outcomes {
                        let status = match &o.status {
                            RuleStatus::Passed => "pass".to_string(),
                            RuleStatus::Failed => "FAIL".to_string(),
                            RuleStatus::Broken(e) => format!("BROKEN ({})", e),
                        };
                        println!("{} {}/{} [{}]", status, item.item_key, o.key, o.severity);
                    }
                }
                if blocked {
                    println!("submission blocked");
                } else {
                    println!("ok");
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report.to_json()).unwrap_or_default()
                );
            }
        }
    }

    if blocked {
        process::exit(1);
    }
}
