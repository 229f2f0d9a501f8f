//! Subcommand implementations.
//!
//! Every command reads its inputs, reports failures through
//! [`report_error`] and exits with status 1. Successful output goes to
//! stdout; logs and errors go to stderr.

mod eval;
mod flatten;
mod lint;
mod pages;
mod validate;

use std::path::Path;
use std::process;

use canvass_eval::{EvalError, ResponseContext, Survey};

use crate::{report_error, OutputFormat};

pub(crate) use eval::cmd_eval;
pub(crate) use flatten::cmd_flatten;
pub(crate) use lint::cmd_lint;
pub(crate) use pages::cmd_pages;
pub(crate) use validate::cmd_validate;

/// Global options shared by all commands.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RunOptions {
    pub output: OutputFormat,
    pub quiet: bool,
    pub seed: Option<u64>,
}

impl RunOptions {
    /// Report `msg` and exit with status 1.
    pub(crate) fn fail(&self, msg: &str) -> ! {
        report_error(msg, self.output, self.quiet);
        process::exit(1);
    }
}

/// Read and parse a JSON file, exiting on failure.
pub(crate) fn read_json_file(path: &Path, what: &str, opts: &RunOptions) -> serde_json::Value {
    let content = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => opts.fail(&format!("error: {} file not found: {}", what, path.display())),
    };
    match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => opts.fail(&format!("error: invalid JSON in {}: {}", path.display(), e)),
    }
}

pub(crate) fn load_survey(path: &Path, opts: &RunOptions) -> Survey {
    let doc = read_json_file(path, "survey", opts);
    match Survey::from_json(&doc) {
        Ok(s) => s,
        Err(e) => opts.fail(&format!("error: invalid survey {}: {}", path.display(), e)),
    }
}

pub(crate) fn load_context(path: &Path, opts: &RunOptions) -> ResponseContext {
    let doc = read_json_file(path, "responses", opts);
    match canvass_eval::context_from_json(&doc) {
        Ok(c) => c,
        Err(e) => opts.fail(&format!("error: invalid responses {}: {}", path.display(), e)),
    }
}

pub(crate) fn evaluation_failed(e: &EvalError, opts: &RunOptions) -> ! {
    opts.fail(&format!("evaluation error: {}", e))
}
