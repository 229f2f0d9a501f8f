mod commands;
mod config;
mod telemetry;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use commands::{cmd_eval, cmd_flatten, cmd_lint, cmd_pages, cmd_validate, RunOptions};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn from_config(name: &str) -> Option<OutputFormat> {
        match name {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Canvass survey engine.
#[derive(Parser)]
#[command(name = "canvass", version, about = "Canvass survey engine")]
struct Cli {
    /// Output format (text or json); overrides canvass.toml
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a canvass.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed seed for random-subset groups; overrides canvass.toml
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the visible questions of a survey for one respondent
    Flatten {
        /// Path to the survey JSON document
        survey: PathBuf,
        /// Path to the response JSON document
        #[arg(long)]
        responses: PathBuf,
    },

    /// List the visible questions split into pages
    Pages {
        /// Path to the survey JSON document
        survey: PathBuf,
        /// Path to the response JSON document
        #[arg(long)]
        responses: PathBuf,
    },

    /// Run validation rules of all visible items (exit 1 when submission is blocked)
    Validate {
        /// Path to the survey JSON document
        survey: PathBuf,
        /// Path to the response JSON document
        #[arg(long)]
        responses: PathBuf,
    },

    /// Evaluate a single expression against a response document
    Eval {
        /// Path to the expression JSON file
        expression: PathBuf,
        /// Path to the response JSON document
        #[arg(long)]
        responses: PathBuf,
    },

    /// Check a survey against the JSON Schema and report authoring problems
    Lint {
        /// Path to the survey JSON document
        survey: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(
                &format!("error: {}", e),
                cli.output.unwrap_or(OutputFormat::Text),
                cli.quiet,
            );
            process::exit(1);
        }
    };

    let output = cli
        .output
        .or_else(|| config.output.format.as_deref().and_then(OutputFormat::from_config))
        .unwrap_or(OutputFormat::Text);

    telemetry::init_tracing(
        config.logging.json,
        telemetry::parse_level(&config.logging.level),
    );

    let opts = RunOptions {
        output,
        quiet: cli.quiet,
        seed: cli.seed.or(config.selection.seed),
    };
    tracing::debug!(?output, seed = ?opts.seed, "starting");

    match cli.command {
        Commands::Flatten { survey, responses } => cmd_flatten(&survey, &responses, &opts),
        Commands::Pages { survey, responses } => cmd_pages(&survey, &responses, &opts),
        Commands::Validate { survey, responses } => cmd_validate(&survey, &responses, &opts),
        Commands::Eval {
            expression,
            responses,
        } => cmd_eval(&expression, &responses, &opts),
        Commands::Lint { survey } => cmd_lint(&survey, &opts),
    }
}

/// Report an error to stderr in the selected output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
