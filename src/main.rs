//! quote-scorer: multi-axis trust scoring for construction quotes
//!
//! Scores a quote, its enrichment bundle and a caller context from JSON files.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use quote_scorer::{
    cli::{self, exit_codes, ScoreConfig},
    config::{self, ConfigPreset, EngineConfig, Validatable},
    reports::ReportFormat,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quote-scorer")]
#[command(version)]
#[command(about = "Multi-axis trust scoring for construction quotes", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Score below --min-score
    3  Error occurred

EXAMPLES:
    # Score a quote with its enrichment bundle
    quote-scorer score --quote quote.json --enrichment enrichment.json --context context.json

    # Text summary, fail below grade C
    quote-scorer score --quote quote.json --context context.json -o summary --min-score 810

    # Print the axis budgets and weights
    quote-scorer axes")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Configuration preset (default, deterministic, fast), overrides the file
    #[arg(long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `score` subcommand
#[derive(Parser)]
struct ScoreArgs {
    /// Quote JSON file
    #[arg(long)]
    quote: PathBuf,

    /// Enrichment bundle JSON file (empty bundle if omitted)
    #[arg(long)]
    enrichment: Option<PathBuf>,

    /// Scoring context JSON file
    #[arg(long)]
    context: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "json")]
    output: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Exit with code 1 when the total score is below this value
    #[arg(long)]
    min_score: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a quote
    Score(ScoreArgs),

    /// Print the axis budgets and profile weights
    Axes,

    /// Print the JSON Schema of the configuration file
    ConfigSchema,
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Score(args) => {
            let engine = load_engine_config(cli.config.as_deref(), cli.preset.as_deref())?;
            let no_color = cli.no_color || std::env::var_os("NO_COLOR").is_some();
            cli::run_score(ScoreConfig {
                quote_path: args.quote,
                enrichment_path: args.enrichment,
                context_path: args.context,
                output: args.output,
                output_file: args.output_file,
                min_score: args.min_score,
                no_color,
                quiet: cli.quiet,
                engine,
            })
        }
        Commands::Axes => cli::run_axes(),
        Commands::ConfigSchema => {
            println!("{}", config::generate_json_schema());
            Ok(exit_codes::SUCCESS)
        }
    }
}

/// Resolve the engine configuration: preset if given, else the discovered file.
fn load_engine_config(
    path: Option<&std::path::Path>,
    preset: Option<&str>,
) -> Result<EngineConfig> {
    let config = if let Some(name) = preset {
        let Some(preset) = ConfigPreset::from_name(name) else {
            let valid: Vec<&str> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
            bail!("Unknown preset '{name}'. Valid options: {}", valid.join(", "));
        };
        EngineConfig::from_preset(preset)
    } else {
        let (config, loaded_from) = config::load_or_default(path);
        if let Some(source) = loaded_from {
            tracing::debug!("Loaded configuration from {}", source.display());
        }
        config
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration: {}", messages.join("; "));
    }
    Ok(config)
}
