use anyhow::{Context, Result};
use clap::Parser;
use json2metrics::{init_tracing, run};
use json2metrics_config::{InputMode, RuntimeConfig};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Convert JSON payloads into metric records
#[derive(Parser)]
#[command(name = "json2metrics")]
#[command(version)]
#[command(about = "Convert JSON payloads into metric records (one JSON object per line)", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read the payload from FILE instead of stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Treat every non-blank line as one JSON object
    #[arg(short, long)]
    lines: bool,

    /// Fallback metric name (overrides config file)
    #[arg(short = 'n', long, value_name = "NAME")]
    metric_name: Option<String>,

    /// Key whose value becomes a tag; repeatable (replaces configured tag keys)
    #[arg(short = 't', long = "tag-key", value_name = "KEY")]
    tag_keys: Vec<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Load base configuration
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::load().context("Failed to load configuration")?,
    };

    // Step 2: Apply CLI overrides (highest priority)
    if cli.lines {
        config.input.mode = InputMode::Lines;
    }
    if let Some(name) = cli.metric_name {
        config.converter.default_metric_name = name;
    }
    if !cli.tag_keys.is_empty() {
        config.converter.tag_keys = cli.tag_keys.into_iter().collect();
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    config.validate()?;

    // Step 3: Initialize logging, then convert
    init_tracing(&config);

    let stdout = io::stdout();
    let output = BufWriter::new(stdout.lock());
    match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            run(&config, file, output)?;
        }
        None => {
            run(&config, io::stdin().lock(), output)?;
        }
    }

    Ok(())
}
