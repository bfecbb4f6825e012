use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Read};
use tracefold::{cli::Cli, config::TracefoldConfig, json_trace};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Resolve active patterns: `--pattern` flags, then `--config`, then the built-in default
fn load_config(args: &Cli) -> Result<TracefoldConfig> {
    let mut config = match &args.config {
        Some(path) => TracefoldConfig::from_toml(path)?,
        None => TracefoldConfig::embedded_default()?,
    };
    if !args.patterns.is_empty() {
        config.consolidation.patterns = args.patterns.clone();
    }
    Ok(config)
}

fn read_input(args: &Cli) -> Result<Vec<tracefold::operation::Operation>> {
    match &args.input {
        Some(path) => json_trace::read_trace(path),
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read operation log from stdin")?;
            json_trace::parse_trace(&content)
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let engine = config
        .build_engine()
        .context("Failed to activate configured patterns")?;

    if args.list_patterns {
        for kind in engine.list_active_pattern_kinds() {
            println!("{}", kind);
        }
        return Ok(());
    }

    let input = read_input(&args)?;
    let consolidation = engine
        .interpret_with_stats(&input)
        .context("Failed to consolidate operation log")?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            json_trace::write_trace(BufWriter::new(file), &consolidation.operations, args.pretty)?;
        }
        None => {
            let stdout = io::stdout();
            json_trace::write_trace(stdout.lock(), &consolidation.operations, args.pretty)?;
        }
    }

    if args.stats {
        eprintln!("=== Consolidation Summary ===");
        eprintln!("{}", consolidation.stats);
    }

    Ok(())
}
