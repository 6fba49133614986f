//! excel2bsdd - convert a bSDD Excel import template to bSDD JSON

use anyhow::{Context, Result};
use bsdd_sheets::prelude::*;
use chrono::{FixedOffset, Offset, Utc};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "excel2bsdd")]
#[command(
    author,
    version,
    about = "Convert a bSDD Excel import template into a bSDD JSON file"
)]
struct Cli {
    /// Input workbook (.xlsx or .xlsm)
    input: PathBuf,

    /// Output JSON file
    output: PathBuf,

    /// Keep null fields in the output (true/false, default: false)
    #[arg(value_parser = BoolishValueParser::new(), action = ArgAction::Set, default_value = "false")]
    with_nulls: bool,

    /// UTC offset written on date values, e.g. +02:00
    #[arg(long, value_parser = parse_utc_offset, default_value = "+00:00", allow_hyphen_values = true)]
    utc_offset: FixedOffset,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let options = ConvertOptions {
        keep_nulls: cli.with_nulls,
        utc_offset: cli.utc_offset,
        ..ConvertOptions::default()
    };

    let conversion = convert_file(&cli.input, &cli.output, options)
        .with_context(|| format!("Failed to convert '{}'", cli.input.display()))?;

    for diagnostic in &conversion.diagnostics {
        tracing::warn!("{}", diagnostic);
    }
    tracing::info!(
        output = %cli.output.display(),
        warnings = conversion.diagnostics.len(),
        "wrote bSDD JSON"
    );

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over the command-line flags.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Parse `Z`, `UTC`, `+HH:MM`, `+HHMM` or `+HH`
fn parse_utc_offset(s: &str) -> std::result::Result<FixedOffset, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    s.parse::<FixedOffset>()
        .map_err(|e| format!("invalid UTC offset '{}' ({}), expected e.g. +02:00", s, e))
}
