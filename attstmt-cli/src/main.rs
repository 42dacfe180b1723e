//! attstmt CLI - inspect and convert WebAuthn attestation statements.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod exit_codes;
mod utils;

use config::{ColorChoice, Config};
use exit_codes::ExitCode;
use utils::{InputEncoding, OutputEncoding};

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  65  Record could not be decoded (unknown format, malformed payload, bad input)
  66  Input file missing, unreadable or too large
  74  Output could not be written";

#[derive(Parser)]
#[command(name = "attstmt")]
#[command(author, version, about = "WebAuthn attestation statement codec", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Enable debug logging for attstmt on stderr, on top of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to use colors (overrides ATTSTMT_COLOR)
    #[arg(long, value_enum, global = true, value_name = "WHEN")]
    color: Option<ColorChoice>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a record and print a summary of its statement
    Inspect {
        /// Path to an attestation envelope or attestation object
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Input encoding
        #[arg(short, long, value_enum, default_value = "auto")]
        input: InputEncoding,

        /// Print the summary as JSON
        #[arg(long, conflicts_with = "quiet")]
        json: bool,

        /// Print nothing; only the exit code reports the result
        #[arg(short, long)]
        quiet: bool,
    },

    /// Re-encode a record as JSON, CBOR or base64
    Convert {
        /// Path to an attestation envelope or attestation object
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output encoding
        #[arg(short, long, value_enum)]
        to: OutputEncoding,

        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Input encoding
        #[arg(short, long, value_enum, default_value = "auto")]
        input: InputEncoding,
    },

    /// List the supported attestation formats
    Formats,
}

fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    let mut directives = rust_log
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("warn")
        .to_string();
    if verbose {
        directives.push_str(",attstmt=debug,attstmt_core=debug");
    }
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_tracing(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(rust_log.as_deref(), verbose);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Inspect {
            file,
            input,
            json,
            quiet,
        } => commands::inspect::execute(file, input, json, quiet, config),
        Commands::Convert {
            file,
            to,
            output,
            input,
        } => commands::convert::execute(file, input, to, output, config),
        Commands::Formats => {
            commands::formats::execute();
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_env().with_color(cli.color);
    config.color.apply();

    if let Err(err) = run(cli, &config) {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = exit.message {
            eprintln!("{} {}", "error:".red().bold(), message);
        }
        std::process::exit(exit.code);
    }
}
