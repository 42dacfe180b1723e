//! Convert command implementation.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use crate::config::Config;
use crate::utils::{load_record, read_input, InputEncoding, OutputEncoding};

/// Execute the convert command.
pub fn execute(
    file: PathBuf,
    input: InputEncoding,
    to: OutputEncoding,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let bytes = read_input(&file, config.max_input_bytes)?;
    let (record, from) = load_record(&bytes, input)?;
    let encoded = record.encode(to)?;

    info!(from = ?from, to = ?to, bytes = encoded.len(), "Converted record");

    match output {
        Some(path) => {
            std::fs::write(&path, &encoded)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            eprintln!(
                "{} {} ({}) -> {}",
                "Converted".green().bold(),
                record.statement().format(),
                record.kind(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&encoded)
                .and_then(|()| stdout.flush())
                .context("Failed to write output to stdout")?;
        }
    }
    Ok(())
}
