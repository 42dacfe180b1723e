//! Inspect command implementation.

use std::path::PathBuf;

use anyhow::Result;
use attstmt_core::{AttestationFormat, AttestationStatement};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::utils::{cose_algorithm_name, hex_preview, load_record, read_input, InputEncoding, Record};

const PREVIEW_BYTES: usize = 8;

/// Field summary of a decoded record, printed as text or JSON.
#[derive(Debug, Serialize)]
struct Summary {
    kind: &'static str,
    format: AttestationFormat,
    encoding: InputEncoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    algorithm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    algorithm_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature_preview: Option<String>,
    /// Certificate sizes in bytes, leaf first
    #[serde(skip_serializing_if = "Option::is_none")]
    certificates: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_data_len: Option<usize>,
}

impl Summary {
    fn new(record: &Record, encoding: InputEncoding) -> Self {
        let statement = record.statement();
        let algorithm = statement.algorithm();
        let version = match statement {
            AttestationStatement::Tpm(s) => Some(s.ver.clone()),
            AttestationStatement::AndroidSafetyNet(s) => Some(s.ver.clone()),
            _ => None,
        };

        Self {
            kind: record.kind(),
            format: statement.format(),
            encoding,
            algorithm,
            algorithm_name: algorithm.and_then(cose_algorithm_name),
            signature_len: statement.signature().map(<[u8]>::len),
            signature_preview: statement
                .signature()
                .map(|sig| hex_preview(sig, PREVIEW_BYTES)),
            certificates: statement
                .certificate_chain()
                .map(|chain| chain.iter().map(Vec::len).collect()),
            version,
            auth_data_len: record.auth_data().map(<[u8]>::len),
        }
    }

    fn print(&self) {
        println!();
        println!("   {} {}", "Format:".dimmed(), self.format.to_string().green().bold());
        println!("   {} {}", "Record:".dimmed(), self.kind);

        if let Some(alg) = self.algorithm {
            match self.algorithm_name {
                Some(name) => println!("   {} {} ({})", "Algorithm:".dimmed(), alg, name),
                None => println!("   {} {}", "Algorithm:".dimmed(), alg),
            }
        }
        if let (Some(len), Some(preview)) = (self.signature_len, &self.signature_preview) {
            println!("   {} {} bytes ({})", "Signature:".dimmed(), len, preview);
        }
        match &self.certificates {
            Some(certs) => {
                println!("   {} {}", "Certificates:".dimmed(), certs.len());
                for (i, len) in certs.iter().enumerate() {
                    println!("     [{}] {} bytes", i, len);
                }
            }
            None if self.format == AttestationFormat::Packed => {
                println!("   {} {}", "Certificates:".dimmed(), "none (self attestation)".yellow());
            }
            None => {}
        }
        if let Some(version) = &self.version {
            println!("   {} {}", "Version:".dimmed(), version);
        }
        if let Some(len) = self.auth_data_len {
            println!("   {} {} bytes", "Auth data:".dimmed(), len);
        }
    }
}

/// Execute the inspect command.
pub fn execute(
    file: PathBuf,
    input: InputEncoding,
    json: bool,
    quiet: bool,
    config: &Config,
) -> Result<()> {
    let bytes = read_input(&file, config.max_input_bytes)?;
    info!(path = %file.display(), bytes = bytes.len(), "Read input");

    let (record, encoding) = load_record(&bytes, input)?;
    info!(fmt = %record.statement().format(), "Attestation record decoded");

    if quiet {
        return Ok(());
    }

    let summary = Summary::new(&record, encoding);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }
    Ok(())
}
