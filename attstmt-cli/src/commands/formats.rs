//! Formats command implementation.

use attstmt_core::{supported_formats, AttestationFormat};
use colored::Colorize;

fn describe(format: AttestationFormat) -> &'static str {
    match format {
        AttestationFormat::Packed => "alg, sig, optional x5c",
        AttestationFormat::Tpm => "ver, alg, x5c, sig, certInfo, pubArea",
        AttestationFormat::AndroidKey => "alg, sig, x5c",
        AttestationFormat::AndroidSafetyNet => "ver, response",
        AttestationFormat::FidoU2f => "sig, single-certificate x5c",
        AttestationFormat::Apple => "x5c",
        AttestationFormat::None => "empty",
    }
}

/// Execute the formats command.
pub fn execute() {
    for format in supported_formats() {
        println!("{:<20} {}", format.as_str().bold(), describe(format).dimmed());
    }
}
