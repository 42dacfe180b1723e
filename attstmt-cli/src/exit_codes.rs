//! Exit codes following sysexits.h conventions.
//!
//! Scripts can tell a rejected attestation apart from a missing file or a
//! failed write.

use attstmt_core::EnvelopeError;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Data format error (record could not be decoded).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        let decode_failed = err
            .chain()
            .any(|cause| cause.downcast_ref::<EnvelopeError>().is_some());

        let code = if decode_failed || message.contains("Unrecognized input") {
            DATA_ERROR
        } else if message.contains("Failed to read") || message.contains("Input file too large") {
            INPUT_ERROR
        } else if message.contains("Failed to write") {
            IO_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}
