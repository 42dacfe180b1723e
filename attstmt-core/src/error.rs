use thiserror::Error;

use crate::format::AttestationFormat;

/// Largest serialized record accepted by the byte-level decoders (64 KiB).
///
/// TPM statements with a full certificate chain stay well under 8 KiB.
pub const MAX_RECORD_SIZE: usize = 64 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The record has no `fmt` field, or is not a map at all.
    #[error("Missing attestation format discriminator `fmt`")]
    MissingDiscriminator,

    /// `fmt` is present but does not name a registered format.
    #[error("Unknown attestation format: {0}")]
    UnknownFormat(String),

    /// `attStmt` does not match the schema selected by `fmt`.
    #[error("Malformed `{format}` attestation statement: {reason}")]
    MalformedPayload {
        format: AttestationFormat,
        reason: String,
    },

    #[error("Duplicate `{0}` field in attestation record")]
    DuplicateField(&'static str),

    /// A field of the surrounding attestation object is missing or mistyped.
    #[error("Malformed attestation object: {0}")]
    MalformedRecord(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Record too large: {size} bytes exceeds limit of {max} bytes")]
    RecordTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
