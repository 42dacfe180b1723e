//! attstmt Core - WebAuthn attestation statement envelope codec
//!
//! An attestation statement travels as two sibling fields: the format tag
//! `fmt` and the format-specific payload `attStmt`. This crate decodes such a
//! record by reading `fmt` first, resolving it through a static registry, and
//! parsing `attStmt` against the selected layout. Encoding derives `fmt` from
//! the statement's variant, so tag and payload cannot disagree.
//!
//! # Features
//!
//! - Closed set of formats: packed, tpm, android-key, android-safetynet,
//!   fido-u2f, apple, none
//! - JSON (base64 byte fields) and CBOR (native byte strings) on the same types
//! - Attestation objects (`fmt`, `attStmt`, `authData`) as sent by browsers
//! - Typed decode errors; no signature verification
//!
//! # Example
//!
//! ```
//! use attstmt_core::{AttestationEnvelope, AttestationFormat, EnvelopeError};
//!
//! let envelope = AttestationEnvelope::from_json(br#"{"fmt":"none","attStmt":{}}"#)?;
//! assert_eq!(envelope.format(), AttestationFormat::None);
//!
//! let err = AttestationEnvelope::from_json(br#"{"attStmt":{}}"#).unwrap_err();
//! assert_eq!(err, EnvelopeError::MissingDiscriminator);
//! # Ok::<(), EnvelopeError>(())
//! ```

pub mod envelope;
pub mod error;
pub mod format;
pub mod object;
pub mod record;
pub mod registry;
pub mod statement;

// Re-export main types for convenience
pub use envelope::{decode, encode, AttestationEnvelope, ATT_STMT_KEY, FMT_KEY};
pub use error::{EnvelopeError, Result, MAX_RECORD_SIZE};
pub use format::AttestationFormat;
pub use object::{AttestationObject, AUTH_DATA_KEY};
pub use record::{decode_base64, read_cbor, read_json, ByteForm};
pub use registry::supported_formats;
pub use statement::{
    AndroidKeyAttestationStatement, AndroidSafetyNetAttestationStatement,
    AppleAttestationStatement, AttestationStatement, FidoU2fAttestationStatement,
    NoneAttestationStatement, PackedAttestationStatement, TpmAttestationStatement,
};

/// Re-exported so callers can build records without naming `ciborium`.
pub use ciborium::Value;
