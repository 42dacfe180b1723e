//! Input loading and encoding detection shared across CLI commands.

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use attstmt_core::{
    decode_base64, read_cbor, read_json, AttestationEnvelope, AttestationObject,
    AttestationStatement, ByteForm, Value, AUTH_DATA_KEY,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

/// Encoding of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputEncoding {
    /// Detect from content
    Auto,
    Json,
    Cbor,
    /// Base64 text of a CBOR record
    Base64,
}

/// Encoding of converted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputEncoding {
    Json,
    Cbor,
    /// Base64 text of the CBOR encoding
    Base64,
}

/// A decoded input: a bare envelope or a full attestation object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Object(AttestationObject),
    Envelope(AttestationEnvelope),
}

impl Record {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Object(_) => "attestation object",
            Self::Envelope(_) => "attestation envelope",
        }
    }

    pub fn statement(&self) -> &AttestationStatement {
        match self {
            Self::Object(object) => object.statement(),
            Self::Envelope(envelope) => envelope.statement(),
        }
    }

    pub fn auth_data(&self) -> Option<&[u8]> {
        match self {
            Self::Object(object) => Some(&object.auth_data),
            Self::Envelope(_) => None,
        }
    }

    /// Records with an `authData` key decode as attestation objects.
    fn decode(value: &Value, form: ByteForm) -> attstmt_core::Result<Self> {
        let has_auth_data = value
            .as_map()
            .is_some_and(|entries| entries.iter().any(|(k, _)| k.as_text() == Some(AUTH_DATA_KEY)));

        if has_auth_data {
            AttestationObject::decode_as(value, form).map(Self::Object)
        } else {
            AttestationEnvelope::decode_as(value, form).map(Self::Envelope)
        }
    }

    pub fn encode(&self, encoding: OutputEncoding) -> Result<Vec<u8>> {
        let bytes = match encoding {
            OutputEncoding::Json => {
                let mut json = serde_json::to_vec_pretty(self).context("Failed to serialize JSON")?;
                json.push(b'\n');
                json
            }
            OutputEncoding::Cbor => self.to_cbor()?,
            OutputEncoding::Base64 => {
                let mut text = STANDARD.encode(self.to_cbor()?).into_bytes();
                text.push(b'\n');
                text
            }
        };
        Ok(bytes)
    }

    fn to_cbor(&self) -> Result<Vec<u8>> {
        let bytes = match self {
            Self::Object(object) => object.to_cbor(),
            Self::Envelope(envelope) => envelope.to_cbor(),
        };
        bytes.context("Failed to serialize CBOR")
    }
}

/// Read a file, refusing anything above `max_bytes`.
pub fn read_input(path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let mut bytes = Vec::new();
    file.take(max_bytes as u64 + 1)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    if bytes.len() > max_bytes {
        bail!(
            "Input file too large: {} exceeds {} bytes",
            path.display(),
            max_bytes
        );
    }
    Ok(bytes)
}

/// Guess the encoding from the first meaningful byte.
pub fn detect_encoding(bytes: &[u8]) -> InputEncoding {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => InputEncoding::Json,
        // CBOR major type 5 (map)
        Some(0xA0..=0xBF) => InputEncoding::Cbor,
        _ => InputEncoding::Base64,
    }
}

/// Decode bytes into a record, detecting the encoding when asked to.
pub fn load_record(bytes: &[u8], encoding: InputEncoding) -> Result<(Record, InputEncoding)> {
    let encoding = match encoding {
        InputEncoding::Auto => detect_encoding(bytes),
        other => other,
    };
    debug!(encoding = ?encoding, bytes = bytes.len(), "Decoding input");

    let (value, form) = parse_value(bytes, encoding)?;
    let record = Record::decode(&value, form).context("Failed to decode attestation record")?;
    debug!(fmt = %record.statement().format(), kind = record.kind(), "Decoded record");

    Ok((record, encoding))
}

fn parse_value(bytes: &[u8], encoding: InputEncoding) -> Result<(Value, ByteForm)> {
    let parsed = match encoding {
        InputEncoding::Json => (
            read_json(bytes).context("Failed to parse JSON input")?,
            ByteForm::Base64,
        ),
        InputEncoding::Cbor => (
            read_cbor(bytes).context("Failed to parse CBOR input")?,
            ByteForm::Native,
        ),
        InputEncoding::Base64 | InputEncoding::Auto => {
            let text = std::str::from_utf8(bytes)
                .context("Unrecognized input: not JSON, CBOR or base64 text")?;
            let decoded = decode_base64(text).context("Unrecognized input: invalid base64")?;
            (
                read_cbor(&decoded).context("Failed to parse CBOR input")?,
                ByteForm::Native,
            )
        }
    };
    Ok(parsed)
}

/// Well-known COSE algorithm names.
pub fn cose_algorithm_name(alg: i64) -> Option<&'static str> {
    match alg {
        -7 => Some("ES256"),
        -8 => Some("EdDSA"),
        -35 => Some("ES384"),
        -36 => Some("ES512"),
        -37 => Some("PS256"),
        -38 => Some("PS384"),
        -39 => Some("PS512"),
        -47 => Some("ES256K"),
        -257 => Some("RS256"),
        -258 => Some("RS384"),
        -259 => Some("RS512"),
        -65535 => Some("RS1"),
        _ => None,
    }
}

/// First bytes of a value as hex, with an ellipsis when truncated.
pub fn hex_preview(bytes: &[u8], max: usize) -> String {
    if bytes.len() <= max {
        hex::encode(bytes)
    } else {
        format!("{}...", hex::encode(&bytes[..max]))
    }
}
