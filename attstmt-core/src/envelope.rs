//! The `{fmt, attStmt}` envelope codec.
//!
//! On the wire the format tag and the payload are sibling fields, so the
//! payload schema is unknown until the tag has been read. Decoding therefore
//! buffers the record as a [`Value`], resolves `fmt` through the registry, and
//! only then parses `attStmt`. Encoding never stores a tag: `fmt` is read from
//! the wrapped statement's variant.

use ciborium::Value;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, instrument, trace};

use crate::error::{EnvelopeError, Result};
use crate::format::AttestationFormat;
use crate::record::{find_field, read_cbor, read_json, write_cbor, ByteForm};
use crate::registry;
use crate::statement::AttestationStatement;

/// Key of the format discriminator.
pub const FMT_KEY: &str = "fmt";

/// Key of the format-specific payload.
pub const ATT_STMT_KEY: &str = "attStmt";

/// An attestation statement together with its derived `fmt` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationEnvelope {
    statement: AttestationStatement,
}

impl AttestationEnvelope {
    /// Wrap a typed statement for encoding.
    pub fn wrap(statement: AttestationStatement) -> Self {
        Self { statement }
    }

    /// The `fmt` tag, taken from the statement's variant.
    pub fn format(&self) -> AttestationFormat {
        self.statement.format()
    }

    /// Get the wrapped statement.
    pub fn statement(&self) -> &AttestationStatement {
        &self.statement
    }

    /// Unwrap into the statement.
    pub fn into_statement(self) -> AttestationStatement {
        self.statement
    }

    /// Decode an envelope from a record in the CBOR data model.
    ///
    /// Binary fields must be byte strings. Keys other than `fmt` and
    /// `attStmt` are ignored, so the same record may carry sibling fields
    /// such as `authData`.
    pub fn decode(record: &Value) -> Result<Self> {
        Self::decode_as(record, ByteForm::Native)
    }

    /// Decode an envelope whose binary fields are in the given form.
    #[instrument(level = "debug", skip_all, fields(form = ?form))]
    pub fn decode_as(record: &Value, form: ByteForm) -> Result<Self> {
        let entries = record.as_map().ok_or(EnvelopeError::MissingDiscriminator)?;

        // The discriminator is resolved before the payload is looked at.
        let tag = find_field(entries, FMT_KEY)?.ok_or(EnvelopeError::MissingDiscriminator)?;
        let tag = tag
            .as_text()
            .ok_or_else(|| EnvelopeError::UnknownFormat(describe_non_text(tag)))?;
        let entry = registry::lookup(tag).ok_or_else(|| {
            debug!(fmt = tag, "Unregistered attestation format");
            EnvelopeError::UnknownFormat(tag.to_string())
        })?;
        debug!(fmt = %entry.format, "Resolved attestation format");

        let payload =
            find_field(entries, ATT_STMT_KEY)?.ok_or_else(|| EnvelopeError::MalformedPayload {
                format: entry.format,
                reason: format!("missing `{ATT_STMT_KEY}` field"),
            })?;

        let statement = entry
            .parse(payload, form)
            .map_err(|e| EnvelopeError::MalformedPayload {
                format: entry.format,
                reason: e.to_string(),
            })?;
        debug_assert_eq!(statement.format(), entry.format);
        statement.validate()?;

        debug!(fmt = %entry.format, "Decoded attestation statement");
        Ok(Self::wrap(statement))
    }

    /// Decode an envelope from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Self::decode_as(&read_json(bytes)?, ByteForm::Base64)
    }

    /// Decode an envelope from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        Self::decode(&read_cbor(bytes)?)
    }

    /// Encode into the CBOR data model.
    pub fn encode_value(&self) -> Result<Value> {
        to_value(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        trace!(fmt = %self.format(), "Encoding attestation envelope as CBOR");
        write_cbor(self)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        trace!(fmt = %self.format(), "Encoding attestation envelope as JSON");
        serde_json::to_vec(self).map_err(|e| EnvelopeError::SerializationError(e.to_string()))
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| EnvelopeError::SerializationError(e.to_string()))
    }
}

impl From<AttestationStatement> for AttestationEnvelope {
    fn from(statement: AttestationStatement) -> Self {
        Self::wrap(statement)
    }
}

/// Borrowed view used to encode a statement without taking ownership.
pub(crate) struct EnvelopeRef<'a>(pub(crate) &'a AttestationStatement);

impl EnvelopeRef<'_> {
    /// Write `fmt` and `attStmt` into a map that is already open.
    pub(crate) fn serialize_entries<M>(&self, map: &mut M) -> std::result::Result<(), M::Error>
    where
        M: SerializeMap,
    {
        map.serialize_entry(FMT_KEY, self.0.format().as_str())?;
        map.serialize_entry(ATT_STMT_KEY, self.0)
    }
}

impl Serialize for EnvelopeRef<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        self.serialize_entries(&mut map)?;
        map.end()
    }
}

impl Serialize for AttestationEnvelope {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        EnvelopeRef(&self.statement).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttestationEnvelope {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let form = ByteForm::of(&deserializer);
        let record = Value::deserialize(deserializer)?;
        Self::decode_as(&record, form).map_err(de::Error::custom)
    }
}

/// Decode the statement carried by a `{fmt, attStmt}` record.
pub fn decode(record: &Value) -> Result<AttestationStatement> {
    AttestationEnvelope::decode(record).map(AttestationEnvelope::into_statement)
}

/// Encode a statement as a `{fmt, attStmt}` record.
pub fn encode(statement: &AttestationStatement) -> Result<Value> {
    to_value(&EnvelopeRef(statement))
}

fn describe_non_text(value: &Value) -> String {
    match value {
        Value::Integer(i) => format!("integer {}", i128::from(*i)),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Null => "null".to_string(),
        Value::Bytes(_) => "byte string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Map(_) => "map".to_string(),
        _ => "non-text value".to_string(),
    }
}

/// Route through CBOR bytes so binary fields stay byte strings.
fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    let bytes = write_cbor(value)?;
    ciborium::from_reader(bytes.as_slice())
        .map_err(|e| EnvelopeError::SerializationError(e.to_string()))
}
