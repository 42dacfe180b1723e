//! Buffered records and the readers that produce them.
//!
//! Both wire encodings are parsed into a [`Value`] before the envelope looks
//! at it. JSON has no byte strings, so binary fields arrive as base64 text;
//! [`ByteForm`] tells the payload parsers which of the two representations a
//! record uses. Each encoding accepts exactly one representation, which keeps
//! re-encoding a decoded record equal to the input.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ciborium::value::Error as ValueError;
use ciborium::Value;
use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{self, DeserializeOwned, Deserializer, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use serde::Serialize;
use tracing::instrument;

use crate::error::{EnvelopeError, Result, MAX_RECORD_SIZE};

/// Representation of binary fields inside a buffered record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteForm {
    /// CBOR byte strings (`Value::Bytes`)
    Native,
    /// Standard base64 text, as carried by JSON
    Base64,
}

impl ByteForm {
    /// The form a serde deserializer carries binary fields in.
    pub fn of<'de, D: Deserializer<'de>>(deserializer: &D) -> Self {
        if deserializer.is_human_readable() {
            Self::Base64
        } else {
            Self::Native
        }
    }

    /// Deserialize a buffered value, reading binary fields in this form.
    pub fn parse<T: DeserializeOwned>(self, value: &Value) -> std::result::Result<T, ValueError> {
        if contains_tag(value) {
            return Err(de::Error::custom("tagged values are not allowed"));
        }
        match self {
            Self::Native => value.deserialized(),
            Self::Base64 => T::deserialize(Readable(value)),
        }
    }
}

fn contains_tag(value: &Value) -> bool {
    match value {
        Value::Tag(..) => true,
        Value::Array(items) => items.iter().any(contains_tag),
        Value::Map(entries) => entries
            .iter()
            .any(|(k, v)| contains_tag(k) || contains_tag(v)),
        _ => false,
    }
}

/// Human-readable view over a buffered value.
///
/// `Value`'s own deserializer reports itself as binary; this one reports
/// human-readable so byte fields expect base64 text.
#[derive(Clone, Copy)]
struct Readable<'a>(&'a Value);

impl<'de> Deserializer<'de> for Readable<'_> {
    type Error = ValueError;

    fn deserialize_any<V>(self, visitor: V) -> std::result::Result<V::Value, ValueError>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Value::Integer(i) => {
                let n = i128::from(*i);
                if let Ok(n) = u64::try_from(n) {
                    visitor.visit_u64(n)
                } else if let Ok(n) = i64::try_from(n) {
                    visitor.visit_i64(n)
                } else {
                    visitor.visit_i128(n)
                }
            }
            Value::Bytes(bytes) => visitor.visit_bytes(bytes),
            Value::Float(f) => visitor.visit_f64(*f),
            Value::Text(text) => visitor.visit_str(text),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Null => visitor.visit_unit(),
            Value::Tag(_, inner) => Readable(inner).deserialize_any(visitor),
            Value::Array(items) => {
                let items = items.iter().map(Readable);
                visitor.visit_seq(SeqDeserializer::<_, ValueError>::new(items))
            }
            Value::Map(entries) => {
                let entries = entries.iter().map(|(k, v)| (Readable(k), Readable(v)));
                visitor.visit_map(MapDeserializer::<_, ValueError>::new(entries))
            }
            _ => Err(de::Error::custom("unsupported value")),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> std::result::Result<V::Value, ValueError>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, ValueError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn is_human_readable(&self) -> bool {
        true
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct enum
        identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, ValueError> for Readable<'_> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

/// Look up a text key, rejecting records that repeat it.
pub(crate) fn find_field<'a>(
    entries: &'a [(Value, Value)],
    key: &'static str,
) -> Result<Option<&'a Value>> {
    let mut found = None;
    for (k, v) in entries {
        if k.as_text() == Some(key) {
            if found.is_some() {
                return Err(EnvelopeError::DuplicateField(key));
            }
            found = Some(v);
        }
    }
    Ok(found)
}

pub(crate) fn check_size(len: usize) -> Result<()> {
    if len > MAX_RECORD_SIZE {
        return Err(EnvelopeError::RecordTooLarge {
            size: len,
            max: MAX_RECORD_SIZE,
        });
    }
    Ok(())
}

/// Parse one CBOR record. Trailing bytes are an error.
///
/// Binary fields of the result are in [`ByteForm::Native`].
#[instrument(level = "debug", skip_all, fields(len = bytes.len()))]
pub fn read_cbor(bytes: &[u8]) -> Result<Value> {
    check_size(bytes.len())?;

    let mut reader = bytes;
    let value: Value = ciborium::from_reader(&mut reader)
        .map_err(|e| EnvelopeError::SerializationError(e.to_string()))?;
    if !reader.is_empty() {
        return Err(EnvelopeError::SerializationError(format!(
            "{} trailing bytes after CBOR record",
            reader.len()
        )));
    }
    Ok(value)
}

/// Parse one JSON record.
///
/// Binary fields of the result are in [`ByteForm::Base64`].
#[instrument(level = "debug", skip_all, fields(len = bytes.len()))]
pub fn read_json(bytes: &[u8]) -> Result<Value> {
    check_size(bytes.len())?;
    serde_json::from_slice(bytes).map_err(|e| EnvelopeError::SerializationError(e.to_string()))
}

/// Decode base64 transport text, standard or URL-safe alphabet.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    STANDARD
        .decode(text)
        .or_else(|_| URL_SAFE_NO_PAD.decode(text.trim_end_matches('=')))
        .map_err(|e| EnvelopeError::SerializationError(format!("invalid base64: {e}")))
}

pub(crate) fn write_cbor<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| EnvelopeError::SerializationError(e.to_string()))?;
    Ok(bytes)
}
