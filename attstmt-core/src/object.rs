//! WebAuthn attestation object: the envelope plus authenticator data.
//!
//! Browsers hand the relying party `response.attestationObject`, a CBOR map
//! `{ "fmt", "attStmt", "authData" }`, usually base64 encoded for transport.
//! The envelope keys are decoded by [`AttestationEnvelope::decode`] over the
//! same map; `authData` is carried as opaque bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ciborium::Value;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::envelope::{AttestationEnvelope, EnvelopeRef};
use crate::error::{EnvelopeError, Result};
use crate::format::AttestationFormat;
use crate::record::{decode_base64, find_field, read_cbor, read_json, write_cbor, ByteForm};
use crate::statement::{AttestationStatement, ByteBuf, RawBytes};

/// Key of the authenticator data byte string.
pub const AUTH_DATA_KEY: &str = "authData";

/// rpIdHash (32) + flags (1) + signCount (4).
pub const MIN_AUTH_DATA_LEN: usize = 37;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationObject {
    pub envelope: AttestationEnvelope,
    /// Raw authenticator data, not interpreted here
    pub auth_data: Vec<u8>,
}

impl AttestationObject {
    pub fn new(statement: AttestationStatement, auth_data: Vec<u8>) -> Self {
        Self {
            envelope: AttestationEnvelope::wrap(statement),
            auth_data,
        }
    }

    /// The `fmt` tag of the embedded statement.
    pub fn format(&self) -> AttestationFormat {
        self.envelope.format()
    }

    /// Get the embedded statement.
    pub fn statement(&self) -> &AttestationStatement {
        self.envelope.statement()
    }

    /// Decode from a record in the CBOR data model.
    pub fn decode(record: &Value) -> Result<Self> {
        Self::decode_as(record, ByteForm::Native)
    }

    /// Decode from a record whose binary fields are in the given form.
    pub fn decode_as(record: &Value, form: ByteForm) -> Result<Self> {
        let envelope = AttestationEnvelope::decode_as(record, form)?;

        let entries = record
            .as_map()
            .ok_or_else(|| EnvelopeError::MalformedRecord("record is not a map".to_string()))?;
        let auth_data = find_field(entries, AUTH_DATA_KEY)?.ok_or_else(|| {
            EnvelopeError::MalformedRecord(format!("missing `{AUTH_DATA_KEY}` field"))
        })?;
        let auth_data = form
            .parse::<ByteBuf>(auth_data)
            .map_err(|e| EnvelopeError::MalformedRecord(format!("`{AUTH_DATA_KEY}`: {e}")))?
            .0;
        if auth_data.len() < MIN_AUTH_DATA_LEN {
            return Err(EnvelopeError::MalformedRecord(format!(
                "`{AUTH_DATA_KEY}` is {} bytes, expected at least {MIN_AUTH_DATA_LEN}",
                auth_data.len()
            )));
        }

        debug!(
            fmt = %envelope.format(),
            auth_data_len = auth_data.len(),
            "Decoded attestation object"
        );
        Ok(Self {
            envelope,
            auth_data,
        })
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        Self::decode(&read_cbor(bytes)?)
    }

    /// Decode from JSON bytes, with binary fields as base64 text.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Self::decode_as(&read_json(bytes)?, ByteForm::Base64)
    }

    /// Decode from base64 text of the CBOR encoding, standard or URL-safe
    /// alphabet.
    pub fn from_base64(text: &str) -> Result<Self> {
        Self::from_cbor(&decode_base64(text)?)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        write_cbor(self)
    }

    /// Standard base64 of the CBOR encoding.
    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_cbor()?))
    }
}

impl Serialize for AttestationObject {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        EnvelopeRef(self.envelope.statement()).serialize_entries(&mut map)?;
        map.serialize_entry(AUTH_DATA_KEY, &RawBytes(&self.auth_data))?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttestationObject {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let form = ByteForm::of(&deserializer);
        let record = Value::deserialize(deserializer)?;
        Self::decode_as(&record, form).map_err(de::Error::custom)
    }
}
