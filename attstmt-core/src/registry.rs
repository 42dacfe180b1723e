//! Static `fmt` → payload parser table.
//!
//! The table is the only place a tag string is turned into a format. Adding
//! a format means adding an [`AttestationFormat`] variant, its payload layout
//! and one row here.

use ciborium::Value;

use crate::format::AttestationFormat;
use crate::record::ByteForm;
use crate::statement::AttestationStatement;

/// Parses an `attStmt` value into the variant of one format.
pub type PayloadParser =
    fn(&Value, ByteForm) -> Result<AttestationStatement, ciborium::value::Error>;

/// One registered attestation format.
pub struct FormatEntry {
    pub format: AttestationFormat,
    parse: PayloadParser,
}

impl std::fmt::Debug for FormatEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatEntry")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl FormatEntry {
    /// Parse a payload with this entry's schema. The result is always a
    /// variant of `self.format`.
    pub fn parse(
        &self,
        payload: &Value,
        form: ByteForm,
    ) -> Result<AttestationStatement, ciborium::value::Error> {
        (self.parse)(payload, form)
    }
}

static REGISTRY: [FormatEntry; 7] = [
    FormatEntry {
        format: AttestationFormat::Packed,
        parse: |v, form| form.parse(v).map(AttestationStatement::Packed),
    },
    FormatEntry {
        format: AttestationFormat::Tpm,
        parse: |v, form| form.parse(v).map(AttestationStatement::Tpm),
    },
    FormatEntry {
        format: AttestationFormat::AndroidKey,
        parse: |v, form| form.parse(v).map(AttestationStatement::AndroidKey),
    },
    FormatEntry {
        format: AttestationFormat::AndroidSafetyNet,
        parse: |v, form| form.parse(v).map(AttestationStatement::AndroidSafetyNet),
    },
    FormatEntry {
        format: AttestationFormat::FidoU2f,
        parse: |v, form| form.parse(v).map(AttestationStatement::FidoU2f),
    },
    FormatEntry {
        format: AttestationFormat::Apple,
        parse: |v, form| form.parse(v).map(AttestationStatement::Apple),
    },
    FormatEntry {
        format: AttestationFormat::None,
        parse: |v, form| form.parse(v).map(AttestationStatement::None),
    },
];

/// Resolve a `fmt` string. Matching is exact and case-sensitive.
pub fn lookup(tag: &str) -> Option<&'static FormatEntry> {
    REGISTRY.iter().find(|entry| entry.format.as_str() == tag)
}

/// Every format the registry can decode, in table order.
pub fn supported_formats() -> impl Iterator<Item = AttestationFormat> {
    REGISTRY.iter().map(|entry| entry.format)
}
