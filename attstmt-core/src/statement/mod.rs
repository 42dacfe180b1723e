//! The closed set of attestation statement variants.
//!
//! [`AttestationStatement`] serializes as its bare `attStmt` payload. It has no
//! `Deserialize` impl of its own because the payload alone does not say which
//! layout it follows; decoding always goes through
//! [`AttestationEnvelope`](crate::AttestationEnvelope).

mod encoding;
mod formats;

use serde::{Serialize, Serializer};

use crate::error::{EnvelopeError, Result};
use crate::format::AttestationFormat;

pub(crate) use encoding::{ByteBuf, RawBytes};
pub use formats::{
    AndroidKeyAttestationStatement, AndroidSafetyNetAttestationStatement,
    AppleAttestationStatement, FidoU2fAttestationStatement, NoneAttestationStatement,
    PackedAttestationStatement, TpmAttestationStatement, TPM_VERSION,
};

/// An attestation statement of one recognized format.
///
/// The format is a property of the variant, so a statement can never carry a
/// tag that disagrees with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationStatement {
    Packed(PackedAttestationStatement),
    Tpm(TpmAttestationStatement),
    AndroidKey(AndroidKeyAttestationStatement),
    AndroidSafetyNet(AndroidSafetyNetAttestationStatement),
    FidoU2f(FidoU2fAttestationStatement),
    Apple(AppleAttestationStatement),
    None(NoneAttestationStatement),
}

impl AttestationStatement {
    /// The format this statement belongs to.
    pub fn format(&self) -> AttestationFormat {
        match self {
            Self::Packed(_) => AttestationFormat::Packed,
            Self::Tpm(_) => AttestationFormat::Tpm,
            Self::AndroidKey(_) => AttestationFormat::AndroidKey,
            Self::AndroidSafetyNet(_) => AttestationFormat::AndroidSafetyNet,
            Self::FidoU2f(_) => AttestationFormat::FidoU2f,
            Self::Apple(_) => AttestationFormat::Apple,
            Self::None(_) => AttestationFormat::None,
        }
    }

    /// Check the structural constraints of this format's payload.
    pub fn validate(&self) -> Result<()> {
        let checked = match self {
            Self::Packed(s) => s.validate(),
            Self::Tpm(s) => s.validate(),
            Self::AndroidKey(s) => s.validate(),
            Self::AndroidSafetyNet(s) => s.validate(),
            Self::FidoU2f(s) => s.validate(),
            Self::Apple(s) => s.validate(),
            Self::None(_) => Ok(()),
        };

        checked.map_err(|reason| EnvelopeError::MalformedPayload {
            format: self.format(),
            reason,
        })
    }

    /// COSE algorithm identifier, for formats that sign with the credential
    /// or attestation key directly.
    pub fn algorithm(&self) -> Option<i64> {
        match self {
            Self::Packed(s) => Some(s.alg),
            Self::Tpm(s) => Some(s.alg),
            Self::AndroidKey(s) => Some(s.alg),
            _ => None,
        }
    }

    pub fn signature(&self) -> Option<&[u8]> {
        match self {
            Self::Packed(s) => Some(&s.sig),
            Self::Tpm(s) => Some(&s.sig),
            Self::AndroidKey(s) => Some(&s.sig),
            Self::FidoU2f(s) => Some(&s.sig),
            _ => None,
        }
    }

    /// The `x5c` chain, leaf first.
    pub fn certificate_chain(&self) -> Option<&[Vec<u8>]> {
        match self {
            Self::Packed(s) => s.x5c.as_deref(),
            Self::Tpm(s) => Some(&s.x5c),
            Self::AndroidKey(s) => Some(&s.x5c),
            Self::FidoU2f(s) => Some(&s.x5c),
            Self::Apple(s) => Some(&s.x5c),
            Self::AndroidSafetyNet(_) | Self::None(_) => None,
        }
    }
}

impl Serialize for AttestationStatement {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Packed(s) => s.serialize(serializer),
            Self::Tpm(s) => s.serialize(serializer),
            Self::AndroidKey(s) => s.serialize(serializer),
            Self::AndroidSafetyNet(s) => s.serialize(serializer),
            Self::FidoU2f(s) => s.serialize(serializer),
            Self::Apple(s) => s.serialize(serializer),
            Self::None(s) => s.serialize(serializer),
        }
    }
}

macro_rules! impl_from_payload {
    ($($variant:ident => $payload:ty),* $(,)?) => {
        $(
            impl From<$payload> for AttestationStatement {
                fn from(payload: $payload) -> Self {
                    Self::$variant(payload)
                }
            }
        )*
    };
}

impl_from_payload! {
    Packed => PackedAttestationStatement,
    Tpm => TpmAttestationStatement,
    AndroidKey => AndroidKeyAttestationStatement,
    AndroidSafetyNet => AndroidSafetyNetAttestationStatement,
    FidoU2f => FidoU2fAttestationStatement,
    Apple => AppleAttestationStatement,
    None => NoneAttestationStatement,
}
