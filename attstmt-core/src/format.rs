//! Attestation statement format identifiers.

use serde::{Serialize, Serializer};

/// WebAuthn attestation statement format.
///
/// The set is closed: every variant has exactly one registry entry and one
/// payload layout. Parsing a tag string goes through [`crate::registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttestationFormat {
    /// Standard packed format
    Packed,
    /// TPM attestation (Windows Hello)
    Tpm,
    /// Android Key attestation (hardware-backed)
    AndroidKey,
    /// Android SafetyNet (legacy)
    AndroidSafetyNet,
    /// FIDO U2F
    FidoU2f,
    /// Apple anonymous attestation
    Apple,
    /// No attestation conveyed
    None,
}

impl AttestationFormat {
    /// The `fmt` string used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Packed => "packed",
            Self::Tpm => "tpm",
            Self::AndroidKey => "android-key",
            Self::AndroidSafetyNet => "android-safetynet",
            Self::FidoU2f => "fido-u2f",
            Self::Apple => "apple",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for AttestationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AttestationFormat {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(AttestationFormat::Packed.as_str(), "packed");
        assert_eq!(AttestationFormat::AndroidSafetyNet.as_str(), "android-safetynet");
        assert_eq!(AttestationFormat::FidoU2f.to_string(), "fido-u2f");
    }

    #[test]
    fn test_serializes_as_wire_name() {
        let json = serde_json::to_string(&AttestationFormat::AndroidKey).expect("serialize");
        assert_eq!(json, "\"android-key\"");
    }
}
