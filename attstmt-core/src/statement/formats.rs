//! Per-format `attStmt` payload layouts.
//!
//! Field order follows CTAP2 canonical CBOR key order (shorter keys first,
//! then bytewise), which is what authenticators emit. Every layout rejects
//! keys it does not define.
//!
//! `validate` only checks structure. Signatures and certificate chains are
//! never verified here.

use serde::{Deserialize, Serialize};

use super::encoding::{bytes, bytes_seq, option_bytes_seq};

/// TPM attestation version accepted in the `ver` field.
pub const TPM_VERSION: &str = "2.0";

type Check = std::result::Result<(), String>;

fn check_signature(sig: &[u8]) -> Check {
    if sig.is_empty() {
        return Err("sig must not be empty".to_string());
    }
    Ok(())
}

fn check_chain(x5c: &[Vec<u8>]) -> Check {
    if x5c.is_empty() {
        return Err("x5c must contain at least one certificate".to_string());
    }
    if let Some(index) = x5c.iter().position(Vec::is_empty) {
        return Err(format!("x5c[{index}] is empty"));
    }
    Ok(())
}

/// `packed` attestation. Self attestation omits `x5c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackedAttestationStatement {
    /// COSE algorithm identifier of the signature
    pub alg: i64,
    #[serde(with = "bytes")]
    pub sig: Vec<u8>,
    /// Attestation certificate followed by its chain
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "option_bytes_seq"
    )]
    pub x5c: Option<Vec<Vec<u8>>>,
}

impl PackedAttestationStatement {
    pub fn validate(&self) -> Check {
        check_signature(&self.sig)?;
        match &self.x5c {
            Some(x5c) => check_chain(x5c),
            None => Ok(()),
        }
    }

    /// True when no attestation certificate is present.
    pub fn is_self_attestation(&self) -> bool {
        self.x5c.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TpmAttestationStatement {
    pub alg: i64,
    #[serde(with = "bytes")]
    pub sig: Vec<u8>,
    /// Always "2.0"
    pub ver: String,
    /// AIK certificate followed by its chain
    #[serde(with = "bytes_seq")]
    pub x5c: Vec<Vec<u8>>,
    /// TPMT_PUBLIC structure of the credential key
    #[serde(with = "bytes")]
    pub pub_area: Vec<u8>,
    /// TPMS_ATTEST structure that was signed
    #[serde(with = "bytes")]
    pub cert_info: Vec<u8>,
}

impl TpmAttestationStatement {
    pub fn validate(&self) -> Check {
        if self.ver != TPM_VERSION {
            return Err(format!("unsupported TPM version {:?}", self.ver));
        }
        check_signature(&self.sig)?;
        check_chain(&self.x5c)?;
        if self.pub_area.is_empty() {
            return Err("pubArea must not be empty".to_string());
        }
        if self.cert_info.is_empty() {
            return Err("certInfo must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AndroidKeyAttestationStatement {
    pub alg: i64,
    #[serde(with = "bytes")]
    pub sig: Vec<u8>,
    #[serde(with = "bytes_seq")]
    pub x5c: Vec<Vec<u8>>,
}

impl AndroidKeyAttestationStatement {
    pub fn validate(&self) -> Check {
        check_signature(&self.sig)?;
        check_chain(&self.x5c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AndroidSafetyNetAttestationStatement {
    /// Google Play Services version that produced the response
    pub ver: String,
    /// UTF-8 compact JWS returned by the SafetyNet API
    #[serde(with = "bytes")]
    pub response: Vec<u8>,
}

impl AndroidSafetyNetAttestationStatement {
    pub fn validate(&self) -> Check {
        if self.ver.is_empty() {
            return Err("ver must not be empty".to_string());
        }
        if self.response.is_empty() {
            return Err("response must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FidoU2fAttestationStatement {
    #[serde(with = "bytes")]
    pub sig: Vec<u8>,
    /// Exactly one attestation certificate
    #[serde(with = "bytes_seq")]
    pub x5c: Vec<Vec<u8>>,
}

impl FidoU2fAttestationStatement {
    pub fn validate(&self) -> Check {
        check_signature(&self.sig)?;
        check_chain(&self.x5c)?;
        if self.x5c.len() != 1 {
            return Err(format!(
                "x5c must contain exactly one certificate, found {}",
                self.x5c.len()
            ));
        }
        Ok(())
    }
}

/// Apple anonymous attestation. The nonce lives in the leaf certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppleAttestationStatement {
    #[serde(with = "bytes_seq")]
    pub x5c: Vec<Vec<u8>>,
}

impl AppleAttestationStatement {
    pub fn validate(&self) -> Check {
        check_chain(&self.x5c)
    }
}

/// `none` attestation: the payload is an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoneAttestationStatement {}
