//! Wire-level properties of the attestation envelope.
//!
//! Every registered format is exercised through both JSON and CBOR: tag
//! derivation, round trips, rejection of unknown or mismatched formats.

use attstmt_core::{
    decode, encode, supported_formats, AndroidKeyAttestationStatement,
    AndroidSafetyNetAttestationStatement, AppleAttestationStatement, AttestationEnvelope,
    AttestationFormat, AttestationStatement, EnvelopeError, FidoU2fAttestationStatement,
    NoneAttestationStatement, PackedAttestationStatement, TpmAttestationStatement, Value,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

/// DER-looking placeholder certificate; its contents are never parsed.
fn cert(tag: u8) -> Vec<u8> {
    vec![0x30, 0x82, 0x02, tag, 0xA0, 0x03, 0x02, 0x01, 0x02]
}

/// One valid statement per registered format.
fn sample_statements() -> Vec<AttestationStatement> {
    vec![
        PackedAttestationStatement {
            alg: -7,
            sig: vec![0x30, 0x45, 0x02, 0x21, 0x00, 0xC1],
            x5c: Some(vec![cert(1), cert(2)]),
        }
        .into(),
        TpmAttestationStatement {
            alg: -257,
            sig: vec![0x5A; 256],
            ver: "2.0".to_string(),
            x5c: vec![cert(3), cert(4)],
            pub_area: vec![0x00, 0x01, 0x00, 0x0B],
            cert_info: vec![0xFF, 0x54, 0x43, 0x47],
        }
        .into(),
        AndroidKeyAttestationStatement {
            alg: -7,
            sig: vec![0x30, 0x44],
            x5c: vec![cert(5), cert(6), cert(7)],
        }
        .into(),
        AndroidSafetyNetAttestationStatement {
            ver: "204714037".to_string(),
            response: b"eyJhbGciOiJSUzI1NiJ9.e30.c2ln".to_vec(),
        }
        .into(),
        FidoU2fAttestationStatement {
            sig: vec![0x30, 0x46, 0x02, 0x21],
            x5c: vec![cert(8)],
        }
        .into(),
        AppleAttestationStatement {
            x5c: vec![cert(9), cert(10)],
        }
        .into(),
        NoneAttestationStatement {}.into(),
    ]
}

fn json_record(value: serde_json::Value) -> Value {
    serde_json::from_value(value).expect("json record")
}

/// The `attStmt` of a statement, in the CBOR data model.
fn payload_of(stmt: &AttestationStatement) -> Value {
    let record = encode(stmt).expect("encode");
    let entries = record.into_map().expect("map");
    entries
        .into_iter()
        .find(|(k, _)| k.as_text() == Some("attStmt"))
        .map(|(_, v)| v)
        .expect("attStmt")
}

fn envelope_record(tag: &str, payload: Value) -> Value {
    Value::Map(vec![
        (Value::Text("fmt".into()), Value::Text(tag.into())),
        (Value::Text("attStmt".into()), payload),
    ])
}

/// Rewrite every byte string in a record.
fn map_bytes(value: &Value, f: &dyn Fn(&[u8]) -> Value) -> Value {
    match value {
        Value::Bytes(bytes) => f(bytes),
        Value::Array(items) => Value::Array(items.iter().map(|v| map_bytes(v, f)).collect()),
        Value::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), map_bytes(v, f)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn octets(bytes: &[u8]) -> Value {
    Value::Array(bytes.iter().map(|&b| Value::Integer(b.into())).collect())
}

fn base64_text(bytes: &[u8]) -> Value {
    Value::Text(STANDARD.encode(bytes))
}

#[test]
fn test_samples_cover_every_registered_format() {
    let covered: Vec<_> = sample_statements().iter().map(|s| s.format()).collect();
    for format in supported_formats() {
        assert!(covered.contains(&format), "no sample for {format}");
    }
}

#[test]
fn test_round_trip_through_cbor() {
    for stmt in sample_statements() {
        let bytes = AttestationEnvelope::wrap(stmt.clone())
            .to_cbor()
            .expect("encode");
        let decoded = AttestationEnvelope::from_cbor(&bytes).expect("decode");
        assert_eq!(decoded.statement(), &stmt, "{} did not round-trip", stmt.format());
    }
}

#[test]
fn test_round_trip_through_json() {
    for stmt in sample_statements() {
        let bytes = AttestationEnvelope::wrap(stmt.clone())
            .to_json()
            .expect("encode");
        let decoded = AttestationEnvelope::from_json(&bytes).expect("decode");
        assert_eq!(decoded.statement(), &stmt, "{} did not round-trip", stmt.format());
    }
}

#[test]
fn test_round_trip_through_value() {
    for stmt in sample_statements() {
        let record = encode(&stmt).expect("encode");
        assert_eq!(decode(&record).expect("decode"), stmt);
    }
}

#[test]
fn test_tag_is_derived_from_variant() {
    for stmt in sample_statements() {
        let json = AttestationEnvelope::wrap(stmt.clone())
            .to_json_value()
            .expect("encode");
        assert_eq!(json["fmt"], stmt.format().as_str());
        assert_eq!(json.as_object().expect("object").len(), 2);
    }
}

#[test]
fn test_encoded_record_reencodes_identically() {
    for stmt in sample_statements() {
        let first = AttestationEnvelope::wrap(stmt).to_cbor().expect("encode");
        let second = AttestationEnvelope::from_cbor(&first)
            .expect("decode")
            .to_cbor()
            .expect("re-encode");
        assert_eq!(first, second);
    }
}

#[test]
fn test_encode_is_deterministic() {
    for stmt in sample_statements() {
        let envelope = AttestationEnvelope::wrap(stmt);
        assert_eq!(envelope.to_cbor().expect("a"), envelope.to_cbor().expect("b"));
        assert_eq!(envelope.to_json().expect("a"), envelope.to_json().expect("b"));
    }
}

#[test]
fn test_unknown_format() {
    let err = decode(&json_record(json!({
        "fmt": "bogus-format-xyz",
        "attStmt": {}
    })))
    .unwrap_err();
    assert_eq!(err, EnvelopeError::UnknownFormat("bogus-format-xyz".to_string()));
}

#[test]
fn test_missing_discriminator() {
    let err = decode(&json_record(json!({"attStmt": {}}))).unwrap_err();
    assert_eq!(err, EnvelopeError::MissingDiscriminator);
}

#[test]
fn test_packed_rejects_fido_u2f_payload() {
    let u2f: AttestationStatement = FidoU2fAttestationStatement {
        sig: vec![1, 2, 3],
        x5c: vec![cert(1)],
    }
    .into();
    let err = decode(&envelope_record("packed", payload_of(&u2f))).unwrap_err();
    assert!(
        matches!(
            err,
            EnvelopeError::MalformedPayload {
                format: AttestationFormat::Packed,
                ..
            }
        ),
        "got {err:?}"
    );
}

#[test]
fn test_every_format_rejects_foreign_payloads() {
    let samples = sample_statements();
    for target in supported_formats() {
        for source in samples.iter().filter(|s| s.format() != target) {
            let result = decode(&envelope_record(target.as_str(), payload_of(source)));

            // android-key and packed share a field set; a packed payload with
            // a certificate chain is also a well-formed android-key payload.
            let shared_layout = matches!(
                (source.format(), target),
                (AttestationFormat::Packed, AttestationFormat::AndroidKey)
                    | (AttestationFormat::AndroidKey, AttestationFormat::Packed)
            );
            if shared_layout {
                assert_eq!(result.expect("shared layout").format(), target);
                continue;
            }

            match result {
                Err(EnvelopeError::MalformedPayload { format, .. }) => assert_eq!(format, target),
                other => panic!(
                    "{} payload under fmt {} gave {other:?}",
                    source.format(),
                    target
                ),
            }
        }
    }
}

#[test]
fn test_registry_is_closed() {
    // A payload that would parse as `none` still needs a registered tag.
    for tag in ["None", "NONE", "self", "ecdaa", "packed ", "fido-uf2"] {
        let err = decode(&json_record(json!({"fmt": tag, "attStmt": {}}))).unwrap_err();
        assert_eq!(err, EnvelopeError::UnknownFormat(tag.to_string()));
    }
}

#[test]
fn test_discriminator_checked_before_payload() {
    // The payload is not even a map; the unknown tag is still what gets reported.
    let err = decode(&json_record(json!({"fmt": "bogus", "attStmt": 42}))).unwrap_err();
    assert_eq!(err, EnvelopeError::UnknownFormat("bogus".to_string()));
}

#[test]
fn test_wrong_field_type_is_malformed() {
    let err = decode(&json_record(json!({
        "fmt": "packed",
        "attStmt": {"alg": "ES256", "sig": "AQ=="}
    })))
    .unwrap_err();
    assert!(matches!(err, EnvelopeError::MalformedPayload { .. }));
}

#[test]
fn test_invalid_binary_encoding_is_malformed() {
    let err = AttestationEnvelope::from_json(
        br#"{"fmt":"fido-u2f","attStmt":{"sig":"not base64!","x5c":["AQ=="]}}"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        EnvelopeError::MalformedPayload {
            format: AttestationFormat::FidoU2f,
            ..
        }
    ));
}

#[test]
fn test_json_and_cbor_agree() {
    for stmt in sample_statements() {
        let envelope = AttestationEnvelope::wrap(stmt);
        let from_json =
            AttestationEnvelope::from_json(&envelope.to_json().expect("json")).expect("decode");
        let from_cbor =
            AttestationEnvelope::from_cbor(&envelope.to_cbor().expect("cbor")).expect("decode");
        assert_eq!(from_json, from_cbor);
    }
}

#[test]
fn test_reencoding_accepted_input_reproduces_it() {
    for stmt in sample_statements() {
        let canonical = encode(&stmt).expect("encode");
        let records = [
            canonical.clone(),
            map_bytes(&canonical, &octets),
            map_bytes(&canonical, &base64_text),
        ];
        for record in records {
            if let Ok(decoded) = decode(&record) {
                assert_eq!(encode(&decoded).expect("re-encode"), record);
            }
        }

        let documents = [
            AttestationEnvelope::wrap(stmt.clone()).to_json().expect("json"),
            serde_json::to_vec(&map_bytes(&canonical, &octets)).expect("json"),
        ];
        for bytes in documents {
            if let Ok(decoded) = AttestationEnvelope::from_json(&bytes) {
                let input: serde_json::Value = serde_json::from_slice(&bytes).expect("parse");
                assert_eq!(decoded.to_json_value().expect("re-encode"), input);
            }
        }
    }
}

#[test]
fn test_foreign_byte_representations_rejected() {
    for stmt in sample_statements() {
        if stmt.format() == AttestationFormat::None {
            continue;
        }
        let canonical = encode(&stmt).expect("encode");

        assert!(decode(&map_bytes(&canonical, &octets)).is_err());
        assert!(decode(&map_bytes(&canonical, &base64_text)).is_err());

        let octet_json = serde_json::to_vec(&map_bytes(&canonical, &octets)).expect("json");
        assert!(AttestationEnvelope::from_json(&octet_json).is_err());
    }
}
