use ciborium::value::Value;

use super::algorithm::{self, EcCurve, KeyType};
use super::bytes::byte_string;
use crate::encoding::decode_any_base64;

// COSE_Key labels (RFC 8152 §7 and §13).
const LABEL_KTY: i64 = 1;
const LABEL_ALG: i64 = 3;
const LABEL_CRV_OR_N: i64 = -1;
const LABEL_X_OR_E: i64 = -2;
const LABEL_Y: i64 = -3;

/// A decoded credential public key.
///
/// Only ever built fully populated; anything the decoder cannot use in full
/// comes back as `None` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoseKey {
    pub algorithm: i64,
    pub params: KeyParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParams {
    Ec2 { curve: EcCurve, x: Vec<u8>, y: Vec<u8> },
    Rsa { n: Vec<u8>, e: Vec<u8> },
}

impl CoseKey {
    pub fn key_type(&self) -> KeyType {
        match self.params {
            KeyParams::Ec2 { .. } => KeyType::Ec2,
            KeyParams::Rsa { .. } => KeyType::Rsa,
        }
    }

    /// Encode as a COSE_Key CBOR map.
    pub fn to_cbor(&self) -> Vec<u8> {
        let int = |i: i64| Value::Integer(i.into());
        let mut entries = Vec::with_capacity(5);
        match &self.params {
            KeyParams::Ec2 { curve, x, y } => {
                entries.push((int(LABEL_KTY), int(2)));
                entries.push((int(LABEL_ALG), int(self.algorithm)));
                entries.push((int(LABEL_CRV_OR_N), int(curve.cose_id())));
                entries.push((int(LABEL_X_OR_E), Value::Bytes(x.clone())));
                entries.push((int(LABEL_Y), Value::Bytes(y.clone())));
            }
            KeyParams::Rsa { n, e } => {
                entries.push((int(LABEL_KTY), int(3)));
                entries.push((int(LABEL_ALG), int(self.algorithm)));
                entries.push((int(LABEL_CRV_OR_N), Value::Bytes(n.clone())));
                entries.push((int(LABEL_X_OR_E), Value::Bytes(e.clone())));
            }
        }
        let mut buf = Vec::new();
        ciborium::into_writer(&Value::Map(entries), &mut buf)
            .expect("COSE key encoding is infallible");
        buf
    }
}

/// Decode a base64 COSE_Key, as stored by the credential registry.
pub fn decode_cose_key(b64: &str) -> Option<CoseKey> {
    let Some(bytes) = decode_any_base64(b64) else {
        tracing::warn!(public_key = b64, "COSE key is not valid base64");
        return None;
    };
    decode_cose_key_bytes(&bytes)
}

/// Decode raw COSE_Key CBOR. Only the first CBOR item is read.
pub fn decode_cose_key_bytes(bytes: &[u8]) -> Option<CoseKey> {
    let value: Value = match ciborium::from_reader(bytes) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, cbor = hex::encode(bytes), "COSE key is not valid CBOR");
            return None;
        }
    };
    decode_cose_value(&value)
}

pub(crate) fn decode_cose_value(value: &Value) -> Option<CoseKey> {
    let Value::Map(map) = value else {
        tracing::warn!(?value, "COSE key is not a CBOR map");
        return None;
    };

    let kty = map_int(map, LABEL_KTY);
    let alg = map_int(map, LABEL_ALG);
    let (Some(kty), Some(alg)) = (kty, alg) else {
        tracing::warn!(?kty, ?alg, "COSE key missing kty or alg");
        return None;
    };

    match KeyType::from_cose(kty) {
        Some(KeyType::Ec2) => decode_ec2(map, alg),
        Some(KeyType::Rsa) => decode_rsa(map, alg),
        Some(KeyType::Okp) => {
            // Ed25519/Ed448 are recognized but there is no verifier for them.
            tracing::warn!(alg, crv = ?map_int(map, LABEL_CRV_OR_N), "No support for OKP (EdDSA) keys");
            None
        }
        None => {
            tracing::warn!(kty, "Unsupported COSE key type");
            None
        }
    }
}

fn decode_ec2(map: &[(Value, Value)], alg: i64) -> Option<CoseKey> {
    if !algorithm_matches(alg, KeyType::Ec2) {
        tracing::warn!(alg, "Invalid alg for EC key type");
        return None;
    }
    let crv = map_int(map, LABEL_CRV_OR_N);
    let Some(curve) = crv.and_then(EcCurve::from_cose) else {
        tracing::warn!(?crv, "Invalid crv for EC key type");
        return None;
    };
    let x = map_bytes(map, LABEL_X_OR_E);
    let y = map_bytes(map, LABEL_Y);
    match (x, y) {
        (Some(x), Some(y)) => Some(CoseKey {
            algorithm: alg,
            params: KeyParams::Ec2 { curve, x, y },
        }),
        _ => {
            tracing::warn!(crv = curve.name(), "Invalid x or y coordinates for EC key type");
            None
        }
    }
}

fn decode_rsa(map: &[(Value, Value)], alg: i64) -> Option<CoseKey> {
    if !algorithm_matches(alg, KeyType::Rsa) {
        tracing::warn!(alg, "Invalid alg for RSA key type");
        return None;
    }
    let n = map_bytes(map, LABEL_CRV_OR_N);
    let e = map_bytes(map, LABEL_X_OR_E);
    match (n, e) {
        (Some(n), Some(e)) => Some(CoseKey {
            algorithm: alg,
            params: KeyParams::Rsa { n, e },
        }),
        _ => {
            tracing::warn!("Invalid n or e values for RSA key type");
            None
        }
    }
}

fn algorithm_matches(alg: i64, key_type: KeyType) -> bool {
    algorithm::describe(alg).is_some_and(|d| d.key_type() == key_type)
}

fn map_get(map: &[(Value, Value)], label: i64) -> Option<&Value> {
    map.iter().find_map(|(k, v)| {
        let matches = match k {
            Value::Integer(i) => i128::from(*i) == i128::from(label),
            Value::Text(t) => t.parse::<i64>().ok() == Some(label),
            _ => false,
        };
        matches.then_some(v)
    })
}

fn map_int(map: &[(Value, Value)], label: i64) -> Option<i64> {
    match map_get(map, label)? {
        Value::Integer(i) => i64::try_from(i128::from(*i)).ok(),
        _ => None,
    }
}

/// Non-empty byte string at `label`, in any of the shapes `byte_string` accepts.
fn map_bytes(map: &[(Value, Value)], label: i64) -> Option<Vec<u8>> {
    byte_string(map_get(map, label)?).filter(|b| !b.is_empty())
}
