use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Sign, Pss, RsaPublicKey};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use signature::hazmat::PrehashVerifier;

use super::algorithm::{self, EcCurve, HashAlgorithm, SignatureScheme, DEFAULT_ALGORITHM};
use super::key::{CoseKey, KeyParams};
use crate::encoding::decode_hex;

#[derive(Debug, thiserror::Error)]
enum Failure {
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("key type does not match algorithm")]
    KeyMismatch,
    #[error("signature base is not hex")]
    BadBase,
    #[error("signature is not hex")]
    BadSignatureEncoding,
    #[error("invalid public key: {0}")]
    InvalidKey(String),
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
    #[error("signature mismatch")]
    Mismatch,
}

/// Check `sig_hex` over the bytes of `sig_base_hex` with `key`.
///
/// `alg` defaults to ES256. Every failure (unsupported algorithm, unusable
/// key, malformed input or a plain mismatch) returns `false` and is logged
/// with the full inputs so it can be replayed offline.
pub fn verify_signature(sig_base_hex: &str, key: &CoseKey, sig_hex: &str, alg: Option<i64>) -> bool {
    let alg = alg.unwrap_or(DEFAULT_ALGORITHM);
    match check(sig_base_hex, key, sig_hex, alg) {
        Ok(()) => true,
        Err(Failure::UnsupportedAlgorithm) => {
            tracing::warn!(alg, "Unsupported algorithm in signature verification");
            false
        }
        Err(reason) => {
            tracing::warn!(
                %reason,
                sig_base = sig_base_hex,
                cose_key = ?key,
                sig = sig_hex,
                alg,
                "Signature verification failed"
            );
            false
        }
    }
}

fn check(sig_base_hex: &str, key: &CoseKey, sig_hex: &str, alg: i64) -> Result<(), Failure> {
    let descriptor = algorithm::describe(alg).ok_or(Failure::UnsupportedAlgorithm)?;
    if descriptor.key_type() != key.key_type() {
        return Err(Failure::KeyMismatch);
    }
    let msg = decode_hex(sig_base_hex).ok_or(Failure::BadBase)?;
    let sig = decode_hex(sig_hex).ok_or(Failure::BadSignatureEncoding)?;

    match &key.params {
        KeyParams::Ec2 { curve, x, y } => verify_ecdsa(*curve, x, y, descriptor.hash, &msg, &sig),
        KeyParams::Rsa { n, e } => verify_rsa(descriptor.scheme, descriptor.hash, n, e, &msg, &sig),
    }
}

/// Uncompressed SEC1 point, coordinates left-padded to the field size.
fn sec1_point(curve: EcCurve, x: &[u8], y: &[u8]) -> Result<Vec<u8>, Failure> {
    let len = curve.coordinate_len();
    if x.len() > len || y.len() > len {
        return Err(Failure::InvalidKey(format!(
            "{} coordinate longer than {len} bytes",
            curve.name()
        )));
    }
    let mut point = vec![0u8; 1 + 2 * len];
    point[0] = 0x04;
    point[1 + len - x.len()..1 + len].copy_from_slice(x);
    point[1 + 2 * len - y.len()..].copy_from_slice(y);
    Ok(point)
}

fn verify_ecdsa(
    curve: EcCurve,
    x: &[u8],
    y: &[u8],
    hash: HashAlgorithm,
    msg: &[u8],
    sig: &[u8],
) -> Result<(), Failure> {
    let point = sec1_point(curve, x, y)?;
    let prehash = hash.digest(msg);
    let invalid_key = |e: signature::Error| Failure::InvalidKey(format!("{}: {e}", curve.name()));

    // Authenticators emit ASN.1 DER; COSE_Sign1 style raw r || s is accepted too.
    match curve {
        EcCurve::P256 => {
            let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(invalid_key)?;
            let sig = p256::ecdsa::Signature::from_der(sig)
                .or_else(|_| p256::ecdsa::Signature::from_slice(sig))
                .map_err(|e| Failure::MalformedSignature(e.to_string()))?;
            vk.verify_prehash(&prehash, &sig).map_err(|_| Failure::Mismatch)
        }
        EcCurve::P384 => {
            let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(invalid_key)?;
            let sig = p384::ecdsa::Signature::from_der(sig)
                .or_else(|_| p384::ecdsa::Signature::from_slice(sig))
                .map_err(|e| Failure::MalformedSignature(e.to_string()))?;
            vk.verify_prehash(&prehash, &sig).map_err(|_| Failure::Mismatch)
        }
        EcCurve::P521 => {
            let vk = p521::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(invalid_key)?;
            let sig = p521::ecdsa::Signature::from_der(sig)
                .or_else(|_| p521::ecdsa::Signature::from_slice(sig))
                .map_err(|e| Failure::MalformedSignature(e.to_string()))?;
            vk.verify_prehash(&prehash, &sig).map_err(|_| Failure::Mismatch)
        }
    }
}

fn verify_rsa(
    scheme: SignatureScheme,
    hash: HashAlgorithm,
    n: &[u8],
    e: &[u8],
    msg: &[u8],
    sig: &[u8],
) -> Result<(), Failure> {
    let key = RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
        .map_err(|e| Failure::InvalidKey(format!("RSA: {e}")))?;

    // Some signers strip leading zero octets from the signature integer.
    let size = key.size();
    if sig.len() > size {
        return Err(Failure::MalformedSignature(format!(
            "{} byte signature for {size} byte modulus",
            sig.len()
        )));
    }
    let mut padded = vec![0u8; size - sig.len()];
    padded.extend_from_slice(sig);

    let hashed = hash.digest(msg);
    let result = match scheme {
        SignatureScheme::RsaPkcs1v15 => key.verify(pkcs1v15_padding(hash), &hashed, &padded),
        SignatureScheme::RsaPss => key.verify(pss_padding(hash), &hashed, &padded),
        SignatureScheme::Ecdsa => return Err(Failure::KeyMismatch),
    };
    result.map_err(|_| Failure::Mismatch)
}

fn pkcs1v15_padding(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

fn pss_padding(hash: HashAlgorithm) -> Pss {
    match hash {
        HashAlgorithm::Sha1 => Pss::new::<Sha1>(),
        HashAlgorithm::Sha256 => Pss::new::<Sha256>(),
        HashAlgorithm::Sha384 => Pss::new::<Sha384>(),
        HashAlgorithm::Sha512 => Pss::new::<Sha512>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signature::Signer;

    fn p256_key(sk: &p256::ecdsa::SigningKey, alg: i64) -> CoseKey {
        let point = sk.verifying_key().to_encoded_point(false);
        CoseKey {
            algorithm: alg,
            params: KeyParams::Ec2 {
                curve: EcCurve::P256,
                x: point.x().unwrap().to_vec(),
                y: point.y().unwrap().to_vec(),
            },
        }
    }

    fn fixed_signing_key() -> p256::ecdsa::SigningKey {
        p256::ecdsa::SigningKey::from_slice(&[0x42u8; 32]).unwrap()
    }

    #[test]
    fn test_es256_der_signature() {
        let sk = fixed_signing_key();
        let msg = b"authenticator data and content hash";
        let sig: p256::ecdsa::Signature = sk.sign(msg);
        let key = p256_key(&sk, -7);
        assert!(verify_signature(
            &hex::encode(msg),
            &key,
            &hex::encode(sig.to_der().as_bytes()),
            None
        ));
    }

    #[test]
    fn test_es256_raw_signature() {
        let sk = fixed_signing_key();
        let msg = b"raw r||s";
        let sig: p256::ecdsa::Signature = sk.sign(msg);
        let key = p256_key(&sk, -7);
        assert!(verify_signature(&hex::encode(msg), &key, &hex::encode(sig.to_bytes()), Some(-7)));
    }

    #[test]
    fn test_es256_wrong_message() {
        let sk = fixed_signing_key();
        let sig: p256::ecdsa::Signature = sk.sign(b"one");
        let key = p256_key(&sk, -7);
        assert!(!verify_signature(
            &hex::encode(b"two"),
            &key,
            &hex::encode(sig.to_der().as_bytes()),
            None
        ));
    }

    #[test]
    fn test_unsupported_algorithm() {
        let sk = fixed_signing_key();
        let sig: p256::ecdsa::Signature = sk.sign(b"m");
        let key = p256_key(&sk, -7);
        assert!(!verify_signature(&hex::encode(b"m"), &key, &hex::encode(sig.to_bytes()), Some(-8)));
    }

    #[test]
    fn test_rsa_alg_with_ec_key() {
        let sk = fixed_signing_key();
        let sig: p256::ecdsa::Signature = sk.sign(b"m");
        let key = p256_key(&sk, -7);
        assert!(!verify_signature(&hex::encode(b"m"), &key, &hex::encode(sig.to_bytes()), Some(-257)));
    }

    #[test]
    fn test_non_hex_inputs() {
        let sk = fixed_signing_key();
        let key = p256_key(&sk, -7);
        assert!(!verify_signature("zz", &key, "00", None));
        assert!(!verify_signature("00", &key, "not hex", None));
    }

    #[test]
    fn test_point_not_on_curve() {
        let key = CoseKey {
            algorithm: -7,
            params: KeyParams::Ec2 {
                curve: EcCurve::P256,
                x: vec![0x01; 32],
                y: vec![0x02; 32],
            },
        };
        assert!(!verify_signature("00", &key, &"11".repeat(64), None));
    }

    #[test]
    fn test_sec1_point_pads_short_coordinates() {
        let point = sec1_point(EcCurve::P256, &[0xAA], &[0xBB; 32]).unwrap();
        assert_eq!(point.len(), 65);
        assert_eq!(point[0], 0x04);
        assert_eq!(point[32], 0xAA);
        assert!(point[1..32].iter().all(|&b| b == 0));
        assert!(sec1_point(EcCurve::P256, &[0u8; 33], &[0u8; 32]).is_err());
    }
}
