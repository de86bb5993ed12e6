use std::time::{SystemTime, UNIX_EPOCH};

use p256::ecdsa::{Signature, SigningKey};
use signature::Signer;

use super::{PhotoError, SigInfo};
use crate::assertion::authenticator_data::build_authenticator_data;
use crate::cose::{CoseKey, EcCurve, KeyParams};
use crate::encoding::decode_hex;

/// Current Unix time in seconds, used as the signature counter.
pub fn epoch_counter() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| counter_from_secs(d.as_secs()))
        .unwrap_or(0)
}

/// Saturates at `u32::MAX` once epoch seconds outgrow the 4-byte counter.
fn counter_from_secs(secs: u64) -> u32 {
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Signs content hashes with an exported ES256 credential key, producing the
/// same record an authenticator-backed camera would.
pub struct ContentSigner {
    signing_key: SigningKey,
    credential_id: Vec<u8>,
    rp_id: String,
}

impl ContentSigner {
    pub fn new(signing_key: SigningKey, credential_id: Vec<u8>, rp_id: impl Into<String>) -> Self {
        Self {
            signing_key,
            credential_id,
            rp_id: rp_id.into(),
        }
    }

    /// Build from a hex P-256 private scalar.
    pub fn from_private_key_hex(
        private_key_hex: &str,
        credential_id: Vec<u8>,
        rp_id: impl Into<String>,
    ) -> Result<Self, PhotoError> {
        let scalar = decode_hex(private_key_hex)
            .ok_or_else(|| PhotoError::PrivateKey("not hex".into()))?;
        let signing_key =
            SigningKey::from_slice(&scalar).map_err(|e| PhotoError::PrivateKey(e.to_string()))?;
        Ok(Self::new(signing_key, credential_id, rp_id))
    }

    /// The matching public key as it would be registered.
    pub fn public_cose_key(&self) -> CoseKey {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        let coordinate = |c: Option<&p256::FieldBytes>| c.map(|b| b.to_vec()).unwrap_or_default();
        CoseKey {
            algorithm: -7,
            params: KeyParams::Ec2 {
                curve: EcCurve::P256,
                x: coordinate(point.x()),
                y: coordinate(point.y()),
            },
        }
    }

    /// Sign `authenticatorData || contentHash` with a DER ECDSA signature.
    pub fn sign(
        &self,
        content_hash_hex: &str,
        user_present: bool,
        user_verified: bool,
        counter: u32,
    ) -> Result<SigInfo, PhotoError> {
        let content_hash = decode_hex(content_hash_hex)
            .filter(|h| !h.is_empty())
            .ok_or(PhotoError::InvalidContentHash)?;
        let auth_data = build_authenticator_data(&self.rp_id, user_present, user_verified, counter);

        let mut to_sign = auth_data.clone();
        to_sign.extend_from_slice(&content_hash);
        let signature: Signature = self.signing_key.sign(&to_sign);

        tracing::debug!(rp_id = %self.rp_id, counter, "Signed content hash");
        Ok(SigInfo {
            credential_id: hex::encode(&self.credential_id),
            authenticator_data: hex::encode(auth_data),
            signature: hex::encode(signature.to_der().as_bytes()),
        })
    }
}
