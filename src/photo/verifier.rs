use serde::Serialize;

use super::{PhotoError, SigInfo};
use crate::assertion::authenticator_data::parse_authenticator_data;
use crate::cose::{decode_cose_key, verify_signature};
use crate::encoding::decode_hex;
use crate::store::CredentialRegistry;

/// What a successful check reveals about the signing credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedRegistration {
    pub credential_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Counter from the signed authenticator data (signing time for photo signers).
    pub counter: u32,
}

/// Response shape: `{"status":"ok","reg":{..}}` or `{"status":"failed"}`.
/// Failure detail is logged, never returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PhotoVerification {
    Ok { reg: VerifiedRegistration },
    Failed,
}

impl PhotoVerification {
    pub fn is_ok(&self) -> bool {
        matches!(self, PhotoVerification::Ok { .. })
    }
}

pub struct PhotoVerifier<'a, R: CredentialRegistry> {
    registry: &'a R,
    rp_id: String,
}

impl<'a, R: CredentialRegistry> PhotoVerifier<'a, R> {
    pub fn new(registry: &'a R, rp_id: impl Into<String>) -> Self {
        Self {
            registry,
            rp_id: rp_id.into(),
        }
    }

    /// Check the MakerNote JSON of a photo against its recomputed content hash.
    pub fn verify(&self, content_hash_hex: &str, sig_info_json: &str) -> PhotoVerification {
        let result = SigInfo::from_json(sig_info_json)
            .and_then(|info| self.check(content_hash_hex, &info));
        match result {
            Ok(reg) => {
                tracing::info!(credential_id = %reg.credential_id, "Photo signature verified");
                PhotoVerification::Ok { reg }
            }
            Err(e) => {
                tracing::warn!(error = %e, content_hash = content_hash_hex, "Photo verification failed");
                PhotoVerification::Failed
            }
        }
    }

    pub fn check(&self, content_hash_hex: &str, info: &SigInfo) -> Result<VerifiedRegistration, PhotoError> {
        let content_hash_hex = content_hash_hex.trim();
        if decode_hex(content_hash_hex).map_or(true, |h| h.is_empty()) {
            return Err(PhotoError::InvalidContentHash);
        }

        let credential_id = info.credential_id_bytes();
        let reg = self
            .registry
            .find_registration(&credential_id, &self.rp_id)
            .ok_or_else(|| PhotoError::UnknownCredential(info.credential_id.clone()))?;
        if !reg.enabled {
            return Err(PhotoError::Disabled(info.credential_id.clone()));
        }

        let auth_data = decode_hex(&info.authenticator_data)
            .and_then(|b| parse_authenticator_data(&b))
            .ok_or_else(|| PhotoError::SigInfo("authenticatorData too short".into()))?;
        if !auth_data.is_for_rp(&self.rp_id) {
            return Err(PhotoError::RelyingPartyMismatch);
        }

        let key = decode_cose_key(&reg.public_key).ok_or(PhotoError::InvalidPublicKey)?;
        let sig_base_hex = format!("{}{}", info.authenticator_data, content_hash_hex);
        if !verify_signature(&sig_base_hex, &key, &info.signature, Some(key.algorithm)) {
            return Err(PhotoError::SignatureMismatch);
        }

        Ok(VerifiedRegistration {
            credential_id: reg.credential_id_hex(),
            nickname: reg.nickname,
            username: reg.owner,
            counter: auth_data.counter,
        })
    }
}
