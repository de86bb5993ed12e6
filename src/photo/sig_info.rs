use serde::{Deserialize, Serialize};

use super::PhotoError;
use crate::encoding::decode_hex;

/// Signature record embedded in an image, all fields hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigInfo {
    pub credential_id: String,
    pub authenticator_data: String,
    pub signature: String,
}

impl SigInfo {
    pub fn from_json(json: &str) -> Result<Self, PhotoError> {
        let info: SigInfo =
            serde_json::from_str(json).map_err(|e| PhotoError::SigInfo(e.to_string()))?;
        for (field, value) in [
            ("credentialId", &info.credential_id),
            ("authenticatorData", &info.authenticator_data),
            ("signature", &info.signature),
        ] {
            if value.is_empty() {
                return Err(PhotoError::SigInfo(format!("missing {field}")));
            }
            if decode_hex(value).is_none() {
                return Err(PhotoError::SigInfo(format!("{field} is not hex")));
            }
        }
        Ok(info)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("SigInfo serialization is infallible")
    }

    pub fn credential_id_bytes(&self) -> Vec<u8> {
        decode_hex(&self.credential_id).unwrap_or_default()
    }
}
