use serde::{Deserialize, Serialize};

pub const RECORD_VERSION: u8 = 1;

/// A credential registered with the identity service, as this crate reads it.
///
/// Only `public_key` feeds signature checks; the rest is lookup and display
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCredential {
    pub version:       u8,
    pub credential_id: Vec<u8>,
    pub public_key:    String,          // base64 COSE_Key
    pub rp_id:         String,
    pub enabled:       bool,
    pub counter:       u32,
    pub nickname:      Option<String>,
    pub owner:         Option<String>,  // registry username of the owning account
    pub created_at:    u64,             // Unix timestamp
}

impl RegisteredCredential {
    pub fn credential_id_hex(&self) -> String {
        hex::encode(&self.credential_id)
    }
}
