use sha2::{Digest, Sha256};

pub const FLAG_USER_PRESENT: u8 = 0x01;
pub const FLAG_USER_VERIFIED: u8 = 0x04;

/// rpIdHash (32) + flags (1) + signCount (4).
pub const AUTH_DATA_LEN: usize = 37;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; 32],
    pub flags: u8,
    pub counter: u32,
}

impl AuthenticatorData {
    pub fn user_present(&self) -> bool {
        self.flags & FLAG_USER_PRESENT != 0
    }

    pub fn user_verified(&self) -> bool {
        self.flags & FLAG_USER_VERIFIED != 0
    }

    /// True when `rp_id_hash` is SHA-256 of `rp_id`.
    pub fn is_for_rp(&self, rp_id: &str) -> bool {
        let expected: [u8; 32] = Sha256::digest(rp_id.as_bytes()).into();
        self.rp_id_hash == expected
    }
}

pub fn flags(user_present: bool, user_verified: bool) -> u8 {
    let mut flags = 0u8;
    if user_present {
        flags |= FLAG_USER_PRESENT;
    }
    if user_verified {
        flags |= FLAG_USER_VERIFIED;
    }
    flags
}

/// Build authenticatorData without attested credential data or extensions.
///
/// The counter is whatever monotonic value the signer chose; the photo
/// signer uses epoch seconds.
pub fn build_authenticator_data(
    rp_id: &str,
    user_present: bool,
    user_verified: bool,
    counter: u32,
) -> Vec<u8> {
    let mut data = Vec::with_capacity(AUTH_DATA_LEN);
    data.extend_from_slice(&Sha256::digest(rp_id.as_bytes()));
    data.push(flags(user_present, user_verified));
    data.extend_from_slice(&counter.to_be_bytes());
    data
}

/// Hex of the exact bytes a content signature covers:
/// `authenticatorData || contentHash`.
///
/// `content_hash_hex` stands where a WebAuthn client data hash would go and is
/// appended verbatim.
pub fn build_signature_base(
    rp_id: &str,
    user_present: bool,
    user_verified: bool,
    counter: u32,
    content_hash_hex: &str,
) -> String {
    let auth_data = build_authenticator_data(rp_id, user_present, user_verified, counter);
    let mut base = hex::encode(auth_data);
    base.push_str(content_hash_hex);
    base
}

/// Parse the fixed 37-byte prefix. Trailing attested data or extensions are ignored.
pub fn parse_authenticator_data(bytes: &[u8]) -> Option<AuthenticatorData> {
    if bytes.len() < AUTH_DATA_LEN {
        return None;
    }
    let rp_id_hash: [u8; 32] = bytes[0..32].try_into().ok()?;
    let counter = u32::from_be_bytes(bytes[33..37].try_into().ok()?);
    Some(AuthenticatorData {
        rp_id_hash,
        flags: bytes[32],
        counter,
    })
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
