//! Passphrase-keyed AES-256-CBC with an embedded digest check.
//!
//! Layout: `salt (16) || iv (16) || AES-256-CBC(prefix || plaintext)` where
//! `prefix` is the unpadded base64url of the left half of SHA-256(plaintext),
//! always 22 characters. The prefix is the only integrity check; a wrong
//! passphrase and a corrupted blob are indistinguishable.
//!
//! The 100-round PBKDF2 is only acceptable because the passphrase is a
//! high-entropy server secret.
//!
//! The PBKDF2 PRF is HMAC-SHA256. Tokens minted by a deployment that derived
//! keys with PBKDF2-HMAC-SHA1 will not resolve.

use aes::Aes256;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::encoding::B64URL;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub const SALT_LEN: usize = 16;
pub const IV_LEN: usize = 16;
pub const KEY_LEN: usize = 32;
pub const PBKDF2_ITERATIONS: u32 = 100;
/// Bytes of SHA-256 kept in the prefix.
pub const DIGEST_BYTES: usize = 16;
/// base64url length of `DIGEST_BYTES`.
pub const DIGEST_PREFIX_LEN: usize = 22;

fn derive_key(passphrase: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

pub(crate) fn digest_prefix(plaintext: &[u8]) -> String {
    let digest = Sha256::digest(plaintext);
    B64URL.encode(&digest[..DIGEST_BYTES])
}

/// Encrypt with a fresh random salt and IV on every call.
pub fn encrypt(plaintext: &[u8], passphrase: &str) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut iv);

    let key = derive_key(passphrase, &salt);

    let mut message = digest_prefix(plaintext).into_bytes();
    message.extend_from_slice(plaintext);

    let ciphertext =
        Aes256CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(&message);

    let mut out = Vec::with_capacity(SALT_LEN + IV_LEN + ciphertext.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    out
}

/// Reverse of [`encrypt`]. `None` for a wrong passphrase, truncated or
/// corrupted input, or a payload that fails the digest check.
pub fn decrypt(data: &[u8], passphrase: &str) -> Option<Vec<u8>> {
    if data.len() < SALT_LEN + IV_LEN {
        tracing::debug!(len = data.len(), "Encrypted blob too short");
        return None;
    }
    let (salt, rest) = data.split_at(SALT_LEN);
    let (iv, ciphertext) = rest.split_at(IV_LEN);

    let key = derive_key(passphrase, salt);
    let decrypted = Aes256CbcDec::new_from_slices(&key, iv)
        .ok()?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .ok();
    let Some(decrypted) = decrypted else {
        tracing::debug!("Decryption failed");
        return None;
    };

    if decrypted.len() <= DIGEST_PREFIX_LEN {
        tracing::debug!(len = decrypted.len(), "Decrypted payload too short");
        return None;
    }
    let (prefix, plaintext) = decrypted.split_at(DIGEST_PREFIX_LEN);
    if digest_prefix(plaintext).as_bytes() != prefix {
        tracing::debug!("Decrypted digest did not match, not encrypted with this passphrase");
        return None;
    }
    Some(plaintext.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_prefix_is_22_chars() {
        for msg in [&b""[..], b"a", b"some account id", &[0xffu8; 300][..]] {
            let prefix = digest_prefix(msg);
            assert_eq!(prefix.len(), DIGEST_PREFIX_LEN);
            assert!(!prefix.contains('='));
        }
    }

    #[test]
    fn test_layout() {
        let out = encrypt(b"hello", "pass");
        // 22 + 5 = 27 bytes of message pad to 32
        assert_eq!(out.len(), SALT_LEN + IV_LEN + 32);
    }

    #[test]
    fn test_round_trip() {
        let out = encrypt(b"user-1234", "server secret");
        assert_eq!(decrypt(&out, "server secret").unwrap(), b"user-1234");
    }

    #[test]
    fn test_fresh_salt_and_iv() {
        let a = encrypt(b"same", "pass");
        let b = encrypt(b"same", "pass");
        assert_ne!(a[..SALT_LEN], b[..SALT_LEN]);
        assert_ne!(a[SALT_LEN..SALT_LEN + IV_LEN], b[SALT_LEN..SALT_LEN + IV_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_passphrase() {
        let out = encrypt(b"user-1234", "right");
        assert!(decrypt(&out, "wrong").is_none());
    }

    #[test]
    fn test_truncated() {
        let out = encrypt(b"user-1234", "pass");
        assert!(decrypt(&out[..SALT_LEN + IV_LEN], "pass").is_none());
        assert!(decrypt(&out[..out.len() - 1], "pass").is_none());
        assert!(decrypt(&out[..10], "pass").is_none());
        assert!(decrypt(&[], "pass").is_none());
    }

    #[test]
    fn test_empty_plaintext_never_decrypts() {
        let out = encrypt(b"", "pass");
        assert!(decrypt(&out, "pass").is_none());
    }

    #[test]
    fn test_sha1_derived_key_does_not_decrypt() {
        let salt = [0x5au8; SALT_LEN];
        let iv = [0xa5u8; IV_LEN];
        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<sha1::Sha1>(b"pass", &salt, PBKDF2_ITERATIONS, &mut key);
        assert_ne!(key, derive_key("pass", &salt));

        let mut message = digest_prefix(b"account-42").into_bytes();
        message.extend_from_slice(b"account-42");
        let mut blob = salt.to_vec();
        blob.extend_from_slice(&iv);
        blob.extend(Aes256CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(&message));
        assert!(decrypt(&blob, "pass").is_none());
    }

    #[test]
    fn test_flipped_bits_rejected() {
        let out = encrypt(b"account-42", "pass");
        for i in 0..out.len() {
            for bit in 0..8 {
                let mut tampered = out.clone();
                tampered[i] ^= 1 << bit;
                assert!(
                    decrypt(&tampered, "pass").is_none(),
                    "flip of bit {bit} in byte {i} was accepted"
                );
            }
        }
    }
}
