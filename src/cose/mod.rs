//! Credential public keys (COSE_Key) and signature checks against them.

pub mod algorithm;
pub(crate) mod bytes;
pub mod key;
pub mod verify;

pub use algorithm::{describe, AlgorithmDescriptor, EcCurve, HashAlgorithm, KeyType, SignatureScheme, DEFAULT_ALGORITHM};
pub use key::{decode_cose_key, decode_cose_key_bytes, CoseKey, KeyParams};
pub use verify::verify_signature;
