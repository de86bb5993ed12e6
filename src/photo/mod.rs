//! Content signatures carried in a photo's MakerNote, and checking them
//! against registered credentials.

pub mod sig_info;
pub mod signer;
pub mod verifier;

pub use sig_info::SigInfo;
pub use signer::{epoch_counter, ContentSigner};
pub use verifier::{PhotoVerification, PhotoVerifier, VerifiedRegistration};

#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("invalid content hash")]
    InvalidContentHash,
    #[error("invalid signature info: {0}")]
    SigInfo(String),
    #[error("unknown credentialId: {0}")]
    UnknownCredential(String),
    #[error("registration disabled for credentialId: {0}")]
    Disabled(String),
    #[error("authenticator data is for a different relying party")]
    RelyingPartyMismatch,
    #[error("registered public key is unusable")]
    InvalidPublicKey,
    #[error("signature verification failed")]
    SignatureMismatch,
    #[error("invalid private key: {0}")]
    PrivateKey(String),
}
