pub mod credential;
pub mod disk;
pub mod index;

pub use credential::{RegisteredCredential, RECORD_VERSION};
pub use index::RegistrationStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialize: {0}")]
    Serialization(String),
    #[error("Corrupt: {0}")]
    Corrupt(String),
    #[error("Not found")]
    NotFound,
}

/// Source of registered credentials. The photo verifier only needs lookup.
pub trait CredentialRegistry {
    fn find_registration(&self, credential_id: &[u8], rp_id: &str) -> Option<RegisteredCredential>;
}
