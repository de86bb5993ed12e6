#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Store: {0}")]
    Store(#[from] crate::store::StoreError),
    #[error("Token: {0}")]
    Token(#[from] crate::token::TokenError),
    #[error("Photo: {0}")]
    Photo(#[from] crate::photo::PhotoError),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
