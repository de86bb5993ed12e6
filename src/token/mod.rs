//! Long-lived, API-key-like access tokens bound to one account.

pub mod access;
pub mod bearer;
pub mod cipher;

pub use access::{issue_access_token, resolve_access_token, AccessTokens};
pub use bearer::bearer_token;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("account id must not be empty")]
    EmptyAccount,
}

/// Result of checking a presented token. An invalid token is `Anonymous`,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAuth {
    Authenticated(String),
    Anonymous,
}

impl TokenAuth {
    pub fn account_id(&self) -> Option<&str> {
        match self {
            TokenAuth::Authenticated(id) => Some(id),
            TokenAuth::Anonymous => None,
        }
    }
}

/// Server-held token passphrase. Redacted from `Debug` output.
#[derive(Clone)]
pub struct TokenSecret(String);

impl TokenSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenSecret(..)")
    }
}
