use base64::Engine;

use super::{cipher, TokenAuth, TokenError, TokenSecret};
use crate::encoding::B64URL;

/// Encrypt `account_id` into an opaque, unpadded base64url bearer token.
///
/// Tokens never expire at this layer. An empty id is refused because it
/// could never be resolved again.
pub fn issue_access_token(account_id: &str, secret: &TokenSecret) -> Result<String, TokenError> {
    if account_id.is_empty() {
        return Err(TokenError::EmptyAccount);
    }
    let encrypted = cipher::encrypt(account_id.as_bytes(), secret.expose());
    Ok(B64URL.encode(encrypted))
}

/// Recover the account id from a token, or `None` if it is not one of ours.
pub fn resolve_access_token(token: &str, secret: &TokenSecret) -> Option<String> {
    let bytes = match B64URL.decode(token.trim()) {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(error = %e, "Access token is not base64url");
            return None;
        }
    };
    let plaintext = cipher::decrypt(&bytes, secret.expose())?;
    match String::from_utf8(plaintext) {
        Ok(account_id) => Some(account_id),
        Err(_) => {
            tracing::debug!("Access token payload is not UTF-8");
            None
        }
    }
}

/// Issues and validates account tokens under one server secret.
#[derive(Debug, Clone)]
pub struct AccessTokens {
    secret: TokenSecret,
}

impl AccessTokens {
    pub fn new(secret: TokenSecret) -> Self {
        Self { secret }
    }

    pub fn issue(&self, account_id: &str) -> Result<String, TokenError> {
        let token = issue_access_token(account_id, &self.secret)?;
        tracing::info!(account_id, "Issued access token");
        Ok(token)
    }

    pub fn resolve(&self, token: &str) -> Option<String> {
        resolve_access_token(token, &self.secret)
    }

    /// Like [`resolve`](Self::resolve), but as an explicit outcome.
    pub fn authenticate(&self, token: &str) -> TokenAuth {
        match self.resolve(token) {
            Some(account_id) => TokenAuth::Authenticated(account_id),
            None => TokenAuth::Anonymous,
        }
    }
}
