use super::{AccessTokens, TokenAuth};

/// Extract the credentials from an `Authorization: Bearer <token>` header.
///
/// The header must be exactly two space-separated parts; the scheme is
/// matched case-insensitively.
pub fn bearer_token(authorization: &str) -> Option<&str> {
    let parts: Vec<&str> = authorization.split(' ').collect();
    let [scheme, credentials] = parts.as_slice() else {
        tracing::debug!("Invalid Authorization header");
        return None;
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        tracing::debug!(scheme, "Authorization scheme was not Bearer");
        return None;
    }
    if credentials.is_empty() {
        return None;
    }
    Some(*credentials)
}

impl AccessTokens {
    /// Authenticate a request from its `Authorization` header.
    ///
    /// `current_token` returns the token currently stored for an account; a
    /// token that decrypts but is no longer the stored one is refused, which
    /// is how re-issuing a token revokes the old one. Every failure is
    /// `Anonymous`, never an error.
    pub fn authenticate_header<F>(&self, authorization: Option<&str>, current_token: F) -> TokenAuth
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let Some(token) = authorization.and_then(bearer_token) else {
            return TokenAuth::Anonymous;
        };
        let Some(account_id) = self.resolve(token) else {
            return TokenAuth::Anonymous;
        };
        match current_token(&account_id) {
            Some(stored) if stored == token => TokenAuth::Authenticated(account_id),
            Some(_) => {
                tracing::info!(account_id, "Access token is not the current token for this account");
                TokenAuth::Anonymous
            }
            None => {
                tracing::info!(account_id, "No current access token for account");
                TokenAuth::Anonymous
            }
        }
    }
}
