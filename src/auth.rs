//! Admin authentication for configuration edits.
//!
//! Edits of the receiving key require `Authorization: Bearer <token>` matching the
//! configured admin token. Without a configured token, edits are refused.

use axum::http::HeaderValue;
use subtle::ConstantTimeEq;

/// Longest `Authorization` header that is inspected.
pub const MAX_AUTH_HEADER_BYTES: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Configuration edits are disabled: no admin token configured")]
    Disabled,
    #[error("Missing authorization")]
    Missing,
    #[error("Invalid authorization header")]
    Malformed,
    #[error("Invalid bearer token")]
    InvalidToken,
}

/// The secret expected from the admin panel.
#[derive(Clone, Default)]
pub struct AdminToken(Option<String>);

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = if self.is_enabled() { "<redacted>" } else { "<none>" };
        f.debug_tuple("AdminToken").field(&shown).finish()
    }
}

impl AdminToken {
    /// A blank token counts as no token.
    pub fn new(token: Option<&str>) -> Self {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        Self(token.map(str::to_string))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Checks the value of an `Authorization` header.
    pub fn authorize(&self, header: Option<&HeaderValue>) -> Result<(), AuthError> {
        let expected = self.0.as_deref().ok_or(AuthError::Disabled)?;
        let header = header.ok_or(AuthError::Missing)?;
        let header = header.to_str().map_err(|_| AuthError::Malformed)?;
        let token = parse_bearer_token(header)?;
        if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

fn parse_bearer_token(header: &str) -> Result<&str, AuthError> {
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Malformed);
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Malformed);
    }
    Ok(token)
}
