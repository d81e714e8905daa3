use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt;
use std::sync::Arc;

use super::{ApiError, AppState};

/// Username/password pair from an `Authorization: Basic` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"**********")
            .finish()
    }
}

impl BasicCredentials {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        Self::parse(value)
    }

    /// Parses `Basic <base64(username:password)>`. The scheme is matched
    /// case-insensitively; the password may itself contain colons.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Rejects the request with 401 and a `WWW-Authenticate: Basic` challenge
/// unless it carries credentials of an existing user.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(credentials) = BasicCredentials::from_headers(&headers) else {
        tracing::debug!("Missing or malformed Basic credentials");
        return Err(ApiError::unauthorized());
    };

    let valid = state
        .users
        .verify(&credentials.username, &credentials.password)
        .await?;

    if !valid {
        tracing::debug!(username = %credentials.username, "Authentication failed");
        return Err(ApiError::unauthorized());
    }

    tracing::Span::current().record("user_id", credentials.username.as_str());
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_parse_valid_header() {
        let creds = BasicCredentials::parse(&encode("jan:secret123")).unwrap();
        assert_eq!(creds.username, "jan");
        assert_eq!(creds.password, "secret123");
    }

    #[test]
    fn test_password_may_contain_colons() {
        let creds = BasicCredentials::parse(&encode("jan:a:b:c")).unwrap();
        assert_eq!(creds.username, "jan");
        assert_eq!(creds.password, "a:b:c");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let header = format!("basic {}", STANDARD.encode("jan:x"));
        assert!(BasicCredentials::parse(&header).is_some());
    }

    #[test]
    fn test_rejects_malformed_headers() {
        assert!(BasicCredentials::parse("Bearer abc").is_none());
        assert!(BasicCredentials::parse("Basic not-base64!").is_none());
        assert!(BasicCredentials::parse(&encode("no-colon")).is_none());
        assert!(BasicCredentials::parse("Basic").is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = BasicCredentials::parse(&encode("jan:secret123")).unwrap();
        assert!(!format!("{creds:?}").contains("secret123"));
    }
}
