//! The `x-session-id` request header.

use crate::errors::Error;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Header carrying the client's session key.
pub const SESSION_HEADER: &str = "x-session-id";

/// Opaque client session key taken from the `x-session-id` header.
#[derive(Debug, Clone)]
pub struct SessionKey(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionKey
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| Self(key.to_string()))
            .ok_or_else(|| Error::validation(format!("missing {SESSION_HEADER} header")))
    }
}
