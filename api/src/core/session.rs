//! Session identity for history tracking.
//!
//! Browsers are identified by the `session_id` cookie that `GET /` sets; the
//! page script never sends the header. API clients without cookies may send
//! `x-session-id` instead, which takes precedence when present. Requests
//! without either share the `anonymous` session.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use uuid::Uuid;

use crate::error_handler::AppError;

pub const SESSION_HEADER: &str = "x-session-id";
pub const SESSION_COOKIE: &str = "session_id";
const ANONYMOUS: &str = "anonymous";
const MAX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Set-Cookie` value binding the browser to this session.
    pub fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}; Path=/; SameSite=Lax; HttpOnly", self.0)
    }
}

pub fn is_valid(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Reads the `session_id` cookie value, if present.
pub fn cookie_session(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == SESSION_COOKIE)
        .map(|(_, v)| v.trim().to_string())
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|v| v.trim().to_string())
            .or_else(|| cookie_session(&parts.headers));

        match raw {
            None => Ok(SessionId(ANONYMOUS.to_string())),
            Some(id) if is_valid(&id) => Ok(SessionId(id)),
            Some(_) => Err(AppError::BadRequest(format!(
                "{SESSION_HEADER} must be 1-{MAX_LEN} chars of [A-Za-z0-9_-]"
            ))),
        }
    }
}
