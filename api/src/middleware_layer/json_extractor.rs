//! Rewrites axum's plain-text body rejections into the JSON error envelope.

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Largest rejection body we bother to read back.
const MAX_REJECTION_BYTES: usize = 64 * 1024;

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_REJECTION_BYTES)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

/// Picks the offending field out of a serde message such as
/// "missing field `topic` at line 1 column 2" or "unknown variant `expert`".
fn guess_path_from_serde_msg(msg: &str) -> Option<String> {
    if let Some(rest) = msg.split("field `").nth(1) {
        return rest.split('`').next().map(str::to_string);
    }
    for key in ["topic", "difficulty", "count", "answers", "questions", "code", "problem"] {
        if msg.contains(key) {
            return Some(key.to_string());
        }
    }
    None
}

fn hint_for(msg: &str) -> Option<String> {
    if msg.contains("unknown variant") {
        Some("Use one of the ids listed in the UI dropdowns (snake_case).".into())
    } else if msg.contains("expected a sequence") {
        Some("Expected an array for this field (e.g. [0, 2, null]).".into())
    } else if msg.contains("Content-Type") {
        Some("Send the body with `content-type: application/json`.".into())
    } else {
        None
    }
}

fn is_json(parts: &axum::http::response::Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Wraps 400/415/422 rejections that are not already JSON. Handler errors
/// already carry the envelope and pass through untouched.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if !matches!(
        status,
        StatusCode::BAD_REQUEST
            | StatusCode::UNSUPPORTED_MEDIA_TYPE
            | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    if is_json(&parts) {
        return Response::from_parts(parts, Body::from(bytes));
    }

    let original = String::from_utf8_lossy(&bytes);
    debug!(%status, body = %original.trim(), "mapping request rejection");

    let details = ApiErrorDetail::from_parts(guess_path_from_serde_msg(&original), hint_for(&original))
        .into_iter()
        .collect();
    let envelope = ApiResponse::failure("BAD_REQUEST", original.trim(), details);
    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    // every malformed request is reported as 400
    parts.status = StatusCode::BAD_REQUEST;
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_field_names() {
        assert_eq!(
            guess_path_from_serde_msg("Failed to deserialize: missing field `topic` at line 1"),
            Some("topic".into())
        );
        assert_eq!(
            guess_path_from_serde_msg("difficulty: unknown variant `expert`"),
            Some("difficulty".into())
        );
        assert_eq!(guess_path_from_serde_msg("EOF while parsing"), None);
    }
}
