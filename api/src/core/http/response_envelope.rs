//! JSON envelope shared by every `/api` endpoint.
//!
//! Success: `{"success": true, "data": ..}`.
//! Failure: `{"success": false, "error": {"code", "message", "details"}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable code the UI switches on, e.g. `LLM_AUTH_FAILED`.
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiErrorDetail>,
}

/// Points at the offending request field and/or tells the user what to fix.
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiErrorDetail {
    pub fn hint(hint: impl Into<String>) -> Self {
        Self {
            path: None,
            hint: Some(hint.into()),
        }
    }

    /// `None` when there is nothing to report.
    pub fn from_parts(path: Option<String>, hint: Option<String>) -> Option<Self> {
        (path.is_some() || hint.is_some()).then_some(Self { path, hint })
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// `200 OK` with `data`.
    pub fn ok(data: T) -> Response {
        let body = Self {
            success: true,
            data: Some(data),
            error: None,
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

impl ApiResponse<()> {
    pub fn failure(
        code: &'static str,
        message: impl Into<String>,
        details: Vec<ApiErrorDetail>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code,
                message: message.into(),
                details,
            }),
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_omits_data_and_empty_details() {
        let v = serde_json::to_value(ApiResponse::failure("QUIZ_PARSE_FAILED", "no JSON array", vec![]))
            .unwrap();
        assert_eq!(
            v,
            json!({"success": false, "error": {"code": "QUIZ_PARSE_FAILED", "message": "no JSON array"}})
        );
    }

    #[test]
    fn detail_is_dropped_when_empty() {
        assert!(ApiErrorDetail::from_parts(None, None).is_none());
        let d = ApiErrorDetail::from_parts(Some("count".into()), None).unwrap();
        assert_eq!(serde_json::to_value(d).unwrap(), json!({"path": "count"}));
    }
}
