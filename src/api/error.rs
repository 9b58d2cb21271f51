// API errors
//
// Every error is sent to the client as {"detail": "..."}

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{
    auth::AuthError,
    reports::{ExportError, ReportError},
    sequence::SequenceError,
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Incorrect email or password")]
    InvalidLogin,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(String),
}

/// Cause of an internal error, attached to the response
/// so the request logger can report it
#[derive(Debug, Clone)]
pub struct InternalErrorCause(pub String);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidLogin => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(json!({ "detail": self.to_string() }))).into_response();

        match self {
            ApiError::Unauthorized => {
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            ApiError::Internal(cause) => {
                response.extensions_mut().insert(InternalErrorCause(cause));
            }
            _ => {}
        }

        response
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateIdentifier(number) => {
                ApiError::Conflict(format!("Report number already taken: {}", number))
            }
            StoreError::Conflict(what) => ApiError::Conflict(format!("Already in use: {}", what)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredential
            | AuthError::ExpiredCredential
            | AuthError::SessionSuperseded
            | AuthError::UnknownUser(_) => ApiError::Unauthorized,
            AuthError::InvalidLogin => ApiError::InvalidLogin,
            AuthError::Store(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SequenceError> for ApiError {
    fn from(e: SequenceError) -> Self {
        match e {
            SequenceError::UnknownCity(city) => ApiError::BadRequest(format!("Unknown city: {}", city)),
            SequenceError::Store(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::Forbidden => ApiError::Forbidden("You are not allowed to modify reports"),
            ReportError::NotFound(_) => ApiError::NotFound("Report not found"),
            ReportError::ProjectNotFound(_) => ApiError::NotFound("Project not found"),
            ReportError::IdentifierCollision(_) => {
                ApiError::Conflict("Could not allocate a report number, please retry".to_string())
            }
            ReportError::AttachmentNotFound(_) => ApiError::NotFound("Attachment not found"),
            ReportError::InvalidAttachmentPath(path) => {
                ApiError::BadRequest(format!("Invalid attachment path: {}", path))
            }
            ReportError::AttachmentFileMissing(_) => ApiError::NotFound("File not found on disk"),
            ReportError::Io(e) => ApiError::Internal(e.to_string()),
            ReportError::Sequence(e) => e.into(),
            ReportError::Store(e) => e.into(),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::NoReportsSelected | ExportError::TooManyReports { .. } => {
                ApiError::BadRequest(e.to_string())
            }
            ExportError::ReportsNotFound => ApiError::NotFound("Selected reports not found"),
            ExportError::Store(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_failures_look_the_same() {
        for e in [
            AuthError::InvalidCredential,
            AuthError::ExpiredCredential,
            AuthError::SessionSuperseded,
            AuthError::UnknownUser("u1".to_string()),
        ] {
            let api_error: ApiError = e.into();
            assert_eq!(api_error.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(api_error.to_string(), "Not authenticated");
        }
    }

    #[test]
    fn test_report_error_statuses() {
        let unknown_city: ApiError =
            ReportError::Sequence(SequenceError::UnknownCity("Gotham".to_string())).into();
        assert_eq!(unknown_city.status(), StatusCode::BAD_REQUEST);

        let malformed: ApiError =
            ReportError::Sequence(SequenceError::MalformedIdentifier("x".to_string())).into();
        assert_eq!(malformed.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let collision: ApiError = ReportError::IdentifierCollision(3).into();
        assert_eq!(collision.status(), StatusCode::CONFLICT);

        let forbidden: ApiError = ReportError::Forbidden.into();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let escaping: ApiError = ReportError::InvalidAttachmentPath("../etc".to_string()).into();
        assert_eq!(escaping.status(), StatusCode::BAD_REQUEST);

        let missing: ApiError = ReportError::AttachmentFileMissing("a.jpg".to_string()).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_cause_is_hidden() {
        let response = ApiError::Internal("redis down".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response
                .extensions()
                .get::<InternalErrorCause>()
                .map(|c| c.0.as_str()),
            Some("redis down")
        );
    }
}
