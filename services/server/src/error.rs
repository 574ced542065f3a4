use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Server domain error variants.
///
/// Recoverable domain errors (`Validation`, `UserNotFound`, `RecoveryNotFound`,
/// `RecoveryExpired`, `CodeMismatch`) render as field-scoped form errors on the
/// client; `Service` covers fatal external-dependency failures (mail delivery,
/// image transcode) and renders as a generic error page.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("no account matches that username or email")]
    UserNotFound,
    #[error("no active recovery for that user")]
    RecoveryNotFound,
    #[error("recovery code expired")]
    RecoveryExpired,
    #[error("recovery code does not match")]
    CodeMismatch,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    Conflict,
    #[error("external service failure")]
    Service(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::RecoveryNotFound => "RECOVERY_NOT_FOUND",
            Self::RecoveryExpired => "RECOVERY_EXPIRED",
            Self::CodeMismatch => "CODE_MISMATCH",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Service(_) => "SERVICE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Which form field a recoverable error attaches to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::UserNotFound => Some("username_or_email"),
            Self::CodeMismatch => Some("code"),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } | Self::UserNotFound | Self::CodeMismatch => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::RecoveryNotFound | Self::NotFound => StatusCode::NOT_FOUND,
            Self::RecoveryExpired => StatusCode::GONE,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Service(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 5xx only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            Self::Service(e) => {
                tracing::error!(error = %e, kind = "SERVICE", "external service failure");
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(field) = self.field() {
            body["field"] = serde_json::Value::String(field.to_owned());
        }
        (status, axum::Json(body)).into_response()
    }
}
