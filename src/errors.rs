use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// One error type for both sides of the crate: server handlers return it
/// through axum via [`IntoResponse`], the client modules return it to the
/// caller so a failed submit is a value, not a swallowed log line.
#[derive(Error, Debug)]
pub enum Error {
    #[error("improperly configured: {0}")]
    Config(#[from] config::ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication required")]
    Unauthorized,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("employer role required")]
    EmployerOnly,

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("salary must be numeric, got {0:?}")]
    InvalidSalary(String),

    #[error("requirement index {index} out of bounds (len {len})")]
    RequirementIndex { index: usize, len: usize },

    #[error("a submit is already in flight")]
    Busy,

    #[error("request timed out")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("api error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

impl Error {
    /// Stable machine-readable code carried in every error response body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "ERR-CONF-000",
            Error::Database(_) | Error::Migrate(_) => "ERR-DB-000",
            Error::Io(_) => "ERR-IO-000",
            Error::Validation(_) => "ERR-VALIDATION-400",
            Error::Http(_) => "ERR-HTTP-000",
            Error::Unauthorized => "ERR-AUTH-001",
            Error::InvalidCredentials => "ERR-AUTH-002",
            Error::EmployerOnly => "ERR-AUTH-003",
            Error::EmailTaken(_) => "ERR-USER-409",
            Error::JobNotFound(_) => "ERR-JOB-404",
            Error::InvalidSalary(_) => "ERR-FORM-400",
            Error::RequirementIndex { .. } => "ERR-FORM-401",
            Error::Busy => "ERR-FORM-409",
            Error::Timeout(_) => "ERR-HTTP-408",
            Error::Api { .. } => "ERR-API-000",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidSalary(_) | Error::RequirementIndex { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthorized | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::EmployerOnly => StatusCode::FORBIDDEN,
            Error::EmailTaken(_) | Error::Busy => StatusCode::CONFLICT,
            Error::JobNotFound(_) => StatusCode::NOT_FOUND,
            Error::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Error::Api { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = match &self {
            // field-level detail so a missing required field is actionable
            Error::Validation(errs) => json!({
                "code": self.code(),
                "error": self.to_string(),
                "details": errs,
            }),
            _ => json!({
                "code": self.code(),
                "error": self.to_string(),
            }),
        };
        tracing::debug!(code = self.code(), "request failed: {}", &self);
        (self.status(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::EmployerOnly.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            Error::JobNotFound("j1".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(Error::Busy.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_api_error_keeps_upstream_status() {
        let err = Error::Api {
            status: 404,
            code: "ERR-JOB-404".into(),
            message: "job not found".into(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
