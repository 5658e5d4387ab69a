use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(mapped) = constraint_error(
                db_err.code().as_deref(),
                db_err.constraint(),
                db_err.message(),
            ) {
                return mapped;
            }
        }
        AppError::Database(err)
    }
}

/// Client-facing error for a violated constraint, if it is one we expect
fn constraint_error(
    code: Option<&str>,
    constraint: Option<&str>,
    message: &str,
) -> Option<AppError> {
    match code? {
        UNIQUE_VIOLATION => Some(AppError::Conflict(message.to_string())),
        FOREIGN_KEY_VIOLATION => {
            let constraint = constraint.unwrap_or_default();
            let missing = if constraint.contains("movie_id") {
                "Movie"
            } else if constraint.contains("provider_id") {
                "Provider"
            } else if ["user_id", "requester_id", "addressee_id"]
                .iter()
                .any(|column| constraint.contains(column))
            {
                "Profile"
            } else {
                "Referenced record"
            };
            Some(AppError::NotFound(format!("{} not found", missing)))
        }
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::ExternalApi("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_constraint_violations_map_to_client_errors() {
        assert!(matches!(
            constraint_error(Some("23505"), Some("profiles_username_key"), "duplicate"),
            Some(AppError::Conflict(_))
        ));

        let missing_profile =
            constraint_error(Some("23503"), Some("ratings_user_id_fkey"), "violates fk");
        assert!(matches!(
            &missing_profile,
            Some(AppError::NotFound(msg)) if msg == "Profile not found"
        ));
        assert_eq!(
            missing_profile.unwrap().into_response().status(),
            StatusCode::NOT_FOUND
        );

        assert!(matches!(
            constraint_error(Some("23503"), Some("follows_movie_id_fkey"), "violates fk"),
            Some(AppError::NotFound(msg)) if msg == "Movie not found"
        ));
        assert!(constraint_error(Some("40001"), None, "serialization failure").is_none());
        assert!(constraint_error(None, None, "no code").is_none());
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let error = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, AppError::Database(_)));
    }
}
