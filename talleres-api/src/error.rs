/// Error handling for the API server
///
/// A unified error type that maps every failure to one HTTP response.
/// All handlers return `Result<T, ApiError>`; no failure escapes
/// unhandled, no retries happen anywhere, and the body is always the
/// `{ok: false, error, msg}` envelope. Password hashes and internal
/// detail never reach a response.
///
/// # Taxonomy
///
/// - `ValidationError` / `BadRequest` → 400
/// - `Unauthorized` → 401 (missing, invalid, or expired assertion)
/// - `Forbidden` → 403 (valid identity, insufficient role)
/// - `NotFound` → 404 (id does not resolve, or is not owned by caller)
/// - `Conflict` → 400 (uniqueness violation; this API reports
///   conflicts as 400, with the `conflict` error code carrying the
///   distinction)
/// - `InternalError` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use talleres_shared::auth::{jwt::JwtError, password::PasswordError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Uniqueness conflict — duplicate email, title, or enrollment
    /// (reported as 400)
    Conflict(String),

    /// Validation errors (400, with field details)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false for errors
    pub ok: bool,

    /// Error code (e.g. "unauthorized", "conflict")
    pub error: String,

    /// Human-readable error message
    pub msg: String,

    /// Optional validation details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Collects validator output into field-level details
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, msg, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            // Conflicts report 400; the error code keeps the distinction
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but never expose detail to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            ok: false,
            error: error_code.to_string(),
            msg,
            details,
        });

        (status, body).into_response()
    }
}

/// Maps a violated constraint name to the error the handlers promise
///
/// This is the authoritative rejection path: a handler's friendly
/// pre-check can lose a race, and the losing insert still surfaces the
/// matching conflict through here.
fn constraint_error(constraint: &str) -> ApiError {
    if constraint.contains("users_email") {
        return ApiError::Conflict("Email already registered".to_string());
    }
    if constraint.contains("workshops_titulo") {
        return ApiError::Conflict("Workshop title already exists".to_string());
    }
    if constraint.contains("enrollments_user_workshop") {
        return ApiError::Conflict("Already enrolled in this workshop".to_string());
    }
    if constraint.contains("enrollments_workshop_id") {
        return ApiError::NotFound("Workshop not found".to_string());
    }

    ApiError::Conflict(format!("Constraint violation: {}", constraint))
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    return constraint_error(constraint);
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert JWT errors to API errors
///
/// Every verification failure is the same 401 outward; expiry is
/// distinguished only in the message.
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token".to_string()),
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::ValidationError(_) => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn response_parts(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Enrollment not found".to_string());
        assert_eq!(err.to_string(), "Not found: Enrollment not found");
    }

    #[tokio::test]
    async fn test_conflict_maps_to_400_with_conflict_code() {
        let (status, body) =
            response_parts(ApiError::Conflict("Email already registered".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["msg"], "Email already registered");
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_401() {
        let (status, body) = response_parts(ApiError::Unauthorized("Token required".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_403() {
        let (status, body) = response_parts(ApiError::Forbidden("Admin role required".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (status, body) =
            response_parts(ApiError::InternalError("connection refused to db-1".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["msg"], "An internal error occurred");
        assert!(!body["msg"].as_str().unwrap().contains("db-1"));
    }

    #[tokio::test]
    async fn test_validation_error_carries_details() {
        let err = ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "email".to_string(),
            message: "Invalid email format".to_string(),
        }]);

        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "email");
    }

    #[test]
    fn test_jwt_expired_maps_to_unauthorized() {
        let err = ApiError::from(JwtError::Expired);
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_duplicate_email_constraint_maps_to_conflict() {
        let err = constraint_error("users_email_key");
        match err {
            ApiError::Conflict(msg) => assert_eq!(msg, "Email already registered"),
            other => panic!("expected conflict, got {}", other),
        }
    }

    #[test]
    fn test_duplicate_title_constraint_maps_to_conflict() {
        let err = constraint_error("workshops_titulo_key");
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_duplicate_enrollment_constraint_maps_to_conflict() {
        let err = constraint_error("enrollments_user_workshop_key");
        match err {
            ApiError::Conflict(msg) => assert_eq!(msg, "Already enrolled in this workshop"),
            other => panic!("expected conflict, got {}", other),
        }
    }

    #[test]
    fn test_enrollment_workshop_fk_maps_to_not_found() {
        // Enrolling in a vanished workshop trips the foreign key, which
        // reads as a missing workshop, not a conflict
        let err = constraint_error("enrollments_workshop_id_fkey");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Workshop not found"),
            other => panic!("expected not found, got {}", other),
        }
    }

    #[test]
    fn test_unknown_constraint_falls_back_to_generic_conflict() {
        let err = constraint_error("some_future_constraint");
        match err {
            ApiError::Conflict(msg) => assert!(msg.contains("some_future_constraint")),
            other => panic!("expected conflict, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_enrollment_conflict_responds_400() {
        let (status, body) = response_parts(constraint_error("enrollments_user_workshop_key")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["msg"], "Already enrolled in this workshop");
    }
}
