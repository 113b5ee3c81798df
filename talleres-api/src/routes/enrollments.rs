/// Enrollment endpoints
///
/// Every operation is scoped to the authenticated caller; there is no
/// admin override and no way to act on another user's enrollments. The
/// compound unique index is the authoritative duplicate rejection; the
/// workshop existence and duplicate pre-checks only produce friendlier
/// messages ahead of it.
///
/// # Endpoints
///
/// - `POST   /enrollments` - Enroll in a workshop
/// - `GET    /enrollments` - List own enrollments with workshops
/// - `DELETE /enrollments/:id` - Cancel an own enrollment

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::CurrentUser,
    routes::DataResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use talleres_shared::models::{
    enrollment::{Enrollment, EnrollmentWithWorkshop},
    workshop::Workshop,
};

/// Enroll request
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    /// Target workshop
    pub workshop_id: Uuid,
}

/// Cancellation acknowledgement
#[derive(Debug, Serialize)]
pub struct CancelledResponse {
    pub ok: bool,
    pub msg: String,
}

/// Enroll the caller in a workshop
///
/// Responds 200 with the created ledger entry.
///
/// # Errors
///
/// - `400 Bad Request`: Already enrolled in this workshop
/// - `404 Not Found`: The workshop does not exist
pub async fn enroll(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<EnrollRequest>,
) -> ApiResult<Json<DataResponse<Enrollment>>> {
    if Workshop::find_by_id(&state.db, req.workshop_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Workshop not found".to_string()));
    }

    if Enrollment::exists(&state.db, current.id, req.workshop_id).await? {
        return Err(ApiError::Conflict(
            "Already enrolled in this workshop".to_string(),
        ));
    }

    // A race past the pre-checks still fails on the unique index or the
    // foreign key and maps to the same responses
    let enrollment = Enrollment::enroll(&state.db, current.id, req.workshop_id).await?;

    Ok(Json(DataResponse::new(enrollment)))
}

/// List the caller's enrollments
///
/// Each entry embeds its workshop; a workshop deleted after enrollment
/// appears as a null `workshop` field rather than dropping the entry.
pub async fn list_enrollments(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<DataResponse<Vec<EnrollmentWithWorkshop>>>> {
    let enrollments = Enrollment::list_for_user(&state.db, current.id).await?;
    Ok(Json(DataResponse::new(enrollments)))
}

/// Cancel one of the caller's enrollments
///
/// An enrollment that exists but belongs to someone else yields the
/// same 404 as one that does not exist at all.
///
/// # Errors
///
/// - `404 Not Found`: No such enrollment owned by the caller
pub async fn cancel_enrollment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CancelledResponse>> {
    let cancelled = Enrollment::cancel(&state.db, id, current.id).await?;
    if !cancelled {
        return Err(ApiError::NotFound("Enrollment not found".to_string()));
    }

    Ok(Json(CancelledResponse {
        ok: true,
        msg: "Enrollment cancelled".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enroll_request_deserializes_workshop_id() {
        let req: EnrollRequest = serde_json::from_str(
            r#"{"workshop_id":"7f1f9e8a-1111-4222-8333-444455556666"}"#,
        )
        .unwrap();

        assert_eq!(
            req.workshop_id,
            "7f1f9e8a-1111-4222-8333-444455556666".parse::<Uuid>().unwrap()
        );
    }

    #[test]
    fn test_enroll_request_rejects_malformed_id() {
        let result = serde_json::from_str::<EnrollRequest>(r#"{"workshop_id":"not-a-uuid"}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_enroll_success_responds_200_with_envelope() {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;
        use chrono::Utc;

        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            workshop_id: Uuid::new_v4(),
            enrolled_at: Utc::now(),
        };

        let response = Json(DataResponse::new(enrollment.clone())).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["data"]["id"], enrollment.id.to_string());
    }
}
