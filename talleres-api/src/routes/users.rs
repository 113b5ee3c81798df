/// Admin user management endpoints
///
/// The whole scope sits behind the admin gate. Responses carry the
/// [`PublicUser`] projection; the password hash never leaves the store.
///
/// # Endpoints
///
/// - `GET    /users` - List all users (admin)
/// - `POST   /users` - Create a user with an explicit role (admin)
/// - `PUT    /users/:id` - Update a user (admin)
/// - `DELETE /users/:id` - Delete a user (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::DataResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use talleres_shared::{
    auth::password,
    models::user::{CreateUser, PublicUser, Role, UpdateUser, User},
};

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (hashed before storage)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Display name
    #[validate(length(min = 2, max = 50, message = "Name must be 2 to 50 characters"))]
    pub name: String,

    /// Role; defaults to `user` when absent
    pub role: Option<Role>,
}

/// Update user request
///
/// All fields optional; only present fields are written.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,

    #[validate(length(min = 2, max = 50, message = "Name must be 2 to 50 characters"))]
    pub name: Option<String>,

    pub role: Option<Role>,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub ok: bool,
    pub msg: String,
}

/// List all users (admin)
pub async fn list_users(
    State(state): State<AppState>,
) -> ApiResult<Json<DataResponse<Vec<PublicUser>>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(DataResponse::new(
        users.into_iter().map(PublicUser::from).collect(),
    )))
}

/// Create a user (admin)
///
/// Unlike self-registration this may assign the `admin` role directly.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the email is taken
/// - `500 Internal Server Error`: Server error
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate().map_err(ApiError::from_validation)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name,
            role: req.role.unwrap_or_default(),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(PublicUser::from(user))),
    ))
}

/// Update a user (admin)
///
/// A present password is re-hashed before storage. Role changes take
/// effect on the target's next request, because the access gate reads
/// the stored role rather than the token.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the new email is taken
/// - `404 Not Found`: No user with that id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<DataResponse<PublicUser>>> {
    req.validate().map_err(ApiError::from_validation)?;

    let password_hash = match &req.password {
        Some(password) => Some(password::hash_password(password)?),
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            email: req.email,
            name: req.name,
            role: req.role,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(DataResponse::new(PublicUser::from(user))))
}

/// Delete a user (admin)
///
/// Permanent; the user's enrollments are removed by the schema's
/// cascade.
///
/// # Errors
///
/// - `404 Not Found`: No user with that id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(DeletedResponse {
        ok: true,
        msg: "User deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_validation() {
        let req = CreateUserRequest {
            email: "bad".to_string(),
            password: "123".to_string(),
            name: "a".to_string(),
            role: None,
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_update_request_absent_fields_pass_validation() {
        let req = UpdateUserRequest {
            email: None,
            password: None,
            name: None,
            role: None,
        };

        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_validates_present_fields_only() {
        let req = UpdateUserRequest {
            email: None,
            password: Some("123".to_string()),
            name: None,
            role: Some(Role::Admin),
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_role_deserializes_from_wire_string() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"email":"a@b.com","password":"secret1","name":"Ana","role":"admin"}"#,
        )
        .unwrap();

        assert_eq!(req.role, Some(Role::Admin));
    }
}
