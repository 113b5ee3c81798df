/// Authentication endpoints
///
/// This module provides session management endpoints:
/// - Registration
/// - Login
/// - Logout
/// - Profile of the authenticated user
///
/// Successful registration and login set the identity token in an
/// `HttpOnly` cookie and also return it in the body for bearer-header
/// clients. The registration token carries no role claim; the login
/// token embeds the stored role for client convenience only, since the
/// access gate always re-reads the stored record.
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new user (role `user`)
/// - `POST /auth/login` - Login with email and password
/// - `POST /auth/logout` - Clear the token cookie
/// - `GET /auth/perfil` - Current identity (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::{CurrentUser, TOKEN_COOKIE},
};
use axum::{extract::State, http::header::SET_COOKIE, http::StatusCode, Extension, Json};
use axum::response::{AppendHeaders, IntoResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use talleres_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, PublicUser, Role, User},
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Display name
    #[validate(length(min = 2, max = 50, message = "Name must be 2 to 50 characters"))]
    pub name: String,

    /// Requested role; defaults to `user` when absent
    pub role: Option<Role>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Session response for register and login
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Always true on success
    pub ok: bool,

    /// Public view of the user, never the password hash
    pub user: PublicUser,

    /// Identity token, also set as the `token` cookie
    pub token: String,
}

/// Simple acknowledgement body
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub ok: bool,
    pub msg: String,
}

/// Profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub ok: bool,
    pub user: CurrentUser,
}

/// Builds the Set-Cookie value carrying the identity token
///
/// Production deployments serve the frontend from another origin over
/// HTTPS, so the cookie needs `Secure; SameSite=None` there; local
/// development uses `SameSite=Lax` without `Secure`.
fn token_cookie(token: &str, production: bool) -> String {
    let base = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}",
        TOKEN_COOKIE,
        token,
        jwt::token_ttl().num_seconds()
    );

    if production {
        format!("{}; Secure; SameSite=None", base)
    } else {
        format!("{}; SameSite=Lax", base)
    }
}

/// Builds the Set-Cookie value that clears the identity token
fn clear_token_cookie(production: bool) -> String {
    let base = format!("{}=; HttpOnly; Path=/; Max-Age=0", TOKEN_COOKIE);

    if production {
        format!("{}; Secure; SameSite=None", base)
    } else {
        format!("{}; SameSite=Lax", base)
    }
}

/// Register a new user
///
/// The body may name a role; absent, the account is a plain `user`.
/// The friendly duplicate email check runs first, but the unique
/// constraint remains the authoritative rejection under races.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the email is taken
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
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

    // Registration tokens identify only; no role claim
    let claims = jwt::Claims::for_registration(user.id);
    let token = jwt::create_token(&claims, state.jwt_secret())?;
    let cookie = token_cookie(&token, state.config.api.production);

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SessionResponse {
            ok: true,
            user: PublicUser::from(user),
            token,
        }),
    ))
}

/// Login with email and password
///
/// Unknown email and wrong password produce the same 401, so callers
/// cannot probe which accounts exist.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let claims = jwt::Claims::for_login(user.id, user.role);
    let token = jwt::create_token(&claims, state.jwt_secret())?;
    let cookie = token_cookie(&token, state.config.api.production);

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SessionResponse {
            ok: true,
            user: PublicUser::from(user),
            token,
        }),
    ))
}

/// Logout
///
/// Clears the token cookie. Stateless tokens cannot be revoked, so a
/// bearer-header client simply discards its copy.
pub async fn logout(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let cookie = clear_token_cookie(state.config.api.production);

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(AckResponse {
            ok: true,
            msg: "Logged out".to_string(),
        }),
    ))
}

/// Current identity
///
/// Returns the authenticated user as resolved by the access gate, which
/// re-reads the stored record on every request.
pub async fn perfil(Extension(current): Extension<CurrentUser>) -> ApiResult<Json<ProfileResponse>> {
    Ok(Json(ProfileResponse {
        ok: true,
        user: current,
    }))
}
