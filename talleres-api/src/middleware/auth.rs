/// The access gate: authenticate, then authorize
///
/// Two composable checks applied in sequence to every protected route:
///
/// 1. [`authenticate`] extracts the token from the `token` cookie or
///    the `Authorization: Bearer` header (cookie takes precedence),
///    validates it, and re-fetches the user record by id. The re-fetch
///    is what makes role checks reflect live state — the role claim a
///    login token may carry is never consulted. The resulting
///    [`CurrentUser`] (no password hash) is attached to the request
///    extensions as the authoritative identity.
/// 2. [`require_admin`] inspects the authoritative identity's role and
///    rejects non-admins with 403. It must run strictly after
///    `authenticate`; a missing `CurrentUser` extension is a
///    programming error and maps to 500, never a silent pass.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use talleres_api::app::AppState;
/// use talleres_api::middleware::auth::{authenticate, require_admin, CurrentUser};
///
/// async fn admin_only(Extension(user): Extension<CurrentUser>) -> String {
///     format!("hello, {}", user.name)
/// }
///
/// fn admin_routes(state: AppState) -> Router<AppState> {
///     Router::new()
///         .route("/users", get(admin_only))
///         .layer(middleware::from_fn(require_admin))
///         .layer(middleware::from_fn_with_state(state, authenticate))
/// }
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use talleres_shared::{
    auth::jwt,
    models::user::{Role, User},
};

use crate::{app::AppState, error::ApiError};

/// Name of the cookie carrying the identity assertion
pub const TOKEN_COOKIE: &str = "token";

/// The authoritative identity attached to authenticated requests
///
/// Built from a fresh store lookup on every request, with the password
/// hash excluded.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// Extracts the identity assertion from request headers
///
/// Looks in the `token` cookie first, then in an
/// `Authorization: Bearer` header. The cookie wins when both are
/// present.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(cookies) = value.to_str() else {
            continue;
        };
        for pair in cookies.split(';') {
            if let Some(token) = pair.trim().strip_prefix("token=") {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Authentication middleware
///
/// # Errors
///
/// Returns 401 if the assertion is absent, invalid, or expired, or if
/// the user record no longer exists.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Token required".to_string()))?;

    let claims = jwt::validate_token(&token, state.jwt_secret())?;

    // Authoritative identity: the stored record, not the token claims
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    req.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(req).await)
}

/// Authorization middleware requiring the `admin` role
///
/// Must be layered after [`authenticate`].
///
/// # Errors
///
/// Returns 403 for non-admin identities; 500 if no authenticated
/// identity is present (gate misordering).
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let current = req.extensions().get::<CurrentUser>().ok_or_else(|| {
        ApiError::InternalError(
            "require_admin invoked without a prior authenticate layer".to_string(),
        )
    })?;

    if current.role != Role::Admin {
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let headers = headers(&[("cookie", "token=abc123")]);
        assert_eq!(extract_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_extract_token_from_cookie_among_others() {
        let headers = headers(&[("cookie", "theme=dark; token=abc123; lang=es")]);
        assert_eq!(extract_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_extract_token_from_bearer_header() {
        let headers = headers(&[("authorization", "Bearer xyz789")]);
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz789"));
    }

    #[test]
    fn test_cookie_takes_precedence_over_bearer() {
        let headers = headers(&[
            ("cookie", "token=from-cookie"),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_empty_cookie_falls_back_to_bearer() {
        let headers = headers(&[
            ("cookie", "token="),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_missing_token() {
        let headers = headers(&[("cookie", "theme=dark")]);
        assert!(extract_token(&headers).is_none());
    }

    #[test]
    fn test_non_bearer_authorization_is_ignored() {
        let headers = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert!(extract_token(&headers).is_none());
    }
}
