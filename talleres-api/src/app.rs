/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use talleres_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = talleres_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    middleware::auth::{authenticate, require_admin},
    middleware::security::SecurityHeadersLayer,
    uploads::MAX_IMAGE_BYTES,
};
use crate::config::Config;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Slack on top of the image limit for multipart framing and text parts
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 512 * 1024;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                    # Health check (public)
/// ├── /uploads/*                 # Stored images (public, static)
/// ├── /auth/
/// │   ├── POST /register         # Public
/// │   ├── POST /login            # Public
/// │   ├── POST /logout           # Public
/// │   └── GET  /perfil           # Authenticated
/// ├── /workshops/
/// │   ├── GET    /               # Public
/// │   ├── GET    /:id            # Public
/// │   ├── POST   /               # Admin, multipart
/// │   ├── PUT    /:id            # Admin, multipart
/// │   └── DELETE /:id            # Admin
/// ├── /users/                    # Admin only (list/create/update/delete)
/// ├── /enrollments/              # Authenticated (enroll/list/cancel)
/// └── /home/
///     ├── GET /                  # Public
///     └── PUT /                  # Admin, multipart
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Access gate (per-scope: authenticate, then require_admin)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Session endpoints are public; the profile requires a live identity
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .merge(
            Router::new()
                .route("/perfil", get(routes::auth::perfil))
                .layer(middleware::from_fn_with_state(state.clone(), authenticate)),
        );

    // The catalog is readable without a session; writes are admin only
    let workshop_routes = Router::new()
        .route("/", get(routes::workshops::list_workshops))
        .route("/:id", get(routes::workshops::get_workshop))
        .merge(
            Router::new()
                .route("/", post(routes::workshops::create_workshop))
                .route("/:id", put(routes::workshops::update_workshop))
                .route("/:id", delete(routes::workshops::delete_workshop))
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .layer(middleware::from_fn(require_admin))
                .layer(middleware::from_fn_with_state(state.clone(), authenticate)),
        );

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/", post(routes::users::create_user))
        .route("/:id", put(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let enrollment_routes = Router::new()
        .route("/", post(routes::enrollments::enroll))
        .route("/", get(routes::enrollments::list_enrollments))
        .route("/:id", delete(routes::enrollments::cancel_enrollment))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let home_routes = Router::new()
        .route("/", get(routes::home::get_home))
        .merge(
            Router::new()
                .route("/", put(routes::home::update_home))
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .layer(middleware::from_fn(require_admin))
                .layer(middleware::from_fn_with_state(state.clone(), authenticate)),
        );

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        // Credentials must be allowed for the token cookie to travel
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let uploads_dir = state.config.uploads.dir.clone();

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/workshops", workshop_routes)
        .nest("/users", user_routes)
        .nest("/enrollments", enrollment_routes)
        .nest("/home", home_routes)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
