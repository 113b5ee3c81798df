/// Middleware modules for the API server
///
/// - `auth`: the access gate (authenticate, then authorize by role)
/// - `security`: security response headers

pub mod auth;
pub mod security;
