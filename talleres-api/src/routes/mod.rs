/// API route handlers
///
/// Each submodule owns one resource scope:
/// - `auth`: registration, login, logout, profile
/// - `enrollments`: the enrollment ledger
/// - `health`: service health
/// - `home`: singleton homepage content
/// - `users`: admin user management
/// - `workshops`: workshop catalog
///
/// Resource successes share the [`DataResponse`] envelope, the mirror
/// image of the error envelope: clients branch on `ok` for every
/// outcome.

use serde::Serialize;

pub mod auth;
pub mod enrollments;
pub mod health;
pub mod home;
pub mod users;
pub mod workshops;

/// Success envelope for resource responses
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    /// Always true on success
    pub ok: bool,

    /// The payload
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_response_envelope_shape() {
        let json = serde_json::to_value(DataResponse::new(vec![1, 2, 3])).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }
}
