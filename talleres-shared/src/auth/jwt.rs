/// JWT token generation and validation
///
/// Tokens are the identity assertion presented by clients, either in the
/// `token` cookie or an `Authorization: Bearer` header. They are signed
/// with HS256 (HMAC-SHA256) and valid for exactly 24 hours; there is no
/// refresh or rotation mechanism, so an expired token forces a new login.
///
/// # Claims
///
/// - Registration issues a token carrying only the user id.
/// - Login additionally embeds the role at time of login as a
///   convenience claim. The embedded role is NOT authoritative for
///   authorization; the access gate re-fetches the user record on every
///   protected request and only that live role is consulted.
///
/// # Example
///
/// ```
/// use talleres_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let secret = "your-secret-key-at-least-32-bytes-long";
///
/// let claims = Claims::for_registration(user_id);
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

/// Token issuer name, pinned during validation
const ISSUER: &str = "talleres";

/// Token lifetime. Fixed at 24 hours; expiry forces re-login.
pub fn token_ttl() -> Duration {
    Duration::hours(24)
}

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "talleres")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
///
/// # Custom Claims
///
/// - `role`: Role at time of login (absent on registration tokens,
///   never authoritative for authorization)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "talleres"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Role at issuance (login tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Claims {
    fn new(user_id: Uuid, role: Option<Role>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            role,
        }
    }

    /// Creates claims for a freshly registered user
    ///
    /// The token carries only the user id; the role is resolved from the
    /// stored record on each protected request.
    pub fn for_registration(user_id: Uuid) -> Self {
        Self::new(user_id, None, token_ttl())
    }

    /// Creates claims for a login
    ///
    /// Embeds the role at time of login for client convenience. Callers
    /// MUST NOT treat this claim as authoritative.
    pub fn for_login(user_id: Uuid, role: Role) -> Self {
        Self::new(user_id, Some(role), token_ttl())
    }

    /// Creates claims with a custom lifetime (test scaffolding for
    /// expiry behavior)
    pub fn with_ttl(user_id: Uuid, role: Option<Role>, ttl: Duration) -> Self {
        Self::new(user_id, role, ttl)
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed JWT token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails.
///
/// # Security
///
/// The secret should be at least 32 bytes (enforced at configuration
/// load), randomly generated, and never logged.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts its claims
///
/// Verifies the signature, the expiration, and the issuer.
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens so callers can log the
/// distinction; every validation failure maps to the same 401 at the
/// HTTP boundary.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_registration_claims_carry_no_role() {
        let user_id = Uuid::new_v4();
        let claims = Claims::for_registration(user_id);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "talleres");
        assert!(claims.role.is_none());
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, token_ttl().num_seconds());
    }

    #[test]
    fn test_login_claims_embed_role() {
        let claims = Claims::for_login(Uuid::new_v4(), Role::Admin);
        assert_eq!(claims.role, Some(Role::Admin));
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();

        let claims = Claims::for_login(user_id, Role::User);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.role, Some(Role::User));
        assert_eq!(validated.iss, "talleres");
    }

    #[test]
    fn test_registration_token_roundtrip_omits_role() {
        let claims = Claims::for_registration(Uuid::new_v4());
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_token(&token, SECRET).unwrap();
        assert!(validated.role.is_none());
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::for_registration(Uuid::new_v4());
        let token = create_token(&claims, SECRET).expect("Should create token");

        let result = validate_token(&token, "wrong-secret-also-32-bytes-long!");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_ttl(Uuid::new_v4(), None, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_garbage_token() {
        let result = validate_token("not-a-jwt", SECRET);
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_foreign_issuer() {
        // A token signed with our secret but a different issuer must be
        // rejected.
        #[derive(Serialize)]
        struct ForeignClaims {
            sub: Uuid,
            iss: String,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now();
        let foreign = ForeignClaims {
            sub: Uuid::new_v4(),
            iss: "someone-else".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &foreign,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::InvalidIssuer)));
    }
}
