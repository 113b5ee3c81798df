/// Authentication utilities
///
/// This module provides the secure authentication primitives for the
/// talleres backend:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token generation and validation
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with a fixed work factor; plaintext
///   passwords are never stored or logged
/// - **JWT Tokens**: HS256 signing, 24 hour expiration, issuer pinning
/// - **Constant-time Comparison**: Password verification uses
///   constant-time operations
///
/// # Example
///
/// ```no_run
/// use talleres_shared::auth::password::{hash_password, verify_password};
/// use talleres_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // Token issuance for a registered user
/// let claims = Claims::for_registration(Uuid::new_v4());
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
