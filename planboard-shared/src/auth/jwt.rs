/// JWT token generation and validation
///
/// Tokens are signed with HS256 (HMAC-SHA256) using a process-wide shared
/// secret and carry the user's numeric id plus email. Expiry is the only
/// lifetime control: there is no refresh flow and no server-side kill
/// switch, so a minted token remains valid until its `exp` passes.
///
/// # Claims
///
/// - `sub`: user id (numeric)
/// - `email`: user email
/// - `iat`: issued-at (Unix timestamp)
/// - `exp`: expiration (Unix timestamp)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token failed signature or claim validation
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: i64,

    /// User email
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user with the given time-to-live
    pub fn new(user_id: i64, email: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            email: email.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed JWT from claims
///
/// The secret should be at least 32 bytes and come from configuration,
/// never from a hard-coded constant.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and extracts its claims
///
/// Verifies the HS256 signature and the expiry timestamp. A tampered or
/// expired token is rejected; there is no grace period beyond the
/// library's default leeway.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(42, "user@example.com", Duration::hours(48));

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "user@example.com");
        assert!(claims.exp > claims.iat);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new(7, "a@b.test", Duration::hours(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, 7);
        assert_eq!(validated.email, "a@b.test");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(1, "a@b.test", Duration::hours(1));
        let token = create_token(&claims, "secret1-secret1-secret1-secret1!").unwrap();

        let result = validate_token(&token, "wrong-secret-wrong-secret-wrong!");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_tampered_token() {
        let claims = Claims::new(1, "a@b.test", Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        // Flip a character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        parts[1] = format!("x{}", &parts[1][1..]);
        let tampered = parts.join(".");

        assert!(validate_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        // Expired two hours ago, well past the default 60s leeway
        let claims = Claims::new(1, "a@b.test", Duration::hours(-2));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_user_id_survives_roundtrip_unchanged() {
        for id in [1_i64, 42, i64::MAX] {
            let claims = Claims::new(id, "x@y.test", Duration::hours(1));
            let token = create_token(&claims, SECRET).unwrap();
            assert_eq!(validate_token(&token, SECRET).unwrap().sub, id);
        }
    }
}
