/// Authentication utilities
///
/// This module provides the authentication primitives for Planboard:
///
/// - [`password`]: Argon2id password hashing, with detection of legacy
///   plaintext credentials pending upgrade
/// - [`jwt`]: HS256 token generation and validation
///
/// There is deliberately no refresh mechanism and no revocation list:
/// tokens are valid for their full signed lifetime. Authorization is
/// binary (authenticated or not); no per-resource permission checks
/// exist anywhere in the system.

pub mod jwt;
pub mod password;

use serde::{Deserialize, Serialize};

/// Identity attached to a request after the auth gate accepts it
///
/// The middleware inserts this into request extensions; handlers extract
/// it with Axum's `Extension` extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Authenticated user ID
    pub id: i64,

    /// Email claim carried in the token
    pub email: String,
}

impl AuthUser {
    /// Builds the request identity from validated token claims
    pub fn from_claims(claims: &jwt::Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
        }
    }
}
