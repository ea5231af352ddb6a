pub mod context;
pub mod extractors;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use context::{AuthenticatedContext, Authority};
pub use extractors::CurrentUser;
pub use identity::IdentityResolver;
pub use middleware::{Anonymous, AuthMiddleware, Authenticator};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenCodec, TokenError};

/// Canonical form of an email: surrounding whitespace removed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Must be a valid email format once normalized.
    #[validate(email(message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Optional display name, at most 100 characters.
    #[serde(default)]
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

impl SignupRequest {
    /// Normalizes the email and drops a blank name, in place.
    pub fn normalize(&mut self) {
        self.email = normalize_email(&self.email);
        self.name = self
            .name
            .take()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
    }
}

/// Response structure after successful signup or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user_id: i64,
}
