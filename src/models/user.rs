use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A stored user account.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    /// Trimmed, lowercased, unique.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a user. The email must already be normalized.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
}

/// The authenticated identity bound to a request.
///
/// A lightweight view of a `User` without credentials; it lives only as long
/// as the request it was resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Body of `PUT /api/users/me`.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 7,
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn test_principal_from_user() {
        let principal = Principal::from(user());
        assert_eq!(
            principal,
            Principal {
                id: 7,
                email: "ada@example.com".to_string(),
                name: Some("Ada".to_string()),
            }
        );
    }

    #[test]
    fn test_profile_update_validation() {
        let update = ProfileUpdate {
            name: "Grace".to_string(),
        };
        assert!(update.validate().is_ok());

        let update = ProfileUpdate {
            name: "".to_string(),
        };
        assert!(update.validate().is_err());

        let update = ProfileUpdate {
            name: "n".repeat(101),
        };
        assert!(update.validate().is_err());
    }
}
