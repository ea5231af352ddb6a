use crate::models::Principal;

/// Coarse-grained permission attached to an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authority {
    /// Any signed-in user.
    User,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::User => "ROLE_USER",
        }
    }
}

/// The identity bound to one request by `AuthMiddleware`.
///
/// Stored in the request extensions, so it is dropped together with the
/// request. Fields are private: once built, a context cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedContext {
    principal: Principal,
    authorities: Vec<Authority>,
}

impl AuthenticatedContext {
    /// Every authenticated request carries exactly the `User` authority.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            authorities: vec![Authority::User],
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn authorities(&self) -> &[Authority] {
        &self.authorities
    }

    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_has_single_user_authority() {
        let context = AuthenticatedContext::new(Principal {
            id: 1,
            email: "a@b.com".to_string(),
            name: None,
        });

        assert_eq!(context.authorities(), &[Authority::User]);
        assert!(context.has_authority(Authority::User));
        assert_eq!(context.principal().email, "a@b.com");
        assert_eq!(Authority::User.as_str(), "ROLE_USER");
    }
}
