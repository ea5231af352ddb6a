use std::sync::Arc;

use crate::models::Principal;
use crate::store::{StoreError, UserStore};

/// Turns a verified token subject into a `Principal`.
#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Exact lookup by email. The caller is expected to pass an already
    /// normalized email; blank input short-circuits without a store query.
    pub async fn resolve(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        if email.trim().is_empty() {
            return Ok(None);
        }

        let user = self.users.find_by_email(email).await?;
        Ok(user.map(Principal::from))
    }
}
