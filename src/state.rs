use std::sync::Arc;

use crate::auth::{Authenticator, IdentityResolver, TokenCodec};
use crate::store::{MemoryTaskStore, MemoryUserStore, TaskStore, UserStore};

/// Process-wide handles shared by every handler via `web::Data<AppState>`.
///
/// Built once at startup; nothing in here is mutated afterwards (the stores
/// manage their own synchronization).
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub tokens: Arc<TokenCodec>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        tokens: Arc<TokenCodec>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            tasks,
            tokens,
            bcrypt_cost,
        }
    }

    /// State backed by fresh in-memory stores.
    pub fn in_memory(tokens: Arc<TokenCodec>, bcrypt_cost: u32) -> Self {
        Self::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryTaskStore::new()),
            tokens,
            bcrypt_cost,
        )
    }

    /// The request authenticator over this state's codec and user store.
    pub fn authenticator(&self, public_prefix: &str) -> Authenticator {
        Authenticator::new(
            Arc::clone(&self.tokens),
            IdentityResolver::new(Arc::clone(&self.users)),
            public_prefix,
        )
    }
}
