//! Persistence seams for users and tasks.
//!
//! Handlers and the authentication layer only see the `UserStore` and
//! `TaskStore` traits. `postgres` backs them with sqlx; `memory` keeps
//! everything in process and is what the test suite runs against.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, Task, User};

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer failures, independent of HTTP so callers choose how to fail.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps Postgres unique violations (SQLSTATE 23505) to `Conflict`.
    pub fn from_sqlx(error: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.code().as_deref() == Some("23505") {
                return StoreError::Conflict(conflict.to_string());
            }
        }
        StoreError::Database(error)
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact match on an already-normalized email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Inserts a user. Fails with `Conflict` if the email is taken.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    /// Returns `None` if no user has this id.
    async fn update_name(&self, id: i64, name: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<Task>>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<Task>>;

    async fn create(&self, task: Task) -> StoreResult<Task>;

    /// Persists title, description, completed and updated_at for a task with
    /// matching id and owner. Returns `None` if there is no such task.
    async fn update(&self, task: Task) -> StoreResult<Option<Task>>;

    /// Deletes the task if `user_id` owns it. Returns whether a row was removed.
    async fn delete(&self, id: Uuid, user_id: i64) -> StoreResult<bool>;
}
