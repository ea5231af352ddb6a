use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{NewUser, Task, User};

// A panic while holding the lock cannot leave these maps half-updated, so a
// poisoned lock is still safe to use.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct Users {
    last_id: i64,
    by_id: BTreeMap<i64, User>,
}

/// Process-local user store.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Users>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user; test helper for "token outlives its account" cases.
    pub fn remove(&self, id: i64) -> Option<User> {
        write(&self.users).by_id.remove(&id)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(read(&self.users)
            .by_id
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(read(&self.users).by_id.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut users = write(&self.users);
        if users.by_id.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("Email already registered".into()));
        }

        users.last_id += 1;
        let created = User {
            id: users.last_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.by_id.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_name(&self, id: i64, name: &str) -> StoreResult<Option<User>> {
        let mut users = write(&self.users);
        Ok(users.by_id.get_mut(&id).map(|user| {
            user.name = Some(name.to_string());
            user.clone()
        }))
    }
}

/// Process-local task store.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        let mut tasks: Vec<Task> = read(&self.tasks)
            .values()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(read(&self.tasks).get(&id).cloned())
    }

    async fn create(&self, task: Task) -> StoreResult<Task> {
        let mut tasks = write(&self.tasks);
        if tasks.contains_key(&task.id) {
            return Err(StoreError::Conflict("Task already exists".into()));
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, task: Task) -> StoreResult<Option<Task>> {
        let mut tasks = write(&self.tasks);
        match tasks.get_mut(&task.id) {
            Some(stored) if stored.user_id == task.user_id => {
                stored.title = task.title;
                stored.description = task.description;
                stored.completed = task.completed;
                stored.updated_at = task.updated_at;
                Ok(Some(stored.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, user_id: i64) -> StoreResult<bool> {
        let mut tasks = write(&self.tasks);
        match tasks.get(&id) {
            Some(task) if task.user_id == user_id => {
                tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
