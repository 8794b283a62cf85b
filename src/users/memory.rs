use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::{StoreError, UniqueField};
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, User};

/// In-process `UserStore` for tests. Check-and-write happens under one lock,
/// so it enforces uniqueness the way a database constraint would.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

impl Inner {
    fn conflict(&self, id: Option<i64>, email: &str, login: Option<&str>) -> Option<UniqueField> {
        let others = self.rows.values().filter(|u| Some(u.id) != id);
        for u in others {
            if u.email == email {
                return Some(UniqueField::Email);
            }
            let existing = u.credentials.as_ref().map(|c| c.login.as_str());
            if login.is_some() && existing == login {
                return Some(UniqueField::Login);
            }
        }
        None
    }
}

impl MemoryUserStore {
    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;
        let login = user.credentials.as_ref().map(|c| c.login.as_str());
        if let Some(field) = inner.conflict(None, &user.email, login) {
            return Err(StoreError::Conflict(field));
        }
        inner.next_id += 1;
        let stored = User {
            id: inner.next_id,
            email: user.email,
            name: user.name,
            credentials: user.credentials,
        };
        inner.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.inner.lock().await.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .values()
            .find(|u| u.credentials.as_ref().is_some_and(|c| c.login == login))
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.rows.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        if let Some(field) = inner.conflict(Some(user.id), &user.email, None) {
            return Err(StoreError::Conflict(field));
        }
        if let Some(row) = inner.rows.get_mut(&user.id) {
            row.email = user.email.clone();
            row.name = user.name.clone();
        }
        Ok(())
    }

    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner
            .rows
            .values()
            .find(|u| u.email == email)
            .map(|u| u.id)
            .ok_or(StoreError::NotFound)?;
        inner.rows.remove(&id);
        Ok(())
    }
}
