use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::errors::{AppError, StoreError};
use crate::users::dto::UserPatch;
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, User};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates a required email and returns its stored form.
pub(crate) fn require_email(email: &str) -> Result<String, AppError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }
    if !is_valid_email(&email) {
        return Err(AppError::Validation("invalid email".into()));
    }
    Ok(email)
}

pub(crate) fn require(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.trim().is_empty())
}

/// Lookup and lifecycle operations on user records.
pub struct IdentityService {
    store: Arc<dyn UserStore>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Creates a user without credentials.
    pub async fn create(&self, email: &str, name: &str) -> Result<User, AppError> {
        let email = require_email(email)?;
        let name = require(name, "name")?;

        let user = self
            .store
            .insert(NewUser {
                email,
                name,
                credentials: None,
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "create user rejected");
                AppError::from(e)
            })?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user with id {id} not found")))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        self.store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user with email {email} not found")))
    }

    /// Merges `patch` into the stored record and writes it back under the same id.
    pub async fn update_name_and_email(&self, id: i64, patch: UserPatch) -> Result<(), AppError> {
        let existing = self.get_by_id(id).await?;

        let email = match non_blank(patch.email.as_deref()) {
            Some(e) => require_email(e)?,
            None => existing.email.clone(),
        };
        let name = match non_blank(patch.name.as_deref()) {
            Some(n) => n.trim().to_string(),
            None => existing.name.clone(),
        };

        let merged = User {
            email,
            name,
            ..existing.clone()
        };
        if merged == existing {
            debug!(user_id = id, "update is a no-op");
            return Ok(());
        }

        self.store.update(&merged).await.map_err(|e| {
            warn!(error = %e, user_id = id, "update user rejected");
            AppError::from(e)
        })?;
        info!(user_id = id, "user updated");
        Ok(())
    }

    pub async fn delete_by_email(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email);
        self.store.delete_by_email(&email).await.map_err(|e| match e {
            StoreError::NotFound => {
                AppError::NotFound(format!("user with email {email} not found"))
            }
            other => other.into(),
        })?;
        info!(email = %email, "user deleted");
        Ok(())
    }
}
