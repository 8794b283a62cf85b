use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::{StoreError, UniqueField};
use crate::users::repo_types::{NewUser, User, UserRow};

/// Persistence seam for user records. Uniqueness of `email` and `login` is
/// enforced here, atomically, not by callers.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;
    /// Rewrites email and name of the row with `user.id`.
    async fn update(&self, user: &User) -> Result<(), StoreError>;
    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError>;
}

const USER_COLUMNS: &str = "id, login, email, name, password_hash, role";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("select user by {column}"))?;
        row.map(User::try_from).transpose().map_err(StoreError::from)
    }
}

/// Maps a unique-constraint name to the field it guards.
pub(crate) fn conflict_field(constraint: Option<&str>) -> Option<UniqueField> {
    match constraint? {
        "users_email_key" => Some(UniqueField::Email),
        "users_login_key" => Some(UniqueField::Login),
        _ => None,
    }
}

fn map_write_err(e: sqlx::Error, what: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            if let Some(field) = conflict_field(db_err.constraint()) {
                return StoreError::Conflict(field);
            }
        }
    }
    StoreError::Internal(anyhow::Error::new(e).context(what))
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let (login, password_hash, role) = match &user.credentials {
            Some(c) => (Some(c.login.as_str()), Some(c.password_hash.as_str()), Some(c.role.as_str())),
            None => (None, None, None),
        };
        let sql = format!(
            "INSERT INTO users (login, email, name, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(login)
            .bind(&user.email)
            .bind(&user.name)
            .bind(password_hash)
            .bind(role)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_write_err(e, "insert user"))?;
        Ok(User::try_from(row)?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("select user by id")?;
        row.map(User::try_from).transpose().map_err(StoreError::from)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one("email", email).await
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        self.find_one("login", login).await
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET email = $2, name = $3
             WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .execute(&self.db)
        .await
        .map_err(|e| map_write_err(e, "update user"))?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.db)
            .await
            .context("delete user by email")?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_constraints_map_to_fields() {
        assert_eq!(conflict_field(Some("users_email_key")), Some(UniqueField::Email));
        assert_eq!(conflict_field(Some("users_login_key")), Some(UniqueField::Login));
        assert_eq!(conflict_field(Some("users_pkey")), None);
        assert_eq!(conflict_field(None), None);
    }

    #[test]
    fn non_database_errors_are_internal() {
        let err = map_write_err(sqlx::Error::RowNotFound, "update user");
        assert!(matches!(err, StoreError::Internal(_)));
    }
}
