use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Authorization role of a credentialed user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[serde(alias = "admin")]
    Admin,
    #[serde(alias = "user")]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

/// Login data of a user that can authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password_hash: String, // argon2 PHC string
    pub role: Role,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// User record. Deliberately not `Serialize`: responses go through `UserResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub credentials: Option<Credentials>, // None for users created without a password
}

/// User about to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub credentials: Option<Credentials>,
}

/// Raw `users` row.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub login: Option<String>,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub role: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let credentials = match (r.login, r.password_hash, r.role) {
            (Some(login), Some(password_hash), Some(role)) => Some(Credentials {
                login,
                password_hash,
                role: role.parse()?,
            }),
            (None, None, None) => None,
            _ => anyhow::bail!("user {} has partial credentials", r.id),
        };
        Ok(Self {
            id: r.id,
            email: r.email,
            name: r.name,
            credentials,
        })
    }
}
