use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

/// Request body for direct user creation (no credentials).
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Partial update. Absent or blank fields keep the stored value.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Public projection of a user. Never carries login data.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
        }
    }
}
