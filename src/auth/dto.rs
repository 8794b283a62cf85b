use serde::{Deserialize, Serialize};

use crate::users::repo_types::Role;

/// Request body for user registration. Absent and `null` fields both read as `None`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub login: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_missing_fields_read_as_none() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"login":"alice","email":null,"role":"user"}"#).unwrap();
        assert_eq!(req.login.as_deref(), Some("alice"));
        assert!(req.email.is_none());
        assert!(req.password.is_none());
        assert_eq!(req.role, Some(Role::User));
    }

    #[test]
    fn unknown_role_does_not_parse() {
        assert!(serde_json::from_str::<RegisterRequest>(r#"{"role":"ROOT"}"#).is_err());
    }
}
