use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::{Identity, TokenIssuer},
        password::{hash_password, verify_password},
    },
    errors::AppError,
    users::{
        repo::UserStore,
        repo_types::{Credentials, NewUser},
        services::{require, require_email},
    },
};

/// Why a credential check failed. Callers only ever see `AppError::Authentication`.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("unknown login")]
    UnknownLogin,
    #[error("password mismatch")]
    BadPassword,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Checks a login/password pair and resolves the identity behind it.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, login: &str, password: &str) -> Result<Identity, AuthFailure>;
}

lazy_static! {
    /// Verified against when a login has no stored hash, so a miss costs the
    /// same argon2 work as a wrong password.
    static ref DUMMY_HASH: Option<String> = hash_password("userhub-dummy-password").ok();
}

fn verify_against_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// Authenticator backed by the user store and argon2 hashes.
pub struct StoreAuthenticator {
    store: Arc<dyn UserStore>,
}

impl StoreAuthenticator {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Authenticator for StoreAuthenticator {
    async fn authenticate(&self, login: &str, password: &str) -> Result<Identity, AuthFailure> {
        let user = self
            .store
            .find_by_login(login)
            .await
            .map_err(|e| AuthFailure::Internal(e.into()))?;

        // A user without credentials takes the same path as an unknown login.
        let Some((user_id, creds)) = user.and_then(|u| u.credentials.map(|c| (u.id, c))) else {
            verify_against_dummy(password);
            return Err(AuthFailure::UnknownLogin);
        };
        if !verify_password(password, &creds.password_hash)? {
            return Err(AuthFailure::BadPassword);
        }
        Ok(Identity {
            user_id,
            role: creds.role,
        })
    }
}

fn required_password(password: Option<&str>) -> Result<&str, AppError> {
    match password {
        Some(p) if !p.is_empty() => Ok(p),
        _ => Err(AppError::Validation("password is required".into())),
    }
}

/// Registration and login orchestration.
pub struct AuthFlow {
    store: Arc<dyn UserStore>,
    authenticator: Arc<dyn Authenticator>,
    tokens: Arc<dyn TokenIssuer>,
}

impl AuthFlow {
    pub fn new(
        store: Arc<dyn UserStore>,
        authenticator: Arc<dyn Authenticator>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            store,
            authenticator,
            tokens,
        }
    }

    /// Creates a credentialed user. Nothing about the password or hash is returned.
    pub async fn register(&self, payload: RegisterRequest) -> Result<(), AppError> {
        let login = require(payload.login.as_deref().unwrap_or_default(), "login")?;
        let email = require_email(payload.email.as_deref().unwrap_or_default())?;
        let name = require(payload.name.as_deref().unwrap_or_default(), "name")?;
        let password = required_password(payload.password.as_deref())?;
        let role = payload
            .role
            .ok_or_else(|| AppError::Validation("role is required".into()))?;

        if self.store.find_by_login(&login).await?.is_some() {
            warn!(login = %login, "login already registered");
            return Err(AppError::Conflict("login already registered".into()));
        }

        let password_hash = hash_password(password).map_err(|e| {
            error!(error = %e, "hash_password failed");
            AppError::Internal(e)
        })?;

        // The store's unique constraints settle races with concurrent registrations.
        let user = self
            .store
            .insert(NewUser {
                email,
                name,
                credentials: Some(Credentials {
                    login,
                    password_hash,
                    role,
                }),
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "registration rejected by store");
                AppError::from(e)
            })?;

        info!(user_id = user.id, "user registered");
        Ok(())
    }

    /// Verifies credentials and returns a fresh token.
    pub async fn login(&self, payload: LoginRequest) -> Result<String, AppError> {
        let login = require(payload.login.as_deref().unwrap_or_default(), "login")?;
        let password = required_password(payload.password.as_deref())?;

        let identity = match self.authenticator.authenticate(&login, password).await {
            Ok(identity) => identity,
            Err(AuthFailure::UnknownLogin) => {
                warn!(login = %login, "login unknown");
                return Err(AppError::Authentication);
            }
            Err(AuthFailure::BadPassword) => {
                warn!(login = %login, "login invalid password");
                return Err(AppError::Authentication);
            }
            Err(AuthFailure::Internal(e)) => {
                error!(error = %e, "authenticate failed");
                return Err(AppError::Internal(e));
            }
        };

        let token = self.tokens.issue(&identity).map_err(|e| {
            error!(error = %e, "jwt sign failed");
            AppError::Internal(e)
        })?;

        info!(user_id = identity.user_id, "user logged in");
        Ok(token)
    }
}
