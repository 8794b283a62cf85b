use std::{env::VarError, fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::{anyhow, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
}

/// Reads `key`, falling back to `default` only when it is unset.
/// A value that is present but does not parse is a startup error.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{key}={raw:?} is invalid: {e}")),
        Err(VarError::NotPresent) => Ok(default),
        Err(e) => Err(e).with_context(|| format!("{key} is not valid unicode")),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "userhub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "userhub-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60)?,
        };
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080)?,
            database_url,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_defaults_only_when_unset() {
        assert_eq!(env_or("USERHUB_TEST_SURELY_UNSET", 42i64).unwrap(), 42);
        std::env::set_var("USERHUB_TEST_NUMBER", " 15 ");
        assert_eq!(env_or("USERHUB_TEST_NUMBER", 7u32).unwrap(), 15);
    }

    #[test]
    fn env_or_rejects_malformed_values() {
        std::env::set_var("USERHUB_TEST_GARBAGE", "not-a-number");
        let err = env_or("USERHUB_TEST_GARBAGE", 7u32).unwrap_err();
        assert!(err.to_string().contains("USERHUB_TEST_GARBAGE"));

        std::env::set_var("USERHUB_TEST_PORT_OVERFLOW", "70000");
        assert!(env_or::<u16>("USERHUB_TEST_PORT_OVERFLOW", 8080).is_err());

        std::env::set_var("USERHUB_TEST_EMPTY", "");
        assert!(env_or::<u32>("USERHUB_TEST_EMPTY", 10).is_err());
    }

    #[test]
    fn listen_addr_parses_host_and_port() {
        let mut cfg = crate::state::AppState::fake().config.as_ref().clone();
        cfg.host = "127.0.0.1".into();
        cfg.port = 9000;
        assert_eq!(cfg.listen_addr().unwrap().to_string(), "127.0.0.1:9000");

        cfg.host = "not a host".into();
        assert!(cfg.listen_addr().is_err());
    }
}
