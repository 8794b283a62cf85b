use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState, users::repo_types::Role};

/// Who a token is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

/// Issues a bearer token for an already authenticated identity.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, identity: &Identity) -> anyhow::Result<String>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,   // user id
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    pub jti: Uuid,
}

/// Upper bound on token lifetime; larger configured values are clamped.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(cfg.ttl_minutes.clamp(1, MAX_TTL_MINUTES) as u64 * 60),
        }
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

impl TokenIssuer for JwtKeys {
    fn issue(&self, identity: &Identity) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: identity.user_id,
            role: identity.role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = identity.user_id, "jwt signed");
        Ok(token)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
        })
    }

    fn alice() -> Identity {
        Identity {
            user_id: 1,
            role: Role::User,
        }
    }

    #[test]
    fn issue_and_verify_carries_identity() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let identity = Identity {
            user_id: 42,
            role: Role::Admin,
        };
        let token = keys.issue(&identity).expect("issue");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn ttl_is_clamped_to_a_sane_range() {
        for (minutes, expected) in [(i64::MAX, MAX_TTL_MINUTES), (0, 1), (-30, 1), (90, 90)] {
            let keys = JwtKeys::from_config(&JwtConfig {
                secret: "dev-secret".into(),
                issuer: "iss".into(),
                audience: "aud".into(),
                ttl_minutes: minutes,
            });
            let token = keys.issue(&alice()).expect("issue");
            let claims = keys.verify(&token).expect("verify");
            assert_eq!(claims.exp - claims.iat, expected as usize * 60, "ttl {minutes}");
        }
    }

    #[test]
    fn every_issuance_is_distinct() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let a = keys.issue(&alice()).unwrap();
        let b = keys.issue(&alice()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good_keys = make_keys("same-secret", "good-iss", "good-aud");
        let bad_keys = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good_keys.issue(&alice()).expect("issue");
        assert!(bad_keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let signer = make_keys("secret-a", "iss", "aud");
        let verifier = make_keys("secret-b", "iss", "aud");
        let token = signer.issue(&alice()).unwrap();
        assert!(verifier.verify(&token).is_err());
    }
}
