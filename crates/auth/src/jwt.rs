//! Signed bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use taskdash_config::{AuthConfig, MAX_TOKEN_TTL_SECONDS, MIN_JWT_SECRET_LEN};
use tracing::{debug, error};
use uuid::Uuid;

use crate::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// HS256 issuer and verifier bound to one secret, issuer and lifetime.
#[derive(Clone)]
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, issuer: impl Into<String>, ttl_seconds: u64) -> Result<Self, AuthError> {
        if secret.trim().len() < MIN_JWT_SECRET_LEN {
            return Err(AuthError::Configuration(format!(
                "jwt secret must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }
        let ttl = Some(ttl_seconds)
            .filter(|ttl| (1..=MAX_TOKEN_TTL_SECONDS).contains(ttl))
            .and_then(|ttl| i64::try_from(ttl).ok())
            .and_then(Duration::try_seconds)
            .ok_or_else(|| AuthError::Configuration("token ttl out of range".into()))?;

        let issuer = issuer.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer,
            ttl,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let secret = config
            .jwt_secret
            .as_deref()
            .ok_or_else(|| AuthError::Configuration("jwt secret is not configured".into()))?;
        Self::new(secret, config.issuer.clone(), config.token_ttl_seconds)
    }

    pub fn issue(&self, user_id: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if it had been signed at `issued_at`.
    pub fn issue_at(&self, user_id: &str, issued_at: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
            error!("token expiry overflows the supported date range");
            AuthError::TokenEncoding("token expiry out of range".into())
        })?;
        let claims = Claims {
            sub: user_id.to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|err| {
            error!(error = %err, "failed to sign token");
            AuthError::TokenEncoding(err.to_string())
        })?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature, issuer and expiry. Expiry is reported separately
    /// from every other failure.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(AuthError::TokenExpired),
                kind => {
                    debug!(?kind, "token rejected");
                    Err(AuthError::InvalidToken)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn manager(ttl: u64) -> JwtManager {
        JwtManager::new(SECRET, "taskdash", ttl).unwrap()
    }

    #[test]
    fn issued_token_verifies_to_same_subject() {
        let jwt = manager(3_600);
        let issued = jwt.issue("user-1").unwrap();
        let claims = jwt.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.iss, "taskdash");
        assert_eq!(claims.exp - claims.iat, 3_600);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn each_token_has_unique_jti() {
        let jwt = manager(60);
        let a = jwt.verify(&jwt.issue("u").unwrap().token).unwrap();
        let b = jwt.verify(&jwt.issue("u").unwrap().token).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let jwt = manager(60);
        let issued = jwt.issue_at("user-1", Utc::now() - Duration::seconds(120)).unwrap();
        assert!(matches!(jwt.verify(&issued.token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn token_from_other_secret_is_invalid() {
        let other = JwtManager::new("ffffffffffffffffffffffffffffffff", "taskdash", 60).unwrap();
        let issued = other.issue("user-1").unwrap();
        assert!(matches!(manager(60).verify(&issued.token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn token_from_other_issuer_is_invalid() {
        let other = JwtManager::new(SECRET, "someone-else", 60).unwrap();
        let issued = other.issue("user-1").unwrap();
        assert!(matches!(manager(60).verify(&issued.token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(manager(60).verify("not.a.jwt"), Err(AuthError::InvalidToken)));
        assert!(matches!(manager(60).verify(""), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn short_secret_and_zero_ttl_are_rejected() {
        assert!(matches!(
            JwtManager::new("short", "taskdash", 60),
            Err(AuthError::Configuration(_))
        ));
        assert!(matches!(
            JwtManager::new(SECRET, "taskdash", 0),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn oversized_ttl_is_a_configuration_error() {
        for ttl in [MAX_TOKEN_TTL_SECONDS + 1, 10_000_000_000_000, 10_000_000_000_000_000, u64::MAX] {
            assert!(
                matches!(JwtManager::new(SECRET, "taskdash", ttl), Err(AuthError::Configuration(_))),
                "ttl {ttl} accepted"
            );
        }
        assert!(JwtManager::new(SECRET, "taskdash", MAX_TOKEN_TTL_SECONDS).is_ok());
    }

    #[test]
    fn expiry_past_the_calendar_limit_is_an_error() {
        let jwt = manager(MAX_TOKEN_TTL_SECONDS);
        let result = jwt.issue_at("user-1", DateTime::<Utc>::MAX_UTC - Duration::seconds(60));
        assert!(matches!(result, Err(AuthError::TokenEncoding(_))));
    }
}
