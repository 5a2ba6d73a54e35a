use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use compass_core::models::user::{Role, User};

use crate::error::AuthError;

const ISSUER: &str = "compass";

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Issues and validates HS256 session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user`, valid for the configured TTL.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = jiff::Timestamp::now().as_second();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        self.sign(user, now, now.saturating_add(ttl))
    }

    /// Validate signature, issuer and expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;
        validation.leeway = 30;

        let token_data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(token_data.claims)
    }

    fn sign(&self, user: &User, iat: i64, exp: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iss: ISSUER.to_string(),
            iat,
            exp,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        let now = jiff::Timestamp::now();
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            role,
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret-of-reasonable-length", Duration::from_secs(3600))
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let admin = user(Role::Admin);
        let token = keys().issue(&admin).unwrap();
        let claims = keys().validate(&token).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = keys().issue(&user(Role::User)).unwrap();
        let other = SessionKeys::new(b"another-secret-entirely", Duration::from_secs(3600));
        assert!(matches!(other.validate(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = jiff::Timestamp::now().as_second();
        let token = keys()
            .sign(&user(Role::User), now - 7200, now - 3600)
            .unwrap();
        assert!(matches!(keys().validate(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(keys().validate("not.a.token").is_err());
    }
}
