//! # tb-auth-jwt
//!
//! `AuthProvider` backed by HS256 JSON Web Tokens. Credentials are an
//! exact match against a static user list; a successful login issues a
//! one-hour token carrying the username and display name. There is no
//! server-side revocation: dropping the client cookie is the logout.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tb_core::error::{AppError, Result};
use tb_core::models::{Session, SessionClaims, User};
use tb_core::traits::AuthProvider;

const DEFAULT_TTL_SECS: i64 = 3600;

/// Wire format of the token payload.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    nickname: String,
    iat: i64,
    exp: i64,
}

pub struct JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    users: Vec<User>,
    ttl_secs: i64,
}

impl JwtAuthProvider {
    pub fn new(secret: &str, users: Vec<User>) -> Self {
        Self::with_ttl(secret, users, DEFAULT_TTL_SECS)
    }

    /// `ttl_secs` may be zero or negative to mint already-expired
    /// tokens in tests.
    pub fn with_ttl(secret: &str, users: Vec<User>, ttl_secs: i64) -> Self {
        let mut validation = Validation::default();
        // Expiry is exact; the default 60s leeway would keep a token
        // alive a minute past its stated lifetime.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            users,
            ttl_secs,
        }
    }
}

impl AuthProvider for JwtAuthProvider {
    fn login(&self, username: &str, password: &str) -> Result<Session> {
        let user = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .ok_or(AppError::InvalidCredentials)?;

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user.username.clone(),
            nickname: user.nickname.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Session {
            token,
            claims: SessionClaims {
                username: claims.sub,
                nickname: claims.nickname,
            },
        })
    }

    /// Any verification failure collapses to `InvalidCredentials`;
    /// the client cannot distinguish tampered from expired.
    fn verify(&self, token: &str) -> Result<SessionClaims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| AppError::InvalidCredentials)?;
        Ok(SessionClaims {
            username: data.claims.sub,
            nickname: data.claims.nickname,
        })
    }
}

/// The static demo credential list.
pub fn default_users() -> Vec<User> {
    vec![
        User::new("user1", "pass1", "User One"),
        User::new("user2", "pass2", "User Two"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtAuthProvider {
        JwtAuthProvider::new("test-secret", default_users())
    }

    #[test]
    fn login_round_trips_identity_and_display_name() {
        let auth = provider();
        let session = auth.login("user1", "pass1").unwrap();
        assert_eq!(session.claims.username, "user1");
        assert_eq!(session.claims.nickname, "User One");

        let claims = auth.verify(&session.token).unwrap();
        assert_eq!(claims.username, "user1");
        assert_eq!(claims.nickname, "User One");
    }

    #[test]
    fn unregistered_pair_is_rejected() {
        let auth = provider();
        assert!(matches!(
            auth.login("user1", "wrong").unwrap_err(),
            AppError::InvalidCredentials
        ));
        assert!(matches!(
            auth.login("nobody", "pass1").unwrap_err(),
            AppError::InvalidCredentials
        ));
    }

    #[test]
    fn tampered_token_fails_verification() {
        let auth = provider();
        let session = auth.login("user2", "pass2").unwrap();

        let mut tampered = session.token.clone();
        let last = tampered.pop().map(|c| if c == 'A' { 'B' } else { 'A' });
        tampered.push(last.unwrap_or('A'));

        assert!(matches!(
            auth.verify(&tampered).unwrap_err(),
            AppError::InvalidCredentials
        ));
        assert!(auth.verify("not-a-token").is_err());
    }

    #[test]
    fn expired_token_fails_verification() {
        let auth = JwtAuthProvider::with_ttl("test-secret", default_users(), -10);
        let session = auth.login("user1", "pass1").unwrap();
        assert!(matches!(
            auth.verify(&session.token).unwrap_err(),
            AppError::InvalidCredentials
        ));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let issuer = JwtAuthProvider::new("other-secret", default_users());
        let session = issuer.login("user1", "pass1").unwrap();
        assert!(provider().verify(&session.token).is_err());
    }
}
