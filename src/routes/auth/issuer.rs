//! Mints and verifies the access/refresh credential pair.
//!
//! Access and refresh tokens are signed with different secrets and carry a
//! `token_use` claim, so neither can stand in for the other.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    config::Config,
    routes::auth::claims::{Claims, TokenUse},
    utils::jwt::{create_jwt, decode_jwt, JwtKeys, JwtSecretError, TokenError},
};

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug)]
pub struct CredentialIssuer {
    access_keys: JwtKeys,
    refresh_keys: JwtKeys,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl CredentialIssuer {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        issuer: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, JwtSecretError> {
        if access_secret == refresh_secret {
            return Err(JwtSecretError::Reused);
        }

        Ok(Self {
            access_keys: JwtKeys::from_secret(access_secret)?,
            refresh_keys: JwtKeys::from_secret(refresh_secret)?,
            issuer: issuer.into(),
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, JwtSecretError> {
        Self::new(
            &config.access_token_secret,
            &config.refresh_token_secret,
            config.jwt_issuer.clone(),
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(user_id)?,
            refresh_token: self.sign(user_id, TokenUse::Refresh, self.refresh_ttl)?,
        })
    }

    pub fn issue_access(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.sign(user_id, TokenUse::Access, self.access_ttl)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        decode_jwt(token, &self.access_keys, &self.issuer, TokenUse::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        decode_jwt(token, &self.refresh_keys, &self.issuer, TokenUse::Refresh)
    }

    /// Signs arbitrary claims with the key matching `claims.token_use`. Only
    /// tests need control over `exp`.
    #[cfg(test)]
    pub fn sign_claims(&self, claims: Claims) -> Result<String, TokenError> {
        let keys = match claims.token_use {
            TokenUse::Access => &self.access_keys,
            TokenUse::Refresh => &self.refresh_keys,
        };
        create_jwt(claims, keys, &self.issuer)
    }

    fn sign(&self, user_id: Uuid, token_use: TokenUse, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp() as usize,
            exp: (now + ttl).timestamp() as usize,
            iss: String::new(),
            token_use,
        };
        let keys = match token_use {
            TokenUse::Access => &self.access_keys,
            TokenUse::Refresh => &self.refresh_keys,
        };
        create_jwt(claims, keys, &self.issuer)
    }
}
