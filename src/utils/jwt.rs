use std::collections::HashSet;

use crate::routes::auth::claims::{Claims, TokenUse};
use jsonwebtoken::{
    decode, encode, errors::Error, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Minimum acceptable size for a signing secret in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected for a secret to avoid trivially guessable values.
const MIN_UNIQUE_JWT_BYTES: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JwtSecretError {
    #[error("{name} must be set")]
    Missing { name: &'static str },
    #[error("token secret must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort { actual: usize, required: usize },
    #[error(
        "token secret must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy { actual: usize, required: usize },
    #[error("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ")]
    Reused,
}

/// Why a presented token was rejected.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid: {0}")]
    Invalid(#[source] Error),
    #[error("token presented for the wrong purpose")]
    WrongUse,
    #[error("failed to sign token: {0}")]
    Encode(#[source] Error),
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, JwtSecretError> {
        let bytes = secret.as_ref();
        validate_secret(bytes)?;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

fn validate_secret(secret: &[u8]) -> Result<(), JwtSecretError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(JwtSecretError::TooShort {
            actual: secret.len(),
            required: MIN_JWT_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_JWT_BYTES {
        return Err(JwtSecretError::LowEntropy {
            actual: unique,
            required: MIN_UNIQUE_JWT_BYTES,
        });
    }

    Ok(())
}

pub fn create_jwt(mut claims: Claims, keys: &JwtKeys, issuer: &str) -> Result<String, TokenError> {
    claims.iss = issuer.to_owned();
    encode(&Header::default(), &claims, keys.encoding_key()).map_err(TokenError::Encode)
}

/// Verifies signature, issuer, expiry and intended use.
///
/// Signature problems are reported as [`TokenError::Invalid`] even when the
/// token is also past its expiry, so only a genuine token can be `Expired`.
pub fn decode_jwt(
    token: &str,
    keys: &JwtKeys,
    issuer: &str,
    expected_use: TokenUse,
) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.iss = Some(HashSet::from([issuer.to_owned()]));
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.required_spec_claims = HashSet::from(["exp".to_string(), "iss".to_string()]);

    let data = decode::<Claims>(token, keys.decoding_key(), &validation).map_err(|err| {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err),
        }
    })?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| TokenError::Invalid(Error::from(ErrorKind::InvalidToken)))?
        .as_secs();

    if (data.claims.exp as u64) <= now {
        return Err(TokenError::Expired);
    }

    if data.claims.token_use != expected_use {
        return Err(TokenError::WrongUse);
    }

    Ok(data.claims)
}
