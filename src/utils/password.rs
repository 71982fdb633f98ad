use std::sync::OnceLock;

use argon2::Argon2;
use password_hash::{
    rand_core::OsRng, Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};

/// An Argon2 PHC string. Repositories only accept this type, so a plaintext
/// password cannot reach storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn new(plaintext: &str) -> Result<Self, Error> {
        hash_password(plaintext).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("no-such-account").ok())
        .as_deref()
}

/// Runs a full verification against a throwaway hash and always answers
/// `false`. Logins for unknown accounts cost the same as a wrong password.
pub fn verify_dummy_password(password: &str) -> bool {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(password, hash);
    }
    false
}
