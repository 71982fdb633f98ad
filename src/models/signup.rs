use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize, Serialize)]
pub struct SignupPayload {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignupPayload {
    /// Trims the name and lower-cases the email in place.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = normalize_email(&self.email);
    }

    /// Returns the first validation failure as a user-facing message.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("Name is required");
        }
        if !looks_like_email(&self.email) {
            return Err("Please fill a valid email address");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err("Password must be at least 8 characters");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2 && !host.ends_with('.'),
        None => false,
    }
}
