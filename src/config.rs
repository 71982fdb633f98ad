use std::{env, net::SocketAddr};

use chrono::Duration;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_JWT_ISSUER: &str = "storefront";
const DEFAULT_ACCESS_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
/// Ten years. Anything longer cannot be added to the current time safely.
const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

pub struct Config {
    pub database_url: String,
    pub frontend_origin: String,
    pub bind_addr: SocketAddr,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    /// Sets the `Secure` attribute on session cookies.
    pub auth_cookie_secure: bool,
    pub jwt_issuer: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub rate_limit_auth_seconds: u64,
    pub rate_limit_auth_burst: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("frontend_origin", &self.frontend_origin)
            .field("bind_addr", &self.bind_addr)
            .field("auth_cookie_secure", &self.auth_cookie_secure)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;
        let access_ttl = parse_or(&lookup, "ACCESS_TOKEN_TTL_SECONDS", Some(DEFAULT_ACCESS_TTL_SECONDS))?;
        let refresh_ttl =
            parse_or(&lookup, "REFRESH_TOKEN_TTL_SECONDS", Some(DEFAULT_REFRESH_TTL_SECONDS))?;

        if access_ttl <= 0 {
            return Err(ConfigError::Invalid {
                name: "ACCESS_TOKEN_TTL_SECONDS",
                value: access_ttl.to_string(),
            });
        }
        if refresh_ttl <= access_ttl {
            return Err(ConfigError::Invalid {
                name: "REFRESH_TOKEN_TTL_SECONDS",
                value: refresh_ttl.to_string(),
            });
        }

        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            frontend_origin: lookup("FRONTEND_ORIGIN")
                .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string()),
            bind_addr,
            access_token_secret: required("ACCESS_TOKEN_SECRET")?,
            refresh_token_secret: required("REFRESH_TOKEN_SECRET")?,
            auth_cookie_secure: app_env.eq_ignore_ascii_case("production"),
            jwt_issuer: lookup("JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
            access_token_ttl: ttl("ACCESS_TOKEN_TTL_SECONDS", access_ttl)?,
            refresh_token_ttl: ttl("REFRESH_TOKEN_TTL_SECONDS", refresh_ttl)?,
            rate_limit_auth_seconds: parse_or(&lookup, "RATE_LIMITER_AUTH_SECONDS", Some(1))?,
            rate_limit_auth_burst: parse_or(&lookup, "RATE_LIMITER_AUTH_BURST", Some(10))?,
        })
    }
}

fn ttl(name: &'static str, seconds: i64) -> Result<Duration, ConfigError> {
    Some(seconds)
        .filter(|seconds| *seconds <= MAX_TTL_SECONDS)
        .and_then(Duration::try_seconds)
        .ok_or(ConfigError::Invalid {
            name,
            value: seconds.to_string(),
        })
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}
