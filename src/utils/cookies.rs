use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as TimeDuration;

use crate::routes::auth::issuer::{CredentialIssuer, TokenPair};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

pub fn session_cookie(
    name: &'static str,
    value: String,
    max_age: chrono::Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(TimeDuration::seconds(max_age.num_seconds()))
        .build()
}

/// A blank cookie with `Max-Age=0`, carrying the same attributes as the live one
/// so the browser replaces it.
pub fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(TimeDuration::seconds(0))
        .build()
}

/// Adds both session cookies, each living as long as its token.
pub fn set_session_cookies(
    jar: CookieJar,
    pair: TokenPair,
    issuer: &CredentialIssuer,
    secure: bool,
) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_COOKIE,
        pair.access_token,
        issuer.access_ttl(),
        secure,
    ))
    .add(session_cookie(
        REFRESH_COOKIE,
        pair.refresh_token,
        issuer.refresh_ttl(),
        secure,
    ))
}

pub fn clear_session_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(expired_cookie(ACCESS_COOKIE, secure))
        .add(expired_cookie(REFRESH_COOKIE, secure))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let rendered =
            session_cookie(ACCESS_COOKIE, "abc".into(), chrono::Duration::minutes(15), true)
                .to_string();
        assert!(rendered.starts_with("accessToken=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Strict"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Max-Age=900"));
    }

    #[test]
    fn insecure_cookie_omits_secure_flag() {
        let rendered =
            session_cookie(REFRESH_COOKIE, "abc".into(), chrono::Duration::days(7), false)
                .to_string();
        assert!(!rendered.contains("Secure"));
        assert!(rendered.contains("Max-Age=604800"));
    }
}
