//! Cookie transport for identity tokens
//!
//! The server keeps no session state: the signed token itself lives in an
//! HTTP-only cookie and is re-verified on every request.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Name of the cookie carrying the identity token
pub const TOKEN_COOKIE: &str = "token";

/// Cookie settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cookie lifetime in seconds, matching the token validity window
    pub max_age_secs: u64,
    /// Mark the cookie `Secure` (HTTPS only)
    pub secure: bool,
}

impl SessionConfig {
    /// Bind a freshly issued token to the client
    pub fn set_token(&self, jar: CookieJar, token: String) -> CookieJar {
        let cookie = Cookie::build((TOKEN_COOKIE, token))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::seconds(
                i64::try_from(self.max_age_secs).unwrap_or(i64::MAX),
            ))
            .build();

        jar.add(cookie)
    }

    /// Discard the client-held token
    pub fn clear_token(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(TOKEN_COOKIE).path("/").build())
    }
}

/// Token presented by the client, if any
pub fn token_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}
