// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Cookie construction for the session and the OAuth handshake
//!
//! All cookies are http-only, `SameSite=Lax`, path `/`. The session cookie
//! carries the signed token and lives as long as the token itself; the
//! handshake cookies (state, PKCE verifier, callback URL) are private
//! (encrypted) and capped at 24 hours; the CSRF token is a private session
//! cookie.

use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::time::Duration;

use super::pkce;

/// Cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "docs_session";
/// Private cookie holding the CSRF double-submit token.
pub const CSRF_COOKIE: &str = "docs_csrf";
/// Private cookie holding the OAuth `state` parameter during the handshake.
pub const STATE_COOKIE: &str = "docs_oauth_state";
/// Private cookie holding the PKCE code verifier during the handshake.
pub const PKCE_COOKIE: &str = "docs_pkce_verifier";
/// Private cookie holding the post-login destination during the handshake.
pub const CALLBACK_COOKIE: &str = "docs_callback_url";

/// Lifetime cap for the transient handshake cookies.
const HANDSHAKE_MAX_AGE: Duration = Duration::hours(24);

fn base_cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie
}

/// Build the session cookie for a freshly issued token.
pub fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    let mut cookie = base_cookie(SESSION_COOKIE, token);
    cookie.set_max_age(Duration::seconds(max_age_seconds));
    cookie
}

/// Build one of the transient handshake cookies.
pub fn handshake_cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = base_cookie(name, value);
    cookie.set_max_age(HANDSHAKE_MAX_AGE);
    cookie
}

/// Return the CSRF token, issuing the cookie when absent.
///
/// The token is rendered into sign-in forms as a hidden field and compared
/// against the cookie on submission (double-submit pattern).
pub fn ensure_csrf_token(cookies: &CookieJar<'_>) -> String {
    if let Some(cookie) = cookies.get_private(CSRF_COOKIE) {
        return cookie.value().to_string();
    }
    let token = pkce::generate_csrf_token();
    cookies.add_private(base_cookie(CSRF_COOKIE, token.clone()));
    token
}

/// Check a presented CSRF token against the cookie.
pub fn verify_csrf_token(cookies: &CookieJar<'_>, presented: &str) -> bool {
    match cookies.get_private(CSRF_COOKIE) {
        Some(cookie) => !presented.is_empty() && cookie.value() == presented,
        None => false,
    }
}

/// Remove the transient handshake cookies once the flow concludes.
pub fn clear_handshake_cookies(cookies: &CookieJar<'_>) {
    for name in [STATE_COOKIE, PKCE_COOKIE, CALLBACK_COOKIE] {
        let mut cookie = Cookie::new(name, "");
        cookie.set_path("/");
        cookies.remove_private(cookie);
    }
}

/// Remove every session-related cookie.
///
/// Used by the sign-out entry point; removing cookies that were never set
/// is harmless, which keeps sign-out idempotent.
pub fn clear_session_cookies(cookies: &CookieJar<'_>) {
    let mut session = Cookie::new(SESSION_COOKIE, "");
    session.set_path("/");
    cookies.remove(session);

    let mut csrf = Cookie::new(CSRF_COOKIE, "");
    csrf.set_path("/");
    cookies.remove_private(csrf);

    clear_handshake_cookies(cookies);
}
