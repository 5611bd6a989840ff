// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Authentication endpoint handlers
//!
//! This module contains the Rocket route handlers for the sign-in and
//! sign-out entry points: the login page, the GitHub OAuth handshake
//! (start + callback), the development demo credential, the session JSON
//! endpoint and the error page.
//!
//! Every sign-in failure is caught here and turned into a redirect to
//! `/auth/error?error=<code>`; nothing in this module panics on bad input.

use handlebars::Handlebars;
use log::{debug, info, warn};
use rocket::form::{Form, FromForm};
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, post, uri, State};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::config::Config;
use crate::portal::request_guard::ConnectionInfo;

use super::cookies::{
    self, clear_handshake_cookies, clear_session_cookies, ensure_csrf_token, verify_csrf_token,
    CALLBACK_COOKIE, PKCE_COOKIE, STATE_COOKIE,
};
use super::error::{ErrorCode, SigninError};
use super::github::{GitHubClient, Membership};
use super::guards::SessionUser;
use super::pkce;
use super::session::{SessionIdentity, SessionIssuer};
use super::validate_demo;
use rocket::http::CookieJar;

/// Query parameters accepted by the login page.
#[derive(FromForm, Debug)]
pub struct LoginQuery {
    #[field(name = "callbackUrl")]
    pub callback_url: Option<String>,
    pub error: Option<String>,
}

/// Form data posted by the sign-in buttons.
#[derive(FromForm, Debug)]
pub struct SigninForm {
    pub csrf_token: String,
    #[field(name = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// Form data posted by the demo sign-in form.
#[derive(FromForm, Debug)]
pub struct DemoSigninForm {
    pub username: String,
    pub password: Option<String>,
    pub csrf_token: String,
    #[field(name = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// Query parameters delivered by the provider to the OAuth callback.
#[derive(FromForm, Debug)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Query parameters accepted by the error page.
#[derive(FromForm, Debug)]
pub struct ErrorQuery {
    pub error: Option<String>,
}

/// Only same-origin relative paths are honored as post-login destinations.
fn sanitize_callback_url(candidate: Option<&str>) -> String {
    match candidate {
        Some(url) if url.starts_with('/') && !url.starts_with("//") => url.to_string(),
        Some(other) => {
            debug!("Discarding non-relative callbackUrl: {}", other);
            "/".to_string()
        }
        None => "/".to_string(),
    }
}

fn error_redirect(code: ErrorCode) -> Redirect {
    Redirect::to(format!("/auth/error?error={}", code.as_str()))
}

/// Render the login page template
fn render_login_page(
    csrf_token: &str,
    callback_url: &str,
    demo_enabled: bool,
    error_msg: Option<&str>,
) -> String {
    let mut handlebars = Handlebars::new();

    handlebars
        .register_template_string("login", include_str!("../../../resources/forms/login.hbs"))
        .expect("Failed to register login template");

    let data = json!({
        "csrf_token": csrf_token,
        "callback_url": callback_url,
        "demo_enabled": demo_enabled,
        "error_msg": error_msg,
    });

    handlebars
        .render("login", &data)
        .expect("Failed to render login template")
}

/// Render the authentication error page template
fn render_error_page(code: Option<ErrorCode>) -> String {
    let mut handlebars = Handlebars::new();

    handlebars
        .register_template_string("error", include_str!("../../../resources/forms/error.hbs"))
        .expect("Failed to register error template");

    let data = json!({
        "code": code.map(|c| c.as_str()),
        "message": code.map_or(ErrorCode::default_message(), |c| c.message()),
    });

    handlebars
        .render("error", &data)
        .expect("Failed to render error template")
}

/// The public login page
///
/// Shows the GitHub sign-in button (and the demo form when the demo
/// provider is enabled). An already-authenticated visitor is sent straight
/// to the requested destination instead of seeing the form again.
#[get("/login?<q..>")]
pub fn login_page(
    q: LoginQuery,
    user: Option<SessionUser>,
    config: &State<Arc<Config>>,
    cookies: &CookieJar<'_>,
) -> Result<RawHtml<String>, Redirect> {
    let callback_url = sanitize_callback_url(q.callback_url.as_deref());

    if user.is_some() {
        debug!("Already authenticated, skipping login page");
        return Err(Redirect::to(callback_url));
    }

    let csrf_token = ensure_csrf_token(cookies);
    let error_msg = q
        .error
        .as_deref()
        .map(|code| ErrorCode::parse(code).map_or(ErrorCode::default_message(), |c| c.message()));

    Ok(RawHtml(render_login_page(
        &csrf_token,
        &callback_url,
        config.auth.demo.enabled,
        error_msg,
    )))
}

/// Start the GitHub OAuth handshake
///
/// Generates the `state` parameter and the PKCE verifier/challenge pair,
/// stores them (plus the requested destination) in short-lived private
/// cookies, and redirects the browser to the provider's authorization
/// endpoint.
#[post("/api/auth/signin/github", data = "<form>")]
pub fn signin_github(
    form: Form<SigninForm>,
    github: &State<GitHubClient>,
    cookies: &CookieJar<'_>,
    conn: ConnectionInfo,
) -> Redirect {
    if !github.is_configured() {
        warn!("GitHub sign-in attempted without configured OAuth client");
        return error_redirect(ErrorCode::Configuration);
    }

    if !verify_csrf_token(cookies, &form.csrf_token) {
        warn!("CSRF token mismatch on GitHub sign-in");
        return error_redirect(SigninError::CsrfMismatch.code());
    }

    let state = pkce::generate_state();
    let verifier = pkce::generate_code_verifier();
    let challenge = pkce::generate_code_challenge(&verifier);
    let redirect_uri = format!("{}/api/auth/callback/github", conn.base_url);

    let authorize_url = match github.authorization_url(&redirect_uri, &state, &challenge) {
        Ok(url) => url,
        Err(e) => {
            warn!("Failed to build authorization URL: {}", e);
            return error_redirect(ErrorCode::Configuration);
        }
    };

    cookies.add_private(cookies::handshake_cookie(STATE_COOKIE, state));
    cookies.add_private(cookies::handshake_cookie(PKCE_COOKIE, verifier));
    cookies.add_private(cookies::handshake_cookie(
        CALLBACK_COOKIE,
        sanitize_callback_url(form.callback_url.as_deref()),
    ));

    Redirect::to(authorize_url)
}

/// Run the OAuth callback steps, stopping at the first failure.
async fn complete_github_signin(
    q: &CallbackQuery,
    github: &GitHubClient,
    issuer: &SessionIssuer,
    cookies: &CookieJar<'_>,
    redirect_uri: &str,
) -> Result<Redirect, SigninError> {
    if let Some(error) = &q.error {
        return Err(SigninError::ProviderError(error.clone()));
    }

    let expected_state = cookies
        .get_private(STATE_COOKIE)
        .ok_or(SigninError::StateMismatch)?;
    match &q.state {
        Some(state) if state == expected_state.value() => {}
        _ => return Err(SigninError::StateMismatch),
    }

    let verifier = cookies
        .get_private(PKCE_COOKIE)
        .ok_or(SigninError::StateMismatch)?;

    let code = q
        .code
        .as_deref()
        .ok_or_else(|| SigninError::ProviderError("missing authorization code".to_string()))?;

    let access_token = github
        .exchange_code(code, redirect_uri, verifier.value())
        .await
        .map_err(SigninError::TokenExchange)?;

    let user = github
        .fetch_user(&access_token)
        .await
        .map_err(SigninError::ProfileFetch)?;

    // Authorization check, computed once per sign-in
    let org_member = match github.organization() {
        Some(_) => match github.organization_membership(&user.login, &access_token).await {
            Membership::Member => Some(true),
            Membership::NotMember => return Err(SigninError::AccessDenied(user.login)),
        },
        None => None,
    };

    let identity = SessionIdentity {
        sub: format!("github:{}", user.id),
        name: user.name.clone().or_else(|| Some(user.login.clone())),
        provider: github.provider().to_string(),
        access_token: Some(access_token),
        org_member,
    };

    let token = issuer
        .issue(identity)
        .map_err(|e| SigninError::Configuration(format!("session signing failed: {}", e)))?;

    info!("GitHub sign-in completed for {}", user.login);
    cookies.add(cookies::session_cookie(token, issuer.duration()));

    let destination = cookies
        .get_private(CALLBACK_COOKIE)
        .map(|c| c.value().to_string());
    clear_handshake_cookies(cookies);

    Ok(Redirect::to(sanitize_callback_url(destination.as_deref())))
}

/// OAuth callback endpoint
///
/// Verifies the `state` parameter against the handshake cookie, exchanges
/// the authorization code, fetches the identity, runs the authorization
/// check and mints the session. Any failure redirects to the error page
/// with the matching code; no session cookie is set on failure.
#[get("/api/auth/callback/github?<q..>")]
pub async fn callback_github(
    q: CallbackQuery,
    github: &State<GitHubClient>,
    issuer: &State<SessionIssuer>,
    cookies: &CookieJar<'_>,
    conn: ConnectionInfo,
) -> Redirect {
    let redirect_uri = format!("{}/api/auth/callback/github", conn.base_url);

    match complete_github_signin(&q, github, issuer, cookies, &redirect_uri).await {
        Ok(redirect) => redirect,
        Err(e) => {
            warn!("GitHub sign-in failed: {}", e);
            clear_handshake_cookies(cookies);
            error_redirect(e.code())
        }
    }
}

/// Demo credential sign-in (development builds)
///
/// Issues a session for the fixed demo identity when the demo provider is
/// enabled and the presented credentials match the configuration. Disabled
/// or mismatched attempts fail with `CredentialsSignin`.
#[post("/api/auth/signin/demo", data = "<form>")]
pub fn signin_demo(
    form: Form<DemoSigninForm>,
    config: &State<Arc<Config>>,
    issuer: &State<SessionIssuer>,
    cookies: &CookieJar<'_>,
) -> Redirect {
    if !verify_csrf_token(cookies, &form.csrf_token) {
        warn!("CSRF token mismatch on demo sign-in");
        return error_redirect(ErrorCode::CredentialsSignin);
    }

    if !validate_demo(&config.auth.demo, &form.username, form.password.as_deref()) {
        return error_redirect(ErrorCode::CredentialsSignin);
    }

    let identity = SessionIdentity {
        sub: config.auth.demo.user.clone(),
        name: Some(config.auth.demo.name.clone()),
        provider: "demo".to_string(),
        access_token: None,
        org_member: None,
    };

    let token = match issuer.issue(identity) {
        Ok(token) => token,
        Err(e) => {
            warn!("Session signing failed for demo identity: {}", e);
            return error_redirect(ErrorCode::Configuration);
        }
    };

    info!("Demo sign-in completed for {}", config.auth.demo.user);
    cookies.add(cookies::session_cookie(token, issuer.duration()));
    Redirect::to(sanitize_callback_url(form.callback_url.as_deref()))
}

/// Terminate the current session.
///
/// Removing cookies that were never set is a no-op, so signing out while
/// anonymous still just redirects to the login page.
fn terminate_session(cookies: &CookieJar<'_>) -> Redirect {
    clear_session_cookies(cookies);
    Redirect::to(uri!("/login"))
}

/// Sign-out entry point (link form)
#[get("/api/auth/signout")]
pub fn signout(cookies: &CookieJar<'_>) -> Redirect {
    terminate_session(cookies)
}

/// Sign-out entry point (form post)
#[post("/api/auth/signout")]
pub fn signout_post(cookies: &CookieJar<'_>) -> Redirect {
    terminate_session(cookies)
}

/// Session user info as reported by `/api/auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionUserInfo {
    pub sub: String,
    pub name: String,
    pub provider: String,
}

/// Response body of `/api/auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<SessionUserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

/// Report the current session as JSON
///
/// Answers `{"user": null}` for anonymous visitors; the endpoint itself is
/// public so browser scripts can probe authentication state without
/// triggering the login redirect.
#[get("/api/auth/session")]
pub fn session_info(user: Option<SessionUser>) -> Json<SessionResponse> {
    match user {
        Some(user) => {
            let expires = chrono::DateTime::from_timestamp(user.0.exp, 0).map(|t| t.to_rfc3339());
            Json(SessionResponse {
                user: Some(SessionUserInfo {
                    sub: user.0.sub.clone(),
                    name: user.display_name().to_string(),
                    provider: user.0.provider.clone(),
                }),
                expires,
            })
        }
        None => Json(SessionResponse {
            user: None,
            expires: None,
        }),
    }
}

/// Authentication error page
///
/// Maps the `error` query parameter onto the fixed message table and
/// returns the visitor to the login page after a few seconds.
#[get("/auth/error?<q..>")]
pub fn auth_error_page(q: ErrorQuery) -> RawHtml<String> {
    let code = q.error.as_deref().and_then(ErrorCode::parse);
    RawHtml(render_error_page(code))
}
