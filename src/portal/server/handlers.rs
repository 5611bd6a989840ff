// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Route handlers for the embedded documentation site
//!
//! The compiled documentation pages are embedded in the binary at build
//! time and served from memory. The docs route requires a verified session;
//! when the session guard forwards, the lower-ranked gatekeeper route takes
//! over and redirects to the login page with the original location
//! preserved.

use include_dir::{include_dir, Dir};
use log::debug;
use rocket::get;
use rocket::http::{ContentType, Status};
use rocket::response::Redirect;
use std::path::PathBuf;

use crate::portal::auth::SessionUser;
use crate::portal::gatekeeper::{self, Decision, SessionState};
use crate::portal::request_guard::{RawQueryString, StaticFileResponse};

/// Static directory containing the compiled documentation site
///
/// The files are embedded in the binary, eliminating the need for external
/// file dependencies when deploying the server.
const SITE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/site");

/// Look up an embedded file and wrap it in a response.
fn site_file(path: &str) -> Option<StaticFileResponse> {
    SITE_DIR.get_file(path).map(|file| {
        let content_type = ContentType::from_extension(
            file.path()
                .extension()
                .unwrap_or_default()
                .to_str()
                .unwrap_or(""),
        )
        .unwrap_or(ContentType::Binary);
        StaticFileResponse(file.contents().to_vec(), content_type)
    })
}

/// Resolve a documentation path to an embedded page.
///
/// `/` serves `index.html`; `/docs/intro` resolves through `docs/intro`,
/// `docs/intro.html` and `docs/intro/index.html` in that order, the way the
/// static-site generator lays out its output.
fn resolve_page(path: &str) -> Option<StaticFileResponse> {
    if path.is_empty() {
        return site_file("index.html");
    }
    if let Some(response) = site_file(path) {
        return Some(response);
    }
    if let Some(response) = site_file(&format!("{}.html", path)) {
        return Some(response);
    }
    site_file(&format!("{}/index.html", path))
}

/// Serve the website favicon
///
/// The favicon is public: browsers request it alongside the login page.
#[get("/favicon.ico")]
pub async fn favicon() -> Option<StaticFileResponse> {
    site_file("favicon.ico")
}

/// Serve static assets (stylesheets, scripts, images)
///
/// Assets are public so the login and error pages render correctly for
/// anonymous visitors.
#[get("/assets/<path..>", rank = 2)]
pub async fn assets(path: PathBuf) -> Option<StaticFileResponse> {
    let path = path.to_str().unwrap_or("");
    site_file(&format!("assets/{}", path))
}

/// Serve a documentation page to an authenticated visitor
///
/// The [`SessionUser`] guard verifies the session cookie; on failure the
/// request forwards to [`gatekeeper_redirect`].
#[get("/<path..>", rank = 10)]
pub async fn docs(path: PathBuf, user: SessionUser) -> Option<StaticFileResponse> {
    let path = path.to_str().unwrap_or("");
    debug!("Serving /{} to {}", path, user.subject());
    resolve_page(path)
}

/// Gatekeeper fallback for requests without a verified session
///
/// Protected paths redirect to the login page with the original location in
/// `callbackUrl`. A public path landing here means no public route matched
/// it, which is a plain 404 rather than a login problem.
#[get("/<path..>", rank = 20)]
pub async fn gatekeeper_redirect(
    path: PathBuf,
    raw_query: RawQueryString,
) -> Result<Redirect, Status> {
    let mut original = format!("/{}", path.to_str().unwrap_or(""));
    if !raw_query.as_str().is_empty() {
        original.push('?');
        original.push_str(raw_query.as_str());
    }

    match gatekeeper::decide(&original, SessionState::Anonymous) {
        Decision::RedirectToLogin { location } => {
            debug!("Redirecting anonymous request for {} to login", original);
            Ok(Redirect::to(location))
        }
        Decision::Allow => Err(Status::NotFound),
    }
}
