// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Request-time access control
//!
//! Every incoming request path belongs to exactly one of two partitions:
//! public (login, auth endpoints, static assets, favicon) or protected
//! (every documentation page). Public paths are always served; protected
//! paths require a verified session and otherwise redirect to the login
//! page with the original location preserved in the `callbackUrl` query
//! parameter.
//!
//! The decision is pure: nothing here reads cookies or mutates state. The
//! session side of the question is answered by the
//! [`SessionUser`](crate::portal::auth::guards::SessionUser) request guard,
//! whose failure forwards the request to the fallback route that consults
//! [`decide`].

/// Classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable without a session: login, auth endpoints, assets, favicon.
    Public,
    /// Requires a verified session.
    Protected,
}

/// Session state as seen by the gatekeeper.
///
/// A missing cookie, a malformed token, a bad signature and an expired
/// token are all the same thing here: no session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Outcome of the gatekeeper decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the request through to the page handlers.
    Allow,
    /// Send the visitor to the login page, preserving the original location.
    RedirectToLogin { location: String },
}

/// Classify a request path into the public or protected partition.
///
/// The partition is total: every path matches exactly one class, and the
/// public prefixes win on overlap.
pub fn classify(path: &str) -> RouteClass {
    if path == "/login"
        || path == "/favicon.ico"
        || path.starts_with("/auth/")
        || path.starts_with("/api/auth/")
        || path.starts_with("/assets/")
    {
        RouteClass::Public
    } else {
        RouteClass::Protected
    }
}

/// Build the login redirect target for a protected path.
///
/// The original path (with its query string, if any) is carried in the
/// `callbackUrl` parameter so the visitor lands back where they started
/// after signing in.
pub fn login_redirect(original: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", original)
        .finish();
    format!("/login?{}", query)
}

/// Decide what happens to a request.
///
/// Public paths are allowed unconditionally; protected paths are allowed
/// only with a verified session and otherwise redirect to the login page.
pub fn decide(path: &str, session: SessionState) -> Decision {
    match classify(path) {
        RouteClass::Public => Decision::Allow,
        RouteClass::Protected => match session {
            SessionState::Authenticated => Decision::Allow,
            SessionState::Anonymous => Decision::RedirectToLogin {
                location: login_redirect(path),
            },
        },
    }
}
