// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Request guards for session state
//!
//! [`SessionUser`] is the request-time half of the gatekeeper: it reads the
//! session cookie and verifies the token against the managed
//! [`SessionIssuer`]. A missing, malformed, expired or tampered token makes
//! the guard forward, which lets the lower-ranked fallback route issue the
//! login redirect.

use log::debug;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;

use super::cookies::SESSION_COOKIE;
use super::session::{SessionClaims, SessionIssuer};

/// An authenticated visitor, extracted from a verified session cookie.
pub struct SessionUser(pub SessionClaims);

impl SessionUser {
    /// Subject identifier of the session.
    pub fn subject(&self) -> &str {
        &self.0.sub
    }

    /// Display name, falling back to the subject identifier.
    pub fn display_name(&self) -> &str {
        self.0.name.as_deref().unwrap_or(&self.0.sub)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let issuer = match request.guard::<&State<SessionIssuer>>().await {
            Outcome::Success(issuer) => issuer,
            _ => return Outcome::Forward(Status::InternalServerError),
        };

        if let Some(cookie) = request.cookies().get(SESSION_COOKIE) {
            match issuer.verify(cookie.value()) {
                Ok(claims) => {
                    debug!("Session verified for {}", claims.sub);
                    return Outcome::Success(SessionUser(claims));
                }
                Err(e) => {
                    // Invalid is indistinguishable from absent, fail closed
                    debug!("Session cookie rejected: {}", e);
                }
            }
        }
        Outcome::Forward(Status::Unauthorized)
    }
}
