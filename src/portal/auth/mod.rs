// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Authentication for the documentation portal
//!
//! This module implements the session lifecycle: issuing signed session
//! tokens after a successful GitHub OAuth exchange (or a demo sign-in in
//! development builds), verifying them on every protected request, and
//! terminating them on sign-out.

pub mod cookies;
pub mod error;
pub mod github;
pub mod guards;
pub mod handlers;
pub mod pkce;
pub mod session;

pub use error::{ErrorCode, SigninError};
pub use github::{GitHubClient, Membership};
pub use guards::SessionUser;
pub use session::{SessionClaims, SessionIssuer};

use base64::Engine;
use log::debug;

use crate::config::DemoConfig;

/// Validate a demo sign-in attempt against the configured demo credential.
///
/// The username must match exactly. When a password hash is configured the
/// presented password is verified against it; the stored hash is a
/// base64-wrapped Unix crypt string (`openssl passwd -5 <password> | base64 -w0`).
/// A disabled demo provider rejects every attempt.
pub fn validate_demo(demo: &DemoConfig, username: &str, password: Option<&str>) -> bool {
    if !demo.enabled {
        debug!("Demo sign-in attempted while the demo provider is disabled");
        return false;
    }
    if username != demo.user {
        return false;
    }

    let Some(encoded_hash) = &demo.pass else {
        // No hash configured, the username alone is the credential
        return true;
    };

    let Ok(hash_bytes) = base64::engine::general_purpose::STANDARD.decode(encoded_hash) else {
        return false;
    };
    // If last byte is \n, remove it
    let hash_bytes = if hash_bytes.last() == Some(&b'\n') {
        &hash_bytes[..hash_bytes.len() - 1]
    } else {
        &hash_bytes[..]
    };
    // if last byte is \r, remove it
    let hash_bytes = if hash_bytes.last() == Some(&b'\r') {
        &hash_bytes[..hash_bytes.len() - 1]
    } else {
        hash_bytes
    };
    let Ok(stored_hash) = String::from_utf8(hash_bytes.to_vec()) else {
        return false;
    };

    match password {
        Some(password) => pwhash::unix::verify(password, &stored_hash),
        None => false,
    }
}
