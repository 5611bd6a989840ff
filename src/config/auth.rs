// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Authentication and authorization configuration
//!
//! This module defines the settings that control session token issuance,
//! organization-based authorization and the development demo credential.

use serde::{Deserialize, Serialize};

fn default_session_duration() -> Option<i64> {
    Some(86400)
}

fn default_signing_secret() -> String {
    "my-super-secret-session-key-for-docs-portal".to_string()
}

/// Demo credential available for local development.
///
/// The demo provider mirrors the production sign-in flow without reaching
/// out to GitHub: a fixed username (optionally protected by a password
/// hash) yields a regular session for a fixed identity. It is enabled by
/// default only in debug builds.
///
/// # Example
///
/// ```
/// use cloud_native_docs::config::DemoConfig;
///
/// let demo = DemoConfig {
///     enabled: true,
///     user: "demo".to_string(),
///     name: "Demo User".to_string(),
///     pass: None,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Whether the demo sign-in entry point accepts credentials.
    #[serde(default = "default_demo_enabled")]
    pub enabled: bool,

    /// The username accepted by the demo provider.
    #[serde(default = "default_demo_user")]
    pub user: String,

    /// Display name of the issued demo identity.
    #[serde(default = "default_demo_name")]
    pub name: String,

    /// Optional Base64-encoded password hash
    ///
    /// This should be created using: `openssl passwd -5 <password> | base64 -w0`.
    /// When unset, the demo provider accepts the username alone.
    #[serde(default)]
    pub pass: Option<String>,
}

fn default_demo_enabled() -> bool {
    cfg!(debug_assertions)
}

fn default_demo_user() -> String {
    "demo".to_string()
}

fn default_demo_name() -> String {
    "Demo User".to_string()
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: default_demo_enabled(),
            user: default_demo_user(),
            name: default_demo_name(),
            pass: None,
        }
    }
}

/// Configuration for session issuance and authorization.
///
/// # Example
///
/// ```rust
/// use cloud_native_docs::config::{AuthConfig, DemoConfig};
///
/// let auth_config = AuthConfig {
///     signing_secret: "a-strong-random-secret".to_string(),
///     session_duration: Some(86400), // Session lifetime in seconds
///     organization: Some("cloud-native-team".to_string()),
///     demo: DemoConfig::default(),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for HMAC-based session token signing and verification.
    ///
    /// The default value is a placeholder and should be replaced with a
    /// strong, randomly generated key in production environments. The key
    /// should be at least 256 bits (32 bytes) long for security.
    #[serde(default = "default_signing_secret")]
    pub signing_secret: String,

    /// Lifetime of issued session tokens in seconds.
    #[serde(default = "default_session_duration")]
    pub session_duration: Option<i64>,

    /// GitHub organization whose members may sign in.
    ///
    /// When unset, every authenticated GitHub identity is authorized.
    #[serde(default)]
    pub organization: Option<String>,

    /// Demo credential for development builds.
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: default_signing_secret(),
            session_duration: default_session_duration(),
            organization: None,
            demo: DemoConfig::default(),
        }
    }
}
