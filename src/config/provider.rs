// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration for the GitHub OAuth provider
//!
//! The endpoint URLs default to the public GitHub service and are only
//! overridden in tests or for GitHub Enterprise deployments.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    /// Provider identifier, reported in issued session claims.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// OAuth client id of the GitHub application.
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret of the GitHub application.
    #[serde(default)]
    pub client_secret: String,

    /// Authorization endpoint presented to the browser.
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    /// Token exchange endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Base URL of the REST API (user profile and membership lookups).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Scopes requested during authorization.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Timeout in seconds for every call to the provider.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_provider() -> String {
    "github".to_string()
}

fn default_authorize_url() -> String {
    "https://github.com/login/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_scope() -> String {
    "read:user user:email".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            client_id: String::new(),
            client_secret: String::new(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            scope: default_scope(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}
