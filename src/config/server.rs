// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web server configuration
//!
//! This module defines the structure for configuring the portal web server.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Configuration for the portal web server.
///
/// This structure contains all settings required for the server component,
/// including network binding parameters, TLS certificate settings, and the
/// secret used to encrypt private cookies.
///
/// ### TLS Configuration
///
/// For secure HTTPS connections, both `cert` and `key` fields must be
/// provided as Base64-encoded PEM files. If either is missing, the server
/// will operate in non-TLS mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The TCP port the server will listen on.
    ///
    /// Valid range is 1-65534. Default value is 8080.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The network address the server will bind to.
    ///
    /// Can be an IPv4/IPv6 address or a hostname. Default is "127.0.0.1".
    /// Use "0.0.0.0" to bind to all IPv4 interfaces.
    #[serde(default = "default_address")]
    pub address: String,

    /// The server name reported in HTTP headers and logs.
    ///
    /// Default is "CloudNativeDocsServer/" followed by the package version.
    #[serde(default = "default_name")]
    pub name: String,

    /// SSL/TLS certificate in PEM format, Base64 encoded.
    ///
    /// If provided, `key` must also be supplied.
    #[serde(default)]
    pub cert: Option<String>,

    /// SSL/TLS private key in PEM format, Base64 encoded.
    ///
    /// If provided, `cert` must also be supplied.
    #[serde(default)]
    pub key: Option<String>,

    /// Session secret key for private (encrypted) cookies.
    ///
    /// Used by the framework to encrypt the CSRF token and the transient
    /// OAuth handshake cookies. A random key is generated when unset, which
    /// means those cookies do not survive a server restart.
    #[serde(default = "default_session_secret")]
    pub session_secret: String,
}

/// Provides the default TCP port (8080) for the web server.
fn default_port() -> u16 {
    8080
}

/// Provides the default network binding address (127.0.0.1).
///
/// This loopback address ensures the server only accepts connections from
/// the local machine, which is secure for development purposes. For
/// production use where remote connections are required, this should be
/// changed to "0.0.0.0" or a specific network interface.
fn default_address() -> String {
    "127.0.0.1".to_string()
}

/// Generates the default server name string based on the current package version.
fn default_name() -> String {
    format!("CloudNativeDocsServer/{}", env!("CARGO_PKG_VERSION"))
}

/// Generate a random session secret key for cookie encryption.
fn default_session_secret() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    let secret: [u8; 32] = rng.random();
    base64::engine::general_purpose::STANDARD.encode(secret)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            address: default_address(),
            name: default_name(),
            cert: None,
            key: None,
            session_secret: default_session_secret(),
        }
    }
}
