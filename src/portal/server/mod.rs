// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web server assembly and launch
//!
//! This module builds the Rocket figment from the application configuration
//! (network binding, TLS material, cookie secret) and launches the portal.

pub mod builder;
pub mod handlers;

pub use builder::build_rocket;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use log::{debug, info};
use rocket::config::LogLevel;
use rocket::data::{Limits, ToByteUnit};
use std::sync::Arc;

use crate::config::Config;

/// Start the portal web server
///
/// Builds the Rocket configuration from the application configuration,
/// including address, port, and optional TLS settings, then launches the
/// server and blocks until it shuts down.
///
/// # Errors
///
/// This function can fail if:
/// * TLS certificate decoding fails
/// * The server fails to bind to the specified address/port
/// * The Rocket server fails to initialize for any other reason
pub async fn start_server(config: Arc<Config>) -> Result<()> {
    let mut figment = rocket::Config::figment()
        .merge(("ident", config.server.name.clone()))
        .merge(("limits", Limits::new().limit("forms", 64.kibibytes())))
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port))
        .merge(("log_level", LogLevel::Normal))
        .merge(("secret_key", config.server.session_secret.clone()));

    // Configure TLS if certificates are provided
    if let (Some(cert), Some(key)) = (&config.server.cert, &config.server.key) {
        debug!("SSL certificates found in configuration, enabling TLS");

        // Decode base64 certificates
        let cert_data = BASE64_STANDARD.decode(cert)?;
        let key_data = BASE64_STANDARD.decode(key)?;

        figment = figment
            .merge(("tls.certs", cert_data))
            .merge(("tls.key", key_data));

        info!("TLS enabled for web server");
    }

    let rocket = build_rocket(figment, config).await;
    let ignited = rocket.ignite().await?;
    let _finished = ignited.launch().await?;
    Ok(())
}
