// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use base64::Engine;
use log::debug;

use super::Config;

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line. It outputs the full JSON schema for the configuration
/// to stdout, formatted for readability.
///
/// # Example
///
/// ```bash
/// ./cloud_native_docs --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    // Load the schema from the embedded string
    let schema_str = include_str!("../../resources/config.schema.json");

    // Parse the schema to a JSON Value to pretty-format it
    let schema: serde_json::Value =
        serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    // Special cases
    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against additional rules that aren't covered by the JSON schema.
///
/// This function performs deeper validation checks that can't be easily
/// expressed in a JSON schema, such as verifying that certificate and key
/// pairs are both present, validating base64 encoding of cryptographic
/// material, and checking the demo credential hash format.
///
/// # Validation Rules
///
/// - **SSL Configuration**: Ensures that if a certificate is provided, a key
///   is also provided (and vice versa), and that both decode as base64
/// - **Port Range**: Ensures the server port is within a valid range (1-65534)
/// - **IP Address Format**: Checks if the provided address is a valid IP
///   address or special value
/// - **Demo Credential**: Validates that a configured password hash is
///   properly base64-encoded and follows the expected format from
///   `openssl passwd`
/// - **Organization**: A configured organization must not be empty
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    // Validate SSL certificates
    if let Some(cert) = &config.server.cert {
        if config.server.key.is_none() {
            anyhow::bail!("SSL certificate provided without a key");
        }

        let _ = base64::engine::general_purpose::STANDARD
            .decode(cert)
            .context("SSL certificate is not valid base64")?;
    }

    if let Some(key) = &config.server.key {
        if config.server.cert.is_none() {
            anyhow::bail!("SSL key provided without a certificate");
        }

        let _ = base64::engine::general_purpose::STANDARD
            .decode(key)
            .context("SSL key is not valid base64")?;
    }

    // Check value ranges for certain fields
    if config.server.port < 1 || config.server.port > 65534 {
        anyhow::bail!("Invalid port number: {}", config.server.port);
    }

    // Check if the address is in a valid format
    if !is_valid_ip_address(&config.server.address) {
        debug!(
            "Potentially invalid address format: {}",
            config.server.address
        );
        // Just issue a warning but don't block
    }

    // A configured organization must have a usable name
    if let Some(org) = &config.auth.organization {
        if org.trim().is_empty() {
            anyhow::bail!("Organization name must not be empty");
        }
    }

    // The demo password hash, when present, should be a valid base64 string
    // whose decoded value conforms to the openssl passwd format
    if let Some(pass) = &config.auth.demo.pass {
        let decoded_pass = base64::engine::general_purpose::STANDARD
            .decode(pass)
            .context("Demo password is not valid base64")?;
        // Password hash should start with $1$, $5$, $6$, $apr1$
        // Next contains the salt
        // The rest is the hash
        if !decoded_pass.starts_with(b"$1$")
            && !decoded_pass.starts_with(b"$5$")
            && !decoded_pass.starts_with(b"$6$")
            && !decoded_pass.starts_with(b"$apr1$")
        {
            anyhow::bail!("Demo password is not a valid hash, you should use openssl passwd -5 <password> | base64 -w0");
        }
    }

    Ok(())
}
