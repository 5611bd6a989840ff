// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the documentation portal
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings for the portal. The configuration is backed by a
//! YAML file and validated against a JSON schema for robustness.
//!
//! ## Configuration Structure
//!
//! The configuration is organized as a nested structure with sections:
//! - `server`: Settings for the web server (binding, TLS, cookie secret)
//! - `auth`: Session signing, session lifetime, organization gating and the
//!   development demo credential
//! - `provider`: The GitHub OAuth application used for sign-in
//!
//! ## Usage
//!
//! ```no_run
//! use cloud_native_docs::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply environment and command line overrides if needed
//! config.apply_env();
//! config.apply_args(Some(8081), Some("0.0.0.0".to_string()), None, None);
//!
//! // Access configuration values
//! println!("Server port: {}", config.server.port);
//! ```

pub mod auth;
pub mod provider;
pub mod server;
pub mod utils;

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

// Re-export all types for public API
pub use auth::{AuthConfig, DemoConfig};
pub use provider::ProviderConfig;
pub use server::ServerConfig;
pub use utils::{is_valid_ip_address, output_config_schema};

/// Root configuration structure for the documentation portal.
///
/// The configuration is deserialized from and serialized to YAML using the
/// serde framework. Before deserialization the raw document is validated
/// against an embedded JSON schema so malformed files are rejected with a
/// useful message (and a sample file is generated for the user to edit).
///
/// Each section uses default values when not explicitly specified in the
/// configuration file, allowing for minimal configuration when custom
/// settings are not required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Settings for the web server component.
    ///
    /// These settings control how the server behaves, including network
    /// binding, TLS material and the cookie encryption secret.
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication and authorization settings.
    ///
    /// This section controls the session token signing secret and lifetime,
    /// the optional GitHub organization that gates sign-in, and the demo
    /// credential available in development builds.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Identity-provider settings for the GitHub OAuth application.
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Creating sample configuration file at {:?}", sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        let sample_config = Self::default();
        sample_config
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        // First step: convert YAML to a generic Value
        let yaml_value: serde_yml::Value = serde_yml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;

        // Convert to JSON Value for validation
        let json_value = serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })?;

        // Load and validate with the schema
        let schema_str = include_str!("../../resources/config.schema.json");
        let schema: serde_json::Value =
            serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        // Validate before deserializing to Config
        debug!("Validating {} configuration against schema", path.display());
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            Self::create_sample_config(path)?;
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        // Now that YAML has been validated, deserialize to Config
        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = match serde_yml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                match Self::create_sample_config(path) {
                    Ok(_) => debug!("Successfully created sample config"),
                    Err(e) => error!("Failed to create sample config: {}", e),
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        // Perform additional specific validations
        if let Err(err) = utils::validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply environment variable overrides.
    ///
    /// Secrets are usually provided through the environment rather than the
    /// configuration file. The recognized variables are:
    ///
    /// * `GITHUB_ID` - OAuth client id of the GitHub application
    /// * `GITHUB_SECRET` - OAuth client secret of the GitHub application
    /// * `SESSION_SECRET` - secret used to sign session tokens
    /// * `GITHUB_ORG` - organization whose members may sign in
    pub fn apply_env(&mut self) {
        if let Ok(client_id) = env::var("GITHUB_ID") {
            debug!("Overriding provider client id from environment");
            self.provider.client_id = client_id;
        }
        if let Ok(client_secret) = env::var("GITHUB_SECRET") {
            debug!("Overriding provider client secret from environment");
            self.provider.client_secret = client_secret;
        }
        if let Ok(secret) = env::var("SESSION_SECRET") {
            debug!("Overriding session signing secret from environment");
            self.auth.signing_secret = secret;
        }
        if let Ok(org) = env::var("GITHUB_ORG") {
            debug!("Overriding organization from environment: {}", org);
            self.auth.organization = Some(org);
        }
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided will override the existing
    /// configuration.
    ///
    /// # Parameters
    ///
    /// * `web_port` - TCP port for the web server
    /// * `web_address` - Network address for the web server to bind to
    /// * `signing_secret` - Optional secret for session token signing
    /// * `organization` - Optional GitHub organization gating sign-in
    pub fn apply_args(
        &mut self,
        web_port: Option<u16>,
        web_address: Option<String>,
        signing_secret: Option<String>,
        organization: Option<String>,
    ) {
        if let Some(web_port) = web_port {
            debug!("Overriding port from command line: {}", web_port);
            self.server.port = web_port;
        }

        if let Some(web_address) = web_address {
            debug!("Overriding address from command line: {}", web_address);
            self.server.address = web_address;
        }

        if let Some(secret) = signing_secret {
            debug!("Overriding signing secret from command line");
            self.auth.signing_secret = secret;
        }

        if let Some(org) = organization {
            debug!("Overriding organization from command line: {}", org);
            self.auth.organization = Some(org);
        }
    }
}
