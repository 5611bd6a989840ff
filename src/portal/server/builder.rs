// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket server builder
//!
//! This module provides the function that assembles the Rocket instance
//! with all routes and managed state.

use log::debug;
use rocket::figment::Figment;
use rocket::routes;
use rocket::{Build, Rocket};
use std::sync::Arc;

use super::handlers::*;
use crate::config::Config;
use crate::portal::auth::handlers::{
    auth_error_page, callback_github, login_page, session_info, signin_demo, signin_github,
    signout, signout_post,
};
use crate::portal::auth::{GitHubClient, SessionIssuer};

/// Build a configured Rocket server instance
///
/// This function creates and configures a Rocket server instance with all
/// routes and state management for the documentation portal.
///
/// ### Parameters
///
/// * `figment` - The Rocket configuration figment containing server settings
/// * `config` - The application configuration
///
/// ### Returns
///
/// A configured Rocket instance ready to be launched
///
/// ### Panics
///
/// This function will exit the process if the identity-provider HTTP client
/// cannot be constructed.
///
/// ### Example
///
/// ```no_run
/// use rocket::figment::Figment;
/// use std::sync::Arc;
/// use cloud_native_docs::{config::Config, portal::server};
///
/// async fn example() {
///     let figment = Figment::from(rocket::Config::default());
///     let config = Arc::new(Config::default());
///     let rocket = server::build_rocket(figment, config).await;
///     // Launch the server
///     // rocket.launch().await.expect("Failed to launch");
/// }
/// ```
pub async fn build_rocket(figment: Figment, config: Arc<Config>) -> Rocket<Build> {
    let session_issuer = SessionIssuer::from_config(&config);

    let github = match GitHubClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to initialize identity-provider client: {}", e);
            std::process::exit(1);
        }
    };

    if config.auth.organization.is_none() {
        debug!("No organization configured, every authenticated identity is authorized");
    }

    rocket::custom(figment)
        .mount(
            "/",
            routes![
                favicon,
                assets,
                docs,
                gatekeeper_redirect,
                login_page,
                signin_github,
                callback_github,
                signin_demo,
                signout,
                signout_post,
                session_info,
                auth_error_page,
            ],
        )
        .manage(session_issuer)
        .manage(github)
        .manage(config)
}
