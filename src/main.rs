// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the Cloud Native Docs portal server
use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use cloud_native_docs::config::{utils::output_config_schema, Config};
use cloud_native_docs::portal::server::start_server;

/// Authenticated documentation portal with GitHub sign-in
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Web server port (default: 8080)
    #[arg(short = 'p', long)]
    web_port: Option<u16>,

    /// Web server address (default: 127.0.0.1)
    #[arg(short = 'w', long)]
    web_address: Option<String>,

    /// Secret for session token signing
    #[arg(long)]
    signing_secret: Option<String>,

    /// GitHub organization whose members may sign in
    #[arg(long)]
    organization: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a configuration to validate and exit
    #[arg(long)]
    validate_config: Option<PathBuf>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[rocket::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if args.quiet {
        builder.filter_level(log::LevelFilter::Off);
    }
    builder.init();

    if args.show_config_schema {
        output_config_schema()?;
        return Ok(());
    }

    if let Some(path) = args.validate_config {
        Config::from_file(&path)?;
        println!("Configuration file {} is valid", path.display());
        return Ok(());
    }

    let config_path = args.config.unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;
    config.apply_env();
    config.apply_args(
        args.web_port,
        args.web_address,
        args.signing_secret,
        args.organization,
    );

    info!(
        "Starting documentation portal on {}:{}",
        config.server.address, config.server.port
    );
    start_server(Arc::new(config)).await
}
