// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web portal for the documentation site
//!
//! This module contains everything served over HTTP: the access-control
//! gatekeeper, the authentication flows (GitHub OAuth and the development
//! demo credential), and the embedded documentation pages.
//!
//! A visitor moves through four states: anonymous, authenticating,
//! authenticated, denied. Sign-in moves an anonymous visitor to
//! authenticating and, depending on the issuer outcome, to authenticated or
//! denied; sign-out and token expiry return an authenticated visitor to
//! anonymous; a denied visitor is sent back to the login page and may retry.

pub mod auth;
pub mod gatekeeper;
pub mod request_guard;
pub mod server;
