// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! GitHub OAuth client
//!
//! This module talks to the identity provider: it builds the authorization
//! URL for the browser redirect, exchanges the returned code for an access
//! token, fetches the user profile, and performs the organization-membership
//! check that gates sign-in.
//!
//! All calls share one reqwest client with a bounded timeout taken from the
//! provider configuration. The membership check never raises: any failure
//! (timeout, transport error, unexpected status) is reported as
//! [`Membership::NotMember`] so the portal fails closed.

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::{Config, ProviderConfig};

/// Failure while talking to the identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("provider response missing access token: {0}")]
    Token(String),

    #[error("invalid provider URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Outcome of the organization-membership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Member,
    NotMember,
}

/// Token response from the GitHub token endpoint.
///
/// GitHub reports errors with a 200 status and an `error` field, so both
/// shapes are deserialized here and told apart afterwards.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// User profile from the GitHub `/user` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// OAuth client for the configured GitHub application.
pub struct GitHubClient {
    config: ProviderConfig,
    organization: Option<String>,
    http: reqwest::Client,
}

impl GitHubClient {
    /// Build a client from the application configuration.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(config.server.name.clone())
            .timeout(std::time::Duration::from_secs(
                config.provider.timeout_seconds,
            ))
            .build()?;
        Ok(Self {
            config: config.provider.clone(),
            organization: config.auth.organization.clone(),
            http,
        })
    }

    /// Whether the OAuth application credentials are configured.
    pub fn is_configured(&self) -> bool {
        !self.config.client_id.is_empty() && !self.config.client_secret.is_empty()
    }

    /// Provider identifier ("github").
    pub fn provider(&self) -> &str {
        &self.config.provider
    }

    /// The organization gating sign-in, if any.
    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// Build the authorization URL the browser is redirected to.
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
        code_challenge: &str,
    ) -> Result<String, ProviderError> {
        // Members-only gating needs read:org in addition to the profile scopes
        let scope = if self.organization.is_some() {
            format!("{} read:org", self.config.scope)
        } else {
            self.config.scope.clone()
        };

        let mut url = Url::parse(&self.config.authorize_url)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("scope", &scope);
        Ok(url.into())
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<String, ProviderError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let token: TokenResponse = response.json().await?;
        if let Some(error) = token.error {
            return Err(ProviderError::Token(format!(
                "{}: {}",
                error,
                token.error_description.unwrap_or_default()
            )));
        }
        token
            .access_token
            .ok_or_else(|| ProviderError::Token("no access_token in response".to_string()))
    }

    /// Fetch the authenticated user's profile.
    pub async fn fetch_user(&self, access_token: &str) -> Result<GitHubUser, ProviderError> {
        let url = format!("{}/user", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    /// Check whether the user belongs to the configured organization.
    ///
    /// Skipped entirely (everyone is a member) when no organization is
    /// configured. The GitHub membership endpoint answers 204 for a member;
    /// every other answer, and any transport failure, counts as not a
    /// member.
    pub async fn organization_membership(&self, login: &str, access_token: &str) -> Membership {
        let Some(org) = &self.organization else {
            return Membership::Member;
        };

        let url = format!("{}/orgs/{}/members/{}", self.config.api_base_url, org, login);
        match self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
        {
            Ok(response) if response.status() == reqwest::StatusCode::NO_CONTENT => {
                debug!("{} is a member of {}", login, org);
                Membership::Member
            }
            Ok(response) => {
                debug!(
                    "{} is not a member of {} (status {})",
                    login,
                    org,
                    response.status()
                );
                Membership::NotMember
            }
            Err(e) => {
                warn!("membership check for {} against {} failed: {}", login, org, e);
                Membership::NotMember
            }
        }
    }
}
