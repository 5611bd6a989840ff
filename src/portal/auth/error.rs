// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sign-in error taxonomy
//!
//! Every failure during sign-in is caught at the issuer boundary and mapped
//! to one of a fixed set of codes; the error page renders the matching
//! human-readable message. The gatekeeper itself never surfaces an error,
//! it only redirects.

use thiserror::Error;

use super::github;

/// Fixed error codes surfaced on the `/auth/error` page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The server is misconfigured (e.g. missing OAuth client id).
    Configuration,
    /// The authorization check vetoed the sign-in.
    AccessDenied,
    /// A token has expired or has already been used.
    Verification,
    /// Starting the OAuth handshake failed.
    OAuthSignin,
    /// The OAuth callback failed (state mismatch, code exchange refused).
    OAuthCallback,
    /// The provider identity could not be resolved into an account.
    OAuthCreateAccount,
    /// Bad demo/local credentials.
    CredentialsSignin,
    /// A protected route was hit without a session.
    SessionRequired,
}

impl ErrorCode {
    /// The code as it appears in the `error` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Configuration => "Configuration",
            ErrorCode::AccessDenied => "AccessDenied",
            ErrorCode::Verification => "Verification",
            ErrorCode::OAuthSignin => "OAuthSignin",
            ErrorCode::OAuthCallback => "OAuthCallback",
            ErrorCode::OAuthCreateAccount => "OAuthCreateAccount",
            ErrorCode::CredentialsSignin => "CredentialsSignin",
            ErrorCode::SessionRequired => "SessionRequired",
        }
    }

    /// Parse a code from its query-parameter form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Configuration" => Some(ErrorCode::Configuration),
            "AccessDenied" => Some(ErrorCode::AccessDenied),
            "Verification" => Some(ErrorCode::Verification),
            "OAuthSignin" => Some(ErrorCode::OAuthSignin),
            "OAuthCallback" => Some(ErrorCode::OAuthCallback),
            "OAuthCreateAccount" => Some(ErrorCode::OAuthCreateAccount),
            "CredentialsSignin" => Some(ErrorCode::CredentialsSignin),
            "SessionRequired" => Some(ErrorCode::SessionRequired),
            _ => None,
        }
    }

    /// Human-readable message shown on the error page.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Configuration => "There is a problem with the server configuration.",
            ErrorCode::AccessDenied => "Access denied. You do not have permission to sign in.",
            ErrorCode::Verification => "The verification token has expired or has already been used.",
            ErrorCode::OAuthSignin => "Error in OAuth sign in process.",
            ErrorCode::OAuthCallback => "Error in OAuth callback.",
            ErrorCode::OAuthCreateAccount => "Could not create OAuth account.",
            ErrorCode::CredentialsSignin => {
                "Sign in failed. Check the details you provided are correct."
            }
            ErrorCode::SessionRequired => "Please sign in to access this page.",
        }
    }

    /// Fallback message for unrecognized codes.
    pub fn default_message() -> &'static str {
        "An error occurred during authentication."
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure raised while issuing a session.
///
/// Every variant carries the user-facing [`ErrorCode`] it maps to; the
/// detail strings only reach the log, never the browser.
#[derive(Debug, Error)]
pub enum SigninError {
    #[error("server misconfigured: {0}")]
    Configuration(String),

    #[error("authorization check failed for {0}")]
    AccessDenied(String),

    #[error("cross-site request forgery token mismatch")]
    CsrfMismatch,

    #[error("OAuth state mismatch or missing handshake cookie")]
    StateMismatch,

    #[error("provider returned an error: {0}")]
    ProviderError(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(#[source] github::ProviderError),

    #[error("profile fetch failed: {0}")]
    ProfileFetch(#[source] github::ProviderError),

    #[error("invalid demo credentials")]
    BadCredentials,
}

impl SigninError {
    /// The user-facing code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            SigninError::Configuration(_) => ErrorCode::Configuration,
            SigninError::AccessDenied(_) => ErrorCode::AccessDenied,
            SigninError::CsrfMismatch => ErrorCode::OAuthSignin,
            SigninError::StateMismatch => ErrorCode::OAuthCallback,
            SigninError::ProviderError(_) => ErrorCode::OAuthCallback,
            SigninError::TokenExchange(_) => ErrorCode::OAuthCallback,
            SigninError::ProfileFetch(_) => ErrorCode::OAuthCreateAccount,
            SigninError::BadCredentials => ErrorCode::CredentialsSignin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for code in [
            ErrorCode::Configuration,
            ErrorCode::AccessDenied,
            ErrorCode::Verification,
            ErrorCode::OAuthSignin,
            ErrorCode::OAuthCallback,
            ErrorCode::OAuthCreateAccount,
            ErrorCode::CredentialsSignin,
            ErrorCode::SessionRequired,
        ] {
            assert_eq!(ErrorCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(ErrorCode::parse("NotACode"), None);
    }
}
