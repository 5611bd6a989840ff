// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Session token issuance and verification
//!
//! Sessions are stateless: everything the gatekeeper needs is carried in an
//! HS256-signed JWT stored in an http-only cookie. Nothing is persisted
//! server-side, so "invalidating" a session means instructing the client to
//! discard the cookie.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// Name reported in the `iss` claim of every issued token.
const SESSION_ISSUER: &str = "CloudNativeDocsServer";

/// Claims carried by a session token.
///
/// The structure follows the standard JWT claims as defined in RFC 7519,
/// plus the identity fields the portal needs: the originating provider, the
/// display name, and - for GitHub sign-ins - the provider access token and
/// the organization-membership flag computed during sign-in.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (user identifier, e.g. `github:12345` or `demo`)
    pub sub: String,

    /// Issued at timestamp (Unix time)
    pub iat: i64,

    /// Expiration timestamp (Unix time)
    pub exp: i64,

    /// Not before timestamp (when the token becomes valid)
    pub nbf: i64,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Issuer
    pub iss: String,

    /// Provider that authenticated the subject ("github" or "demo")
    pub provider: String,

    /// Display name of the subject, when the provider reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Provider access token, kept for later API calls on behalf of the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Outcome of the organization-membership check at sign-in time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_member: Option<bool>,
}

/// Identity handed to the issuer after a successful authentication.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub sub: String,
    pub name: Option<String>,
    pub provider: String,
    pub access_token: Option<String>,
    pub org_member: Option<bool>,
}

/// Issues and verifies session tokens with a fixed TTL.
///
/// The issuer holds the HS256 keys derived from the configured signing
/// secret. It is shared across request handlers through Rocket's managed
/// state; all methods take `&self` so no locking is needed.
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    duration: i64,
}

impl SessionIssuer {
    /// Create an issuer with the given secret and token lifetime in seconds.
    pub fn new(secret: &[u8], duration: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[SESSION_ISSUER]);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            duration,
        }
    }

    /// Create an issuer from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        let duration = config.auth.session_duration.unwrap_or(86400);
        Self::new(config.auth.signing_secret.as_bytes(), duration)
    }

    /// Mint a signed session token for an authenticated identity.
    pub fn issue(&self, identity: SessionIdentity) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: identity.sub,
            iat: now,
            exp: now + self.duration,
            nbf: now,
            jti: Uuid::new_v4().to_string(),
            iss: SESSION_ISSUER.to_string(),
            provider: identity.provider,
            name: identity.name,
            access_token: identity.access_token,
            org_member: identity.org_member,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Verify a session token and return its claims.
    ///
    /// Signature, expiry, not-before and issuer are all checked; any
    /// failure is equivalent to "no session" for the caller.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Lifetime of issued tokens in seconds.
    pub fn duration(&self) -> i64 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_identity() -> SessionIdentity {
        SessionIdentity {
            sub: "demo".to_string(),
            name: Some("Demo User".to_string()),
            provider: "demo".to_string(),
            access_token: None,
            org_member: None,
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let issuer = SessionIssuer::new(b"test-signing-secret", 3600);
        let token = issuer.issue(demo_identity()).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, "demo");
        assert_eq!(claims.provider, "demo");
        assert_eq!(claims.name.as_deref(), Some("Demo User"));
        assert_eq!(claims.iss, "CloudNativeDocsServer");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = SessionIssuer::new(b"test-signing-secret", 3600);
        let now = Utc::now().timestamp();
        // Expired well past the default validation leeway
        let claims = SessionClaims {
            sub: "demo".to_string(),
            iat: now - 7200,
            exp: now - 3600,
            nbf: now - 7200,
            jti: Uuid::new_v4().to_string(),
            iss: "CloudNativeDocsServer".to_string(),
            provider: "demo".to_string(),
            name: None,
            access_token: None,
            org_member: None,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .unwrap();

        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let issuer = SessionIssuer::new(b"test-signing-secret", 3600);
        let token = issuer.issue(demo_identity()).unwrap();

        // Flip a character in the payload segment
        let mut bytes = token.into_bytes();
        let dot = bytes.iter().position(|&b| b == b'.').unwrap();
        bytes[dot + 1] = if bytes[dot + 1] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(issuer.verify(&tampered).is_err());
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = SessionIssuer::new(b"test-signing-secret", 3600);
        let other = SessionIssuer::new(b"another-secret-entirely", 3600);
        let token = other.issue(demo_identity()).unwrap();

        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let issuer = SessionIssuer::new(b"test-signing-secret", 3600);
        assert!(issuer.verify("not-a-jwt").is_err());
        assert!(issuer.verify("").is_err());
    }
}
