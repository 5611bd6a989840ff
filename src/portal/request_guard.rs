// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! General-purpose request guards and responders for the portal

use rocket::http::uri::Host;
use rocket::http::{ContentType, Header};
use rocket::request::FromRequest;
use rocket::response::Responder;

use rocket::async_trait;
use rocket::{Request, Response};

use std::env;
use std::fmt::Debug;
use std::io::Cursor;
use std::net::{IpAddr, Ipv4Addr};

/// Response type for serving static files
///
/// This struct encapsulates the binary content of a static file along
/// with its content type. It implements Rocket's `Responder` trait to
/// allow direct return from route handlers.
pub struct StaticFileResponse(pub Vec<u8>, pub ContentType);

#[async_trait]
impl<'r> Responder<'r, 'r> for StaticFileResponse {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        Response::build()
            .header(self.1) // Content-Type header
            .header(Header {
                name: "Cache-Control".into(),
                value: "max-age=604800".into(), // 1 week cache
            })
            .sized_body(self.0.len(), Cursor::new(self.0))
            .ok()
    }
}

/// Request guard for accessing details of the incoming connection
///
/// Used to build absolute URLs pointing back at this server, such as the
/// OAuth redirect URI handed to the identity provider.
///
/// # Fields
///
/// * `host_port` - The host and port as a string (e.g., "example.com:8080")
/// * `ip` - The client's IP address, or 127.0.0.1 if unavailable
/// * `scheme` - The URL scheme ("http" or "https")
/// * `base_url` - The base URL without the port if standard (e.g., "https://example.com")
pub struct ConnectionInfo {
    pub host_port: String,
    pub ip: IpAddr,
    pub scheme: String,
    pub base_url: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ConnectionInfo {
    type Error = ();

    /// Extracts connection information from the request
    ///
    /// NOTE: if the host is not set in the request, it will use localhost:8080 hardcoded
    async fn from_request(req: &'r Request<'_>) -> rocket::request::Outcome<Self, Self::Error> {
        let default_host_string = env::var("HOST").unwrap_or_else(|_| "localhost:8080".to_string());
        let default_host = Host::parse(default_host_string.as_str()).expect("valid host");
        let host_port = req.host().unwrap_or(&default_host);
        let port = host_port.port().unwrap_or(80);
        let host: &str = host_port.domain().as_str();
        let ip = req
            .client_ip()
            .unwrap_or(Ipv4Addr::new(127, 0, 0, 1).into());
        let scheme = if req.rocket().config().tls_enabled() {
            "https".to_string()
        } else {
            "http".to_string()
        };
        let base_url = if port == 80 || port == 443 {
            format!("{}://{}", scheme, host)
        } else {
            format!("{}://{}:{}", scheme, host, port)
        };
        rocket::request::Outcome::Success(ConnectionInfo {
            host_port: host_port.to_string(),
            ip,
            scheme,
            base_url,
        })
    }
}

impl Debug for ConnectionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("host_port", &self.host_port)
            .field("ip", &self.ip)
            .field("scheme", &self.scheme)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Request guard for accessing the raw query string of the request
///
/// Used by the gatekeeper fallback route to preserve the full original
/// location (path and query) across the login redirect.
pub struct RawQueryString(pub String);

impl RawQueryString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RawQueryString {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for RawQueryString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RawQueryString").field(&self.0).finish()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RawQueryString {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> rocket::request::Outcome<Self, Self::Error> {
        match req.uri().query() {
            Some(query) => rocket::request::Outcome::Success(RawQueryString(query.to_string())),
            None => rocket::request::Outcome::Success(RawQueryString(String::new())),
        }
    }
}
