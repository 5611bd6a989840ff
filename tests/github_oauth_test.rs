// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Full GitHub OAuth sign-in flow against a mocked provider, including the
//! organization-membership authorization check.

use regex::Regex;
use rocket::config::LogLevel;
use rocket::http::{ContentType, Status};
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cloud_native_docs::config::Config;
use cloud_native_docs::portal::server::build_rocket;

const TEST_SECRET_KEY: &str = "YWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFh";

fn get_figment() -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("address", "127.0.0.1"))
        .merge(("port", 0))
        .merge(("log_level", LogLevel::Off))
        .merge(("secret_key", TEST_SECRET_KEY))
}

fn get_test_config(provider_base: &str, organization: Option<&str>) -> Config {
    let mut config = Config::default();
    config.auth.signing_secret = "test-signing-secret-for-the-portal".to_string();
    config.auth.organization = organization.map(String::from);
    config.provider.client_id = "test-client-id".to_string();
    config.provider.client_secret = "test-client-secret".to_string();
    config.provider.authorize_url = format!("{}/login/oauth/authorize", provider_base);
    config.provider.token_url = format!("{}/login/oauth/access_token", provider_base);
    config.provider.api_base_url = provider_base.to_string();
    config.provider.timeout_seconds = 5;
    config
}

async fn test_client(config: Config) -> rocket::local::asynchronous::Client {
    let rocket = build_rocket(get_figment(), Arc::new(config)).await;
    rocket::local::asynchronous::Client::tracked(rocket)
        .await
        .expect("valid rocket instance")
}

async fn fetch_csrf_token(client: &rocket::local::asynchronous::Client) -> String {
    let response = client.get("/login").dispatch().await;
    let body = response.into_string().await.expect("login page body");
    let re = Regex::new(r#"name="csrf_token" value="([^"]+)""#).expect("valid regex");
    re.captures(&body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .expect("csrf token in login page")
}

/// Start the handshake and return the state parameter the server generated.
async fn start_github_signin(
    client: &rocket::local::asynchronous::Client,
    callback_url: &str,
) -> String {
    let csrf_token = fetch_csrf_token(client).await;
    let response = client
        .post("/api/auth/signin/github")
        .header(ContentType::Form)
        .body(format!(
            "csrf_token={}&callbackUrl={}",
            csrf_token, callback_url
        ))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);

    let location = response
        .headers()
        .get_one("Location")
        .expect("authorize redirect")
        .to_string();
    assert!(location.contains("/login/oauth/authorize?"));

    let authorize = Url::parse(&location).expect("authorize URL");
    let pairs: Vec<(String, String)> = authorize
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert!(pairs.contains(&("client_id".to_string(), "test-client-id".to_string())));
    assert!(pairs.contains(&("code_challenge_method".to_string(), "S256".to_string())));

    pairs
        .into_iter()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v)
        .expect("state parameter")
}

fn mock_token_endpoint() -> Mock {
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "gho_testtoken",
            "token_type": "bearer",
            "scope": "read:user"
        })))
}

fn mock_user_endpoint() -> Mock {
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 42,
            "login": "octocat",
            "name": "The Octocat",
            "email": "octocat@github.com"
        })))
}

#[rocket::async_test]
async fn test_github_signin_without_organization_issues_session() {
    let provider = MockServer::start().await;
    mock_token_endpoint().mount(&provider).await;
    mock_user_endpoint().mount(&provider).await;

    let client = test_client(get_test_config(&provider.uri(), None)).await;
    let state = start_github_signin(&client, "%2Fdocs%2Fintro").await;

    let response = client
        .get(format!(
            "/api/auth/callback/github?code=test-code&state={}",
            state
        ))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/docs/intro"));
    assert!(client.cookies().get("docs_session").is_some());

    // The session now opens the documentation
    let response = client.get("/docs/intro").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.get("/api/auth/session").dispatch().await;
    let body = response.into_string().await.expect("session body");
    assert!(body.contains("\"sub\":\"github:42\""));
    assert!(body.contains("\"name\":\"The Octocat\""));
}

#[rocket::async_test]
async fn test_github_signin_of_member_is_authorized() {
    let provider = MockServer::start().await;
    mock_token_endpoint().mount(&provider).await;
    mock_user_endpoint().mount(&provider).await;
    Mock::given(method("GET"))
        .and(path("/orgs/cloud-native-team/members/octocat"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&provider)
        .await;

    let client = test_client(get_test_config(&provider.uri(), Some("cloud-native-team"))).await;
    let state = start_github_signin(&client, "%2F").await;

    let response = client
        .get(format!(
            "/api/auth/callback/github?code=test-code&state={}",
            state
        ))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/"));
    assert!(client.cookies().get("docs_session").is_some());
}

#[rocket::async_test]
async fn test_github_signin_of_non_member_is_denied() {
    let provider = MockServer::start().await;
    mock_token_endpoint().mount(&provider).await;
    mock_user_endpoint().mount(&provider).await;
    Mock::given(method("GET"))
        .and(path("/orgs/cloud-native-team/members/octocat"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&provider)
        .await;

    let client = test_client(get_test_config(&provider.uri(), Some("cloud-native-team"))).await;
    let state = start_github_signin(&client, "%2F").await;

    let response = client
        .get(format!(
            "/api/auth/callback/github?code=test-code&state={}",
            state
        ))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/auth/error?error=AccessDenied")
    );
    // No session was issued
    assert!(client.cookies().get("docs_session").is_none());

    let response = client.get("/docs/intro").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
}

#[rocket::async_test]
async fn test_callback_with_mismatched_state_fails() {
    let provider = MockServer::start().await;
    mock_token_endpoint().mount(&provider).await;
    mock_user_endpoint().mount(&provider).await;

    let client = test_client(get_test_config(&provider.uri(), None)).await;
    let _state = start_github_signin(&client, "%2F").await;

    let response = client
        .get("/api/auth/callback/github?code=test-code&state=not-the-state")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/auth/error?error=OAuthCallback")
    );
    assert!(client.cookies().get("docs_session").is_none());
}

#[rocket::async_test]
async fn test_callback_without_handshake_fails() {
    let provider = MockServer::start().await;
    let client = test_client(get_test_config(&provider.uri(), None)).await;

    // Straight to the callback, no sign-in started
    let response = client
        .get("/api/auth/callback/github?code=test-code&state=whatever")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/auth/error?error=OAuthCallback")
    );
}

#[rocket::async_test]
async fn test_provider_error_reaches_error_page() {
    let provider = MockServer::start().await;
    let client = test_client(get_test_config(&provider.uri(), None)).await;
    let state = start_github_signin(&client, "%2F").await;

    let response = client
        .get(format!(
            "/api/auth/callback/github?error=access_denied&state={}",
            state
        ))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/auth/error?error=OAuthCallback")
    );
}

#[rocket::async_test]
async fn test_rejected_code_exchange_fails_closed() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        })))
        .mount(&provider)
        .await;

    let client = test_client(get_test_config(&provider.uri(), None)).await;
    let state = start_github_signin(&client, "%2F").await;

    let response = client
        .get(format!(
            "/api/auth/callback/github?code=already-used&state={}",
            state
        ))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/auth/error?error=OAuthCallback")
    );
    assert!(client.cookies().get("docs_session").is_none());
}

#[rocket::async_test]
async fn test_unconfigured_provider_reports_configuration_error() {
    let provider = MockServer::start().await;
    let mut config = get_test_config(&provider.uri(), None);
    config.provider.client_id = String::new();
    config.provider.client_secret = String::new();

    let client = test_client(config).await;
    let csrf_token = fetch_csrf_token(&client).await;

    let response = client
        .post("/api/auth/signin/github")
        .header(ContentType::Form)
        .body(format!("csrf_token={}", csrf_token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/auth/error?error=Configuration")
    );
}
