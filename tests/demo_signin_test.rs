// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cloud-native-docs project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Demo credential sign-in and sign-out flows.

use regex::Regex;
use rocket::config::LogLevel;
use rocket::http::{ContentType, Status};
use std::sync::Arc;

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

fn get_test_config(demo_enabled: bool) -> Config {
    let mut config = Config::default();
    config.auth.signing_secret = "test-signing-secret-for-the-portal".to_string();
    config.auth.demo.enabled = demo_enabled;
    config
}

async fn test_client(config: Config) -> rocket::local::asynchronous::Client {
    let rocket = build_rocket(get_figment(), Arc::new(config)).await;
    rocket::local::asynchronous::Client::tracked(rocket)
        .await
        .expect("valid rocket instance")
}

/// Fetch the login page and extract the CSRF token embedded in the form.
async fn fetch_csrf_token(client: &rocket::local::asynchronous::Client) -> String {
    let response = client.get("/login").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().await.expect("login page body");
    let re = Regex::new(r#"name="csrf_token" value="([^"]+)""#).expect("valid regex");
    re.captures(&body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .expect("csrf token in login page")
}

#[rocket::async_test]
async fn test_demo_signin_issues_session_for_demo_identity() {
    let client = test_client(get_test_config(true)).await;
    let csrf_token = fetch_csrf_token(&client).await;

    let response = client
        .post("/api/auth/signin/demo")
        .header(ContentType::Form)
        .body(format!("username=demo&csrf_token={}", csrf_token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/"));

    // The tracked client now carries the session cookie
    let response = client.get("/docs/intro").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.get("/api/auth/session").dispatch().await;
    let body = response.into_string().await.expect("session body");
    assert!(body.contains("\"sub\":\"demo\""));
    assert!(body.contains("\"name\":\"Demo User\""));
    assert!(body.contains("\"provider\":\"demo\""));
}

#[rocket::async_test]
async fn test_demo_signin_honors_callback_url() {
    let client = test_client(get_test_config(true)).await;
    let csrf_token = fetch_csrf_token(&client).await;

    let response = client
        .post("/api/auth/signin/demo")
        .header(ContentType::Form)
        .body(format!(
            "username=demo&csrf_token={}&callbackUrl=%2Fdocs%2Fdeployment",
            csrf_token
        ))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/docs/deployment")
    );
}

#[rocket::async_test]
async fn test_demo_signin_rejects_unknown_username() {
    let client = test_client(get_test_config(true)).await;
    let csrf_token = fetch_csrf_token(&client).await;

    let response = client
        .post("/api/auth/signin/demo")
        .header(ContentType::Form)
        .body(format!("username=admin&csrf_token={}", csrf_token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/auth/error?error=CredentialsSignin")
    );
    assert!(client.cookies().get("docs_session").is_none());
}

#[rocket::async_test]
async fn test_demo_signin_rejects_missing_csrf_token() {
    let client = test_client(get_test_config(true)).await;
    // No prior visit to the login page, so no CSRF cookie exists
    let response = client
        .post("/api/auth/signin/demo")
        .header(ContentType::Form)
        .body("username=demo&csrf_token=forged")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/auth/error?error=CredentialsSignin")
    );
}

#[rocket::async_test]
async fn test_disabled_demo_provider_fails_closed() {
    let client = test_client(get_test_config(false)).await;
    let csrf_token = fetch_csrf_token(&client).await;

    let response = client
        .post("/api/auth/signin/demo")
        .header(ContentType::Form)
        .body(format!("username=demo&csrf_token={}", csrf_token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/auth/error?error=CredentialsSignin")
    );
}

#[rocket::async_test]
async fn test_signout_clears_session_and_redirects_to_login() {
    let client = test_client(get_test_config(true)).await;
    let csrf_token = fetch_csrf_token(&client).await;

    client
        .post("/api/auth/signin/demo")
        .header(ContentType::Form)
        .body(format!("username=demo&csrf_token={}", csrf_token))
        .dispatch()
        .await;
    assert!(client.cookies().get("docs_session").is_some());

    let response = client.get("/api/auth/signout").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/login"));
    assert!(client.cookies().get("docs_session").is_none());

    // Back to anonymous: protected pages redirect again
    let response = client.get("/docs/intro").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
}

#[rocket::async_test]
async fn test_signout_is_idempotent_without_a_session() {
    let client = test_client(get_test_config(true)).await;

    let response = client.get("/api/auth/signout").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/login"));
}

#[rocket::async_test]
async fn test_error_page_renders_message_for_code() {
    let client = test_client(get_test_config(true)).await;

    let response = client
        .get("/auth/error?error=AccessDenied")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().await.expect("error page body");
    assert!(body.contains("Access denied. You do not have permission to sign in."));

    let response = client.get("/auth/error?error=Bogus").dispatch().await;
    let body = response.into_string().await.expect("error page body");
    assert!(body.contains("An error occurred during authentication."));
}
