mod common;

use httpmock::prelude::*;
use nordnet_client_sdk::error::Kind;
use nordnet_client_sdk::transport::{Reauthenticating, Transport as _};
use nordnet_client_sdk::{Client, Params};
use serde_json::json;

use crate::common::{basic_auth, login_body, login_form, transport};

#[tokio::test]
async fn login_should_post_credentials_and_store_session() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/2/login")
                .header("accept", "application/json")
                .header("accept-language", "en")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(login_form(1));
            then.status(200).json_body(login_body("abc"));
        })
        .await;

    let transport = transport(&server)?;
    let state = transport.login().await?;

    login.assert_async().await;
    assert_eq!(state.session_key, "abc");
    assert_eq!(state.public_feed.hostname, "pub.test.nordnet.se");

    let session = transport.session()?;
    assert_eq!(session.login_state, Some(state));
    assert!(session.expires_at.is_some());
    assert!(session.last_usage_at.is_some());
    Ok(())
}

#[tokio::test]
async fn second_login_should_touch_cached_session() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/2/login").body(login_form(1));
            then.status(200).json_body(login_body("abc"));
        })
        .await;
    let touch = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/2/login")
                .header("authorization", basic_auth("abc"));
            then.status(200).json_body(json!({ "logged_in": true }));
        })
        .await;

    let transport = transport(&server)?;
    let first = transport.login().await?;
    let second = transport.login().await?;

    login.assert_async().await;
    touch.assert_async().await;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn expired_session_should_log_in_with_fresh_credentials() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(POST).path("/2/login").body(login_form(1));
            then.status(200).json_body(login_body("abc"));
        })
        .await;
    let touch = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/2/login")
                .header("authorization", basic_auth("abc"));
            then.status(200).json_body(json!({ "logged_in": false }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(POST).path("/2/login").body(login_form(2));
            then.status(200).json_body(login_body("def"));
        })
        .await;

    let transport = transport(&server)?;
    transport.login().await?;
    let state = transport.login().await?;

    first.assert_async().await;
    touch.assert_async().await;
    second.assert_async().await;
    assert_eq!(state.session_key, "def");
    assert_eq!(transport.login_state()?.map(|l| l.session_key), Some("def".to_owned()));
    Ok(())
}

#[tokio::test]
async fn calls_should_authenticate_with_session_key() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/2/login");
            then.status(200).json_body(login_body("abc"));
        })
        .await;
    let accounts = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/accounts")
                .header("authorization", basic_auth("abc"));
            then.status(200).json_body(json!([
                { "accno": 1, "type": "ISK", "default": true, "alias": "main" },
                { "accno": 2, "type": "AF", "blocked": true, "blocked_reason": "closed" }
            ]));
        })
        .await;

    let client = Client::new(transport(&server)?);
    client.login().await?;
    let result = client.accounts().await?;

    accounts.assert_async().await;
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].account_type, "ISK");
    assert!(result[0].default);
    assert!(result[1].blocked);
    Ok(())
}

#[tokio::test]
async fn get_params_should_travel_in_query() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let search = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/instruments")
                .query_param("query", "ericsson")
                .query_param("limit", "1");
            then.status(200).json_body(json!([
                { "instrument_id": 101, "symbol": "ericsson", "currency": "SEK" }
            ]));
        })
        .await;

    let client = Client::new(transport(&server)?);
    let params = Params::new().with("query", "ericsson").with("limit", "1");
    let found = client.search_instruments(&params).await?;

    search.assert_async().await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].symbol, "ericsson");
    Ok(())
}

#[tokio::test]
async fn system_status_should_hit_versioned_root() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let status = server
        .mock_async(|when, then| {
            when.method(GET).path("/2");
            then.status(200).json_body(json!({
                "timestamp": 1_458_217_349_000_i64,
                "valid_version": true,
                "system_running": true,
                "skip_phrase": false
            }));
        })
        .await;

    let client = Client::new(transport(&server)?);
    let result = client.system_status().await?;

    status.assert_async().await;
    assert!(result.system_running);
    assert!(result.valid_version);
    Ok(())
}

#[tokio::test]
async fn api_error_statuses_should_surface_error_body() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2/accounts");
            then.status(401).json_body(json!({
                "code": "NEXT_INVALID_SESSION",
                "message": "Invalid session"
            }));
        })
        .await;

    let client = Client::new(transport(&server)?);
    let err = client.accounts().await.unwrap_err();

    assert_eq!(err.kind(), Kind::Api);
    assert!(err.is_invalid_session());
    assert_eq!(
        err.api_error().map(|e| e.message.as_str()),
        Some("Invalid session")
    );
    Ok(())
}

#[tokio::test]
async fn too_many_requests_should_be_rate_limited() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2/markets");
            then.status(429).body("slow down");
        })
        .await;

    let client = Client::new(transport(&server)?);
    let err = client.markets().await.unwrap_err();

    assert_eq!(err.kind(), Kind::RateLimited);
    assert!(err.api_error().is_none());
    Ok(())
}

#[tokio::test]
async fn no_content_should_return_default_result() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/2/accounts/1/orders/7");
            then.status(204);
        })
        .await;

    let client = Client::new(transport(&server)?);
    let reply = client.delete_order(1, 7).await?;

    delete.assert_async().await;
    assert_eq!(reply, Default::default());
    Ok(())
}

#[tokio::test]
async fn logout_should_drop_login_state() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/2/login");
            then.status(200).json_body(login_body("abc"));
        })
        .await;
    let logout = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/2/login")
                .header("authorization", basic_auth("abc"));
            then.status(200).json_body(json!({ "logged_in": false }));
        })
        .await;

    let transport = transport(&server)?;
    transport.login().await?;
    let status = transport.logout().await?;

    logout.assert_async().await;
    assert!(!status.logged_in);
    let session = transport.session()?;
    assert_eq!(session.login_state, None);
    assert_eq!(session.expires_at, None);
    Ok(())
}

#[tokio::test]
async fn invalid_session_should_reauthenticate_and_retry_once() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let first_login = server
        .mock_async(|when, then| {
            when.method(POST).path("/2/login").body(login_form(1));
            then.status(200).json_body(login_body("abc"));
        })
        .await;
    let rejected = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/accounts")
                .header("authorization", basic_auth("abc"));
            then.status(401).json_body(json!({
                "code": "NEXT_INVALID_SESSION",
                "message": "Invalid session"
            }));
        })
        .await;
    let touch = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/2/login")
                .header("authorization", basic_auth("abc"));
            then.status(200).json_body(json!({ "logged_in": false }));
        })
        .await;
    let second_login = server
        .mock_async(|when, then| {
            when.method(POST).path("/2/login").body(login_form(2));
            then.status(200).json_body(login_body("def"));
        })
        .await;
    let accepted = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/accounts")
                .header("authorization", basic_auth("def"));
            then.status(200).json_body(json!([{ "accno": 1 }]));
        })
        .await;

    let client = Client::new(Reauthenticating::new(transport(&server)?));
    client.login().await?;
    let accounts = client.accounts().await?;

    first_login.assert_async().await;
    rejected.assert_async().await;
    touch.assert_async().await;
    second_login.assert_async().await;
    accepted.assert_async().await;
    assert_eq!(accounts.len(), 1);
    assert_eq!(
        client.transport().inner().login_state()?.map(|l| l.session_key),
        Some("def".to_owned())
    );
    Ok(())
}

#[tokio::test]
async fn login_without_login_container_should_post_as_is() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/2/login").body("");
            then.status(200).json_body(json!({ "logged_in": true }));
        })
        .await;

    let transport = transport(&server)?;
    let mut status = nordnet_client_sdk::models::LoggedInStatus::default();
    transport
        .perform(reqwest::Method::POST, "login", None, &mut status)
        .await?;

    login.assert_async().await;
    assert!(status.logged_in);
    assert_eq!(transport.login_state()?, None);
    Ok(())
}
