use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use nordnet_client_sdk::error::{Error, Kind};
use nordnet_client_sdk::models::{Account, Login};
use nordnet_client_sdk::registry::Payload;
use nordnet_client_sdk::transport::{ReauthPolicy, Reauthenticating, Transport, TransportExt as _};
use nordnet_client_sdk::{Params, Result};
use reqwest::Method;

/// Fails `accounts` with `code` for the first `failures` calls.
struct Flaky {
    code: &'static str,
    failures: AtomicUsize,
    login_fails: bool,
    calls: Mutex<Vec<(Method, String)>>,
}

impl Flaky {
    fn new(code: &'static str, failures: usize) -> Self {
        Self {
            code,
            failures: AtomicUsize::new(failures),
            login_fails: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(Method, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for Flaky {
    async fn perform(
        &self,
        method: Method,
        path: &str,
        _params: Option<&Params>,
        result: &mut dyn Payload,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((method.clone(), path.to_owned()));

        if path == "login" {
            if self.login_fails {
                return Err(Error::api("NEXT_LOGIN_INVALID_LOGIN_PARAMETER", "Bad credentials"));
            }
            result.decode(br#"{"session_key":"fresh","expires_in":300}"#)?;
            return Ok(());
        }

        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::api(self.code, "rejected"));
        }
        result.decode(br#"[{"accno":1}]"#)?;
        Ok(())
    }
}

fn get(path: &str) -> (Method, String) {
    (Method::GET, path.to_owned())
}

fn post(path: &str) -> (Method, String) {
    (Method::POST, path.to_owned())
}

#[tokio::test]
async fn invalid_session_should_login_and_retry() -> anyhow::Result<()> {
    let transport = Reauthenticating::new(Flaky::new("NEXT_INVALID_SESSION", 1));

    let accounts: Vec<Account> = transport.call(Method::GET, "accounts", None).await?;

    assert_eq!(accounts.len(), 1);
    assert_eq!(
        transport.inner().calls(),
        vec![get("accounts"), post("login"), get("accounts")]
    );
    Ok(())
}

#[tokio::test]
async fn retry_should_happen_only_once() {
    let transport = Reauthenticating::new(Flaky::new("NEXT_INVALID_SESSION", 2));

    let err = transport
        .call::<Vec<Account>>(Method::GET, "accounts", None)
        .await
        .unwrap_err();

    assert!(err.is_invalid_session());
    assert_eq!(transport.inner().calls().len(), 3);
}

#[tokio::test]
async fn other_errors_should_pass_through() {
    let transport = Reauthenticating::new(Flaky::new("NEXT_INVALID_ORDER", 1));

    let err = transport
        .call::<Vec<Account>>(Method::GET, "accounts", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Kind::Api);
    assert_eq!(transport.inner().calls(), vec![get("accounts")]);
}

#[tokio::test]
async fn failed_login_should_be_returned_without_retry() {
    let mut flaky = Flaky::new("NEXT_INVALID_SESSION", 1);
    flaky.login_fails = true;
    let transport = Reauthenticating::new(flaky);

    let err = transport
        .call::<Vec<Account>>(Method::GET, "accounts", None)
        .await
        .unwrap_err();

    assert_eq!(
        err.api_error().map(|e| e.code.as_str()),
        Some("NEXT_LOGIN_INVALID_LOGIN_PARAMETER")
    );
    assert_eq!(
        transport.inner().calls(),
        vec![get("accounts"), post("login")]
    );
}

#[tokio::test]
async fn login_calls_should_never_trigger_reauthentication() {
    let mut flaky = Flaky::new("NEXT_INVALID_SESSION", 0);
    flaky.login_fails = true;
    let transport = Reauthenticating::with_policy(
        flaky,
        ReauthPolicy::default().with_code("NEXT_LOGIN_INVALID_LOGIN_PARAMETER"),
    );

    let err = transport
        .call::<Login>(Method::POST, "login", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Kind::Api);
    assert_eq!(transport.inner().calls(), vec![post("login")]);
}

#[tokio::test]
async fn custom_codes_should_trigger_reauthentication() -> anyhow::Result<()> {
    let transport = Reauthenticating::with_policy(
        Flaky::new("NEXT_SESSION_EXPIRED", 1),
        ReauthPolicy::default().with_code("NEXT_SESSION_EXPIRED"),
    );

    let accounts: Vec<Account> = transport.call(Method::GET, "accounts", None).await?;

    assert_eq!(accounts[0].accno, 1);
    assert_eq!(transport.inner().calls().len(), 3);
    Ok(())
}
