#![allow(dead_code, reason = "not every test binary uses every helper")]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use httpmock::MockServer;
use nordnet_client_sdk::credentials::CredentialsProvider;
use nordnet_client_sdk::transport::{HttpTransport, TransportConfig};
use secrecy::SecretString;
use serde_json::{Value, json};

/// Hands out `auth-1`, `auth-2`, ... so each fresh login is distinguishable.
pub fn numbered_credentials() -> impl CredentialsProvider {
    let counter = Arc::new(AtomicUsize::new(0));
    move || -> nordnet_client_sdk::Result<SecretString> {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SecretString::from(format!("auth-{n}")))
    }
}

pub fn transport(server: &MockServer) -> anyhow::Result<HttpTransport> {
    let config = TransportConfig::for_root(&server.base_url())?;
    Ok(HttpTransport::new(config, numbered_credentials())?)
}

pub fn login_body(session_key: &str) -> Value {
    json!({
        "session_key": session_key,
        "environment": "test",
        "expires_in": 300,
        "private_feed": { "hostname": "priv.test.nordnet.se", "port": 443, "encrypted": true },
        "public_feed": { "hostname": "pub.test.nordnet.se", "port": 443, "encrypted": true }
    })
}

pub fn login_form(n: usize) -> String {
    format!("auth=auth-{n}&service=NEXTAPI")
}

/// `Authorization` value for a session key, which doubles as user and password.
pub fn basic_auth(session_key: &str) -> &'static str {
    match session_key {
        "abc" => "Basic YWJjOmFiYw==",
        "def" => "Basic ZGVmOmRlZg==",
        other => panic!("no precomputed header for {other}"),
    }
}
