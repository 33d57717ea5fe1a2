//! Logs in to the API once and shares the session over TCP.
//!
//! ```sh
//! NORDNET_AUTH=<encrypted credentials> cargo run --example daemon
//! ```
//!
//! `NORDNET_AUTH` is the base64 RSA blob the API expects for `POST login`.
//! `NORDNET_URL` defaults to the test system and `NORDNET_BIND` to
//! `127.0.0.1:2008`. Log output follows `RUST_LOG`.

use std::env;

use nordnet_client_sdk::TEST_BASE_URL;
use nordnet_client_sdk::credentials::StaticCredentials;
use nordnet_client_sdk::proxy::{ProxyConfig, ProxyServer};
use nordnet_client_sdk::transport::{HttpTransport, Reauthenticating, TransportConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND: &str = "127.0.0.1:2008";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let url = env::var("NORDNET_URL").unwrap_or_else(|_| TEST_BASE_URL.to_owned());
    let bind = env::var("NORDNET_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());
    let auth = env::var("NORDNET_AUTH")
        .map_err(|_missing| anyhow::anyhow!("NORDNET_AUTH must hold the encrypted login blob"))?;

    let transport = HttpTransport::new(TransportConfig::for_root(&url)?, StaticCredentials::new(auth))?;
    let server = ProxyServer::bind(
        bind.as_str(),
        Reauthenticating::new(transport),
        ProxyConfig::default(),
    )
    .await?;

    tracing::info!(api = %url, addr = %server.local_addr(), "daemon ready");

    tokio::signal::ctrl_c().await?;
    server.shutdown().await?;
    Ok(())
}
