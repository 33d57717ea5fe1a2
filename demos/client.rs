//! Talks to a running `daemon` and prints a few resources.
//!
//! ```sh
//! cargo run --example client -- 127.0.0.1:2008
//! ```

use std::net::SocketAddr;

use nordnet_client_sdk::Client;
use nordnet_client_sdk::proxy::ProxyClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr: SocketAddr = std::env::args()
        .nth(1)
        .as_deref()
        .unwrap_or("127.0.0.1:2008")
        .parse()?;
    let client = Client::new(ProxyClient::new(addr));

    let status = client.system_status().await?;
    tracing::info!(running = status.system_running, message = %status.message, "system status");

    let login = client.login().await?;
    tracing::info!(
        environment = %login.environment,
        public_feed = %format!("{}:{}", login.public_feed.hostname, login.public_feed.port),
        "logged in"
    );

    for account in client.accounts().await? {
        let info = client.account(account.accno).await?;
        tracing::info!(
            accno = account.accno,
            kind = %account.account_type,
            currency = %info.account_currency,
            "account"
        );
    }

    Ok(())
}
