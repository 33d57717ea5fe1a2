//! Share one API session between processes.
//!
//! A [`ProxyServer`] wraps any [`Transport`](crate::transport::Transport),
//! usually a [`HttpTransport`](crate::transport::HttpTransport), and serves
//! it over TCP. A [`ProxyClient`] is itself a transport: it forwards each call
//! together with the result type it expects, and decodes the bytes the server
//! sends back into the caller's container.
//!
//! ```no_run
//! # async fn run() -> nordnet_client_sdk::Result<()> {
//! use nordnet_client_sdk::credentials::StaticCredentials;
//! use nordnet_client_sdk::proxy::{ProxyClient, ProxyConfig, ProxyServer};
//! use nordnet_client_sdk::transport::{HttpTransport, TransportConfig};
//! use nordnet_client_sdk::Client;
//!
//! let transport = HttpTransport::new(
//!     TransportConfig::for_root(nordnet_client_sdk::TEST_BASE_URL)?,
//!     StaticCredentials::new("<encrypted credentials>"),
//! )?;
//! let server = ProxyServer::bind("127.0.0.1:0", transport, ProxyConfig::default()).await?;
//!
//! let client = Client::new(ProxyClient::new(server.local_addr()));
//! let accounts = client.accounts().await?;
//! # drop(accounts);
//! server.shutdown().await
//! # }
//! ```

mod client;
mod config;
mod envelope;
mod server;

pub use client::ProxyClient;
pub use config::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MAX_FRAME_LENGTH, DEFAULT_ROUND_TRIP_MARGIN, ProxyConfig,
};
pub use envelope::{CallRequest, CallResponse, RemoteError};
pub use server::ProxyServer;
