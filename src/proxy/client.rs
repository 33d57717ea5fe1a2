use std::net::SocketAddr;

use async_trait::async_trait;
use reqwest::Method;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::Result;
use crate::error::Error;
use crate::proxy::ProxyConfig;
use crate::proxy::envelope::{self, CallRequest, CallResponse, Channel};
use crate::registry::Payload;
use crate::transport::Transport;
use crate::types::Params;

#[derive(Debug)]
enum State {
    Idle,
    Connected(Channel),
    /// A channel failure leaves the client unusable; the reason is kept for
    /// every later call.
    Broken(String),
}

/// A [`Transport`] that forwards every call to a [`ProxyServer`](crate::proxy::ProxyServer).
///
/// The connection is opened on first use and reused for every later call.
/// Calls through one client are serialized on that connection; use several
/// clients for parallel calls.
///
/// The client waits [`ProxyConfig::round_trip_timeout`] for each answer, longer
/// than the server lets the wrapped transport run, so a slow call comes back as
/// the server's timeout error and the channel stays usable. When the wrapped
/// transport leaves its container at the zero value (a `204`, or an error
/// before any body was read) the caller's container is left untouched.
#[derive(Debug)]
pub struct ProxyClient {
    addr: SocketAddr,
    config: ProxyConfig,
    state: Mutex<State>,
}

impl ProxyClient {
    #[must_use]
    pub fn new(addr: SocketAddr) -> Self {
        Self::with_config(addr, ProxyConfig::default())
    }

    #[must_use]
    pub fn with_config(addr: SocketAddr, config: ProxyConfig) -> Self {
        Self {
            addr,
            config,
            state: Mutex::new(State::Idle),
        }
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Closes the connection. Later calls fail.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        *state = State::Broken("client closed".to_owned());
    }

    async fn connect(&self) -> Result<Channel> {
        let stream = tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_elapsed| Error::proxy_message(format!("connecting to {} timed out", self.addr)))?
            .map_err(Error::proxy)?;
        stream.set_nodelay(true).map_err(Error::proxy)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(addr = %self.addr, "connected to proxy");

        Ok(envelope::channel(stream, self.config.max_frame_length))
    }

    async fn round_trip(channel: &mut Channel, request: &CallRequest) -> Result<CallResponse> {
        envelope::write_frame(channel, request).await?;
        let response: CallResponse = envelope::read_frame(channel)
            .await?
            .ok_or_else(|| Error::proxy_message("proxy closed the connection"))?;
        if response.id != request.id {
            return Err(Error::proxy_message(format!(
                "response {} does not answer call {}",
                response.id, request.id
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for ProxyClient {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, params, result), fields(addr = %self.addr), err)
    )]
    async fn perform(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        result: &mut dyn Payload,
    ) -> Result<()> {
        let mut state = self.state.lock().await;

        let mut channel = match std::mem::replace(&mut *state, State::Idle) {
            State::Connected(channel) => channel,
            State::Idle => match self.connect().await {
                Ok(channel) => channel,
                Err(err) => {
                    *state = State::Broken(err.to_string());
                    return Err(err);
                }
            },
            State::Broken(reason) => {
                let err = Error::proxy_message(format!("proxy channel is broken: {reason}"));
                *state = State::Broken(reason);
                return Err(err);
            }
        };

        let request = CallRequest::new(method, path, params, result.result_type());
        let response = match tokio::time::timeout(
            self.config.round_trip_timeout(),
            Self::round_trip(&mut channel, &request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(id = %request.id, error = %err, "proxy channel failed");
                *state = State::Broken(err.to_string());
                return Err(err);
            }
            Err(_elapsed) => {
                let err = Error::proxy_message(format!("call {} timed out", request.id));
                #[cfg(feature = "tracing")]
                tracing::warn!(id = %request.id, "proxy call timed out, abandoning channel");
                *state = State::Broken(err.to_string());
                return Err(err);
            }
        };
        *state = State::Connected(channel);
        drop(state);

        let CallResponse {
            result: bytes,
            error,
            ..
        } = response;

        match error {
            Some(remote) => {
                if !bytes.is_empty() {
                    // Best effort: the container may still carry a partial body.
                    let _partial: serde_json::Result<()> = result.decode(&bytes);
                }
                Err(remote.into_error())
            }
            None if bytes.is_empty() => Ok(()),
            None => result.decode(&bytes).map_err(Error::proxy),
        }
    }
}
