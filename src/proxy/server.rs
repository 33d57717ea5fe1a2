use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::Result;
use crate::error::{Error, Kind};
use crate::proxy::ProxyConfig;
use crate::proxy::envelope::{self, CallRequest, CallResponse, Channel, RemoteError};
use crate::registry;
use crate::transport::Transport;

/// Exposes a [`Transport`] to other processes over TCP.
///
/// Each inbound call names its result type; the server rebuilds a container
/// of that type from the registry, runs the wrapped transport into it and
/// ships the encoded container back together with any error.
#[derive(Debug)]
pub struct ProxyServer {
    local_addr: SocketAddr,
    join_handle: JoinHandle<()>,
    cancel_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl ProxyServer {
    /// Binds `addr` and starts serving `transport`.
    pub async fn bind<A, T>(addr: A, transport: T, config: ProxyConfig) -> Result<Self>
    where
        A: ToSocketAddrs,
        T: Transport + 'static,
    {
        let listener = TcpListener::bind(addr).await?;
        Self::spawn(listener, transport, config)
    }

    /// Starts serving `transport` on an already bound listener.
    pub fn spawn<T: Transport + 'static>(
        listener: TcpListener,
        transport: T,
        config: ProxyConfig,
    ) -> Result<Self> {
        config.validate()?;

        let local_addr = listener.local_addr()?;
        let cancel_token = CancellationToken::new();
        let task_tracker = TaskTracker::new();
        let context = Arc::new(ServerContext {
            transport: Arc::new(transport),
            config,
        });

        let join_handle = tokio::spawn(accept_loop(
            listener,
            context,
            cancel_token.clone(),
            task_tracker.clone(),
        ));

        #[cfg(feature = "tracing")]
        tracing::info!(%local_addr, max_connections = config.max_connections, "proxy server listening");

        Ok(Self {
            local_addr,
            join_handle,
            cancel_token,
            task_tracker,
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting, closes the listener and waits for in-flight calls to finish.
    ///
    /// Connections idling between calls are closed right away.
    pub async fn shutdown(mut self) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::info!(local_addr = %self.local_addr, "shutting down proxy server");

        self.cancel_token.cancel();
        (&mut self.join_handle)
            .await
            .map_err(|e| Error::with_source(Kind::Internal, e))?;
        self.task_tracker.close();
        self.task_tracker.wait().await;
        Ok(())
    }
}

impl Drop for ProxyServer {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// Pause after a failed accept, e.g. when the process ran out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

struct ServerContext {
    transport: Arc<dyn Transport>,
    config: ProxyConfig,
}

async fn accept_loop(
    listener: TcpListener,
    context: Arc<ServerContext>,
    cancel: CancellationToken,
    task_tracker: TaskTracker,
) {
    let connections = Arc::new(Semaphore::new(context.config.max_connections));

    loop {
        let (stream, _peer) = tokio::select! {
            () = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %_err, "proxy accept failed");
                    if accept_backoff(&cancel).await {
                        break;
                    }
                    continue;
                }
            },
        };

        let Ok(permit) = Arc::clone(&connections).try_acquire_owned() else {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                peer = %_peer,
                max_connections = context.config.max_connections,
                "proxy connection limit reached, dropping connection"
            );
            continue;
        };

        let context = Arc::clone(&context);
        let cancel = cancel.child_token();
        task_tracker.spawn(async move {
            let _permit = permit;
            #[cfg(feature = "tracing")]
            tracing::debug!(peer = %_peer, "proxy connection accepted");

            if let Err(_err) = serve_connection(stream, context, cancel).await {
                #[cfg(feature = "tracing")]
                tracing::debug!(peer = %_peer, error = %_err, "proxy connection closed with error");
            }
        });
    }
}

/// Waits out [`ACCEPT_BACKOFF`]; returns `true` when cancelled meanwhile.
async fn accept_backoff(cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = cancel.cancelled() => true,
        () = tokio::time::sleep(ACCEPT_BACKOFF) => false,
    }
}

async fn serve_connection(
    stream: TcpStream,
    context: Arc<ServerContext>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut channel = envelope::channel(stream, context.config.max_frame_length);

    loop {
        let request = tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            read = tokio::time::timeout(context.config.idle_timeout, next_request(&mut channel)) => match read {
                Ok(Ok(Some(request))) => request,
                Ok(Ok(None)) => return Ok(()),
                Ok(Err(err)) => return Err(err),
                Err(_elapsed) => return Err(Error::proxy_message("connection idle for too long")),
            },
        };

        let response = perform_rpc(context.transport.as_ref(), &context.config, request).await;
        envelope::write_frame(&mut channel, &response).await?;
    }
}

async fn next_request(channel: &mut Channel) -> Result<Option<CallRequest>> {
    envelope::read_frame(channel).await
}

/// Serves one call: rebuild the container, run the wrapped transport, encode.
///
/// An unknown result type is rejected before the wrapped transport is touched.
pub(crate) async fn perform_rpc(
    transport: &dyn Transport,
    config: &ProxyConfig,
    request: CallRequest,
) -> CallResponse {
    let CallRequest {
        id,
        method,
        path,
        params,
        result_type,
    } = request;

    let mut container = match registry::new_instance(&result_type) {
        Ok(container) => container,
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(%id, %result_type, "rejecting call with unknown result type");
            return CallResponse {
                id,
                result: Vec::new(),
                error: Some(RemoteError::from(&err)),
            };
        }
    };

    let pristine = container.encode().ok();
    let outcome = match tokio::time::timeout(
        config.call_timeout,
        transport.perform(method, &path, params.as_ref(), &mut *container),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(elapsed) => Err(Error::from(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            elapsed,
        ))),
    };

    // A container the transport never wrote to travels as no bytes at all.
    let result = match container.encode() {
        Ok(result) if pristine.as_ref() == Some(&result) => Vec::new(),
        Ok(result) => result,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(%id, %result_type, error = %_err, "failed to encode proxied result");
            Vec::new()
        }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(%id, %path, %result_type, ok = outcome.is_ok(), "proxied call served");

    CallResponse {
        id,
        result,
        error: outcome.err().as_ref().map(RemoteError::from),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use reqwest::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::registry::Payload;
    use crate::types::{Params, ResultType};

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for Counting {
        async fn perform(
            &self,
            _method: Method,
            path: &str,
            _params: Option<&Params>,
            result: &mut dyn Payload,
        ) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match path {
                "login" => {
                    result.decode(br#"{"logged_in": true}"#)?;
                    Err(Error::api("NEXT_INVALID_SESSION", "Invalid session"))
                }
                _ => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn unknown_result_type_should_not_reach_transport() {
        let transport = Counting::default();
        let request = CallRequest::new(Method::GET, "portfolio", None, ResultType::single("Portfolio"));

        let response = perform_rpc(&transport, &ProxyConfig::default(), request).await;

        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert!(response.result.is_empty());
        assert_eq!(
            response.error.map(|e| e.kind),
            Some(Kind::UnknownResultType)
        );
    }

    #[tokio::test]
    async fn failed_call_should_still_carry_result_bytes() {
        let transport = Counting::default();
        let request = CallRequest::new(Method::PUT, "login", None, ResultType::single("LoggedInStatus"));

        let response = perform_rpc(&transport, &ProxyConfig::default(), request).await;

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.result, br#"{"logged_in":true}"#);
        assert_eq!(
            response.error.and_then(|e| e.code),
            Some("NEXT_INVALID_SESSION".to_owned())
        );
    }

    #[tokio::test]
    async fn untouched_container_should_travel_as_no_bytes() {
        let transport = Counting::default();
        let request = CallRequest::new(Method::DELETE, "accounts/1/orders/7", None, ResultType::single("OrderReply"));

        let response = perform_rpc(&transport, &ProxyConfig::default(), request).await;

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert!(response.result.is_empty(), "zero-valued result should not be shipped");
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn backoff_should_end_early_on_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let started = tokio::time::Instant::now();
        assert!(accept_backoff(&cancel).await, "cancelled backoff should report cancellation");
        assert!(started.elapsed() < ACCEPT_BACKOFF);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_should_wait_before_next_accept() {
        let cancel = CancellationToken::new();

        let started = tokio::time::Instant::now();
        assert!(!accept_backoff(&cancel).await, "backoff should not report cancellation");
        assert!(started.elapsed() >= ACCEPT_BACKOFF);
    }
}
