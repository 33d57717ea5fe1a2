use std::time::Duration;

use bon::Builder;

use crate::Result;
use crate::error::Error;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_ROUND_TRIP_MARGIN: Duration = Duration::from_secs(5);
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_CONNECTIONS: usize = 64;
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// Limits and deadlines for both ends of the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Builder)]
#[non_exhaustive]
pub struct ProxyConfig {
    /// How long the client waits for the TCP connection to be established.
    #[builder(default = DEFAULT_CONNECT_TIMEOUT)]
    pub connect_timeout: Duration,
    /// Deadline for the server's invocation of the wrapped transport. A call
    /// that runs out reports a timed out I/O error through the proxy.
    #[builder(default = DEFAULT_CALL_TIMEOUT)]
    pub call_timeout: Duration,
    /// Extra time the client waits on top of `call_timeout`, so that the
    /// server's verdict on a slow call arrives before the client gives up on
    /// the channel.
    #[builder(default = DEFAULT_ROUND_TRIP_MARGIN)]
    pub round_trip_margin: Duration,
    /// The server closes connections that send nothing for this long.
    #[builder(default = DEFAULT_IDLE_TIMEOUT)]
    pub idle_timeout: Duration,
    /// Connections beyond this many are dropped as soon as they are accepted.
    #[builder(default = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: usize,
    #[builder(default = DEFAULT_MAX_FRAME_LENGTH)]
    pub max_frame_length: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ProxyConfig {
    /// How long a client waits for the answer to one call.
    #[must_use]
    pub fn round_trip_timeout(&self) -> Duration {
        self.call_timeout.saturating_add(self.round_trip_margin)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::validation("max_connections must be at least 1"));
        }
        if self.max_frame_length == 0 {
            return Err(Error::validation("max_frame_length must be at least 1"));
        }
        for (name, value) in [
            ("connect_timeout", self.connect_timeout),
            ("call_timeout", self.call_timeout),
            ("round_trip_margin", self.round_trip_margin),
            ("idle_timeout", self.idle_timeout),
        ] {
            if value.is_zero() {
                return Err(Error::validation(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }
}
