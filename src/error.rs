use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Code the remote API reports when the session key is unknown or expired.
pub const INVALID_SESSION: &str = "NEXT_INVALID_SESSION";

#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Network failure, or a response body that could not be decoded
    Io,
    /// Structured error reported by the remote API for `400`, `401` and `404`
    Api,
    /// Remote API answered `429 Too Many Requests`
    RateLimited,
    /// Proxy server was asked to build a result type it does not know
    UnknownResultType,
    /// Failure of the proxy channel itself, as opposed to an error carried through it
    Proxy,
    /// Error related to invalid configuration or arguments
    Validation,
    /// Error related to the shared session state lock
    Synchronization,
    /// Internal error from dependencies
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    /// The structured API error, if this error was produced by a `400`, `401` or `404`.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        self.downcast_ref::<ApiError>()
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.kind == Kind::RateLimited
    }

    #[must_use]
    pub fn is_invalid_session(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_invalid_session)
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Validation {
            reason: message.into(),
        }
        .into()
    }

    pub fn api<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        ApiError {
            code: code.into(),
            message: message.into(),
        }
        .into()
    }

    #[must_use]
    pub fn rate_limited() -> Self {
        RateLimited.into()
    }

    pub fn unknown_result_type<S: Into<String>>(result_type: S) -> Self {
        UnknownResultType {
            result_type: result_type.into(),
        }
        .into()
    }

    pub fn proxy<S: StdError + Send + Sync + 'static>(source: S) -> Self {
        Self::with_source(Kind::Proxy, source)
    }

    pub fn proxy_message<S: Into<String>>(message: S) -> Self {
        Self::with_source(
            Kind::Proxy,
            Channel {
                reason: message.into(),
            },
        )
    }

    pub fn synchronization<S: Into<String>>(message: S) -> Self {
        Self::with_source(
            Kind::Synchronization,
            Synchronization {
                reason: message.into(),
            },
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Error body returned by the remote API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn is_invalid_session(&self) -> bool {
        self.code == INVALID_SESSION
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl StdError for ApiError {}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimited;

impl fmt::Display for RateLimited {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("too many requests")
    }
}

impl StdError for RateLimited {}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownResultType {
    pub result_type: String,
}

impl fmt::Display for UnknownResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown result type `{}`", self.result_type)
    }
}

impl StdError for UnknownResultType {}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub reason: String,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proxy channel: {}", self.reason)
    }
}

impl StdError for Channel {}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Synchronization {
    pub reason: String,
}

impl fmt::Display for Synchronization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "synchronization error: {}", self.reason)
    }
}

impl StdError for Synchronization {}

/// An error that happened on the far side of the proxy and has no typed
/// counterpart locally. Only its message survives the trip.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Remote {
    pub message: String,
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Remote {}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::with_source(Kind::Api, err)
    }
}

impl From<RateLimited> for Error {
    fn from(err: RateLimited) -> Self {
        Error::with_source(Kind::RateLimited, err)
    }
}

impl From<UnknownResultType> for Error {
    fn from(err: UnknownResultType) -> Self {
        Error::with_source(Kind::UnknownResultType, err)
    }
}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::with_source(Kind::Io, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Io, e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::with_source(Kind::Io, e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<serde_html_form::ser::Error> for Error {
    fn from(e: serde_html_form::ser::Error) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}
