//! Request and response envelopes exchanged over the proxy channel.
//!
//! Each envelope is a JSON document in its own length-delimited frame.

use bytes::Bytes;
use futures::{SinkExt as _, StreamExt as _};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::{DisplayFromStr, serde_as};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use uuid::Uuid;

use crate::Result;
use crate::error::{ApiError, Error, Kind, RateLimited, Remote, UnknownResultType};
use crate::types::{Params, ResultType};

pub(crate) type Channel = Framed<TcpStream, LengthDelimitedCodec>;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CallRequest {
    pub id: Uuid,
    #[serde_as(as = "DisplayFromStr")]
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    pub result_type: ResultType,
}

impl CallRequest {
    pub fn new(
        method: Method,
        path: &str,
        params: Option<&Params>,
        result_type: ResultType,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.to_owned(),
            params: params.cloned(),
            result_type,
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CallResponse {
    pub id: Uuid,
    /// JSON encoding of the container the server rebuilt, attached even when
    /// the wrapped call failed. Empty when no container could be built or the
    /// wrapped transport left it at its zero value.
    #[serde_as(as = "Base64")]
    pub result: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
}

/// An error returned by the wrapped transport, in a form that crosses the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct RemoteError {
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

impl From<&Error> for RemoteError {
    fn from(err: &Error) -> Self {
        if let Some(api_error) = err.api_error() {
            return Self {
                kind: err.kind(),
                code: Some(api_error.code.clone()),
                message: api_error.message.clone(),
            };
        }
        if let Some(unknown) = err.downcast_ref::<UnknownResultType>() {
            return Self {
                kind: err.kind(),
                code: None,
                message: unknown.result_type.clone(),
            };
        }

        Self {
            kind: err.kind(),
            code: None,
            message: err
                .inner()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

impl RemoteError {
    /// Rebuilds the error with the kind and, where one exists, the typed source
    /// it had on the server.
    #[must_use]
    pub fn into_error(self) -> Error {
        match self.kind {
            Kind::Api => ApiError {
                code: self.code.unwrap_or_default(),
                message: self.message,
            }
            .into(),
            Kind::RateLimited => RateLimited.into(),
            Kind::UnknownResultType => Error::unknown_result_type(self.message),
            kind => Error::with_source(
                kind,
                Remote {
                    message: self.message,
                },
            ),
        }
    }
}

pub(crate) fn channel(stream: TcpStream, max_frame_length: usize) -> Channel {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(max_frame_length)
        .new_codec();
    Framed::new(stream, codec)
}

pub(crate) async fn write_frame<T: Serialize>(channel: &mut Channel, envelope: &T) -> Result<()> {
    let frame = serde_json::to_vec(envelope).map_err(Error::proxy)?;
    channel
        .send(Bytes::from(frame))
        .await
        .map_err(Error::proxy)
}

/// Reads the next envelope; `None` when the peer closed the connection.
pub(crate) async fn read_frame<T: DeserializeOwned>(channel: &mut Channel) -> Result<Option<T>> {
    match channel.next().await {
        Some(Ok(frame)) => serde_json::from_slice(&frame)
            .map(Some)
            .map_err(Error::proxy),
        Some(Err(err)) => Err(Error::proxy(err)),
        None => Ok(None),
    }
}
