//! The `perform` contract shared by the local HTTP transport and the proxy client.
//!
//! A transport issues one remote call and fills a caller-supplied container in
//! place, so the caller keeps its static type whether the call is served
//! locally or on the far side of a proxy:
//! - [`HttpTransport`] talks to the API and owns the login session
//! - [`Reauthenticating`] retries once after a fresh login on an invalid session
//! - `ProxyClient` (feature `proxy`) forwards the call to a `ProxyServer`

mod config;
mod http;
mod policy;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

pub use config::TransportConfig;
pub use http::{HttpTransport, Session};
pub use policy::{ReauthPolicy, Reauthenticating};

use crate::Result;
use crate::registry::Payload;
use crate::types::Params;

/// Path of the login resource: `POST` logs in, `PUT` touches, `DELETE` logs out.
pub const LOGIN_PATH: &str = "login";

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues `method path` with `params` and decodes the response into `result`.
    ///
    /// `None` params means no parameters were supplied; an empty [`Params`]
    /// still produces an explicit empty body or query.
    async fn perform(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        result: &mut dyn Payload,
    ) -> Result<()>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn perform(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        result: &mut dyn Payload,
    ) -> Result<()> {
        (**self).perform(method, path, params, result).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn perform(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        result: &mut dyn Payload,
    ) -> Result<()> {
        (**self).perform(method, path, params, result).await
    }
}

/// Typed convenience over [`Transport::perform`].
#[async_trait]
pub trait TransportExt: Transport {
    /// Performs the call into a fresh `R` and returns it.
    async fn call<R>(&self, method: Method, path: &str, params: Option<&Params>) -> Result<R>
    where
        R: Payload + Default,
    {
        let mut result = R::default();
        self.perform(method, path, params, &mut result).await?;
        Ok(result)
    }
}

impl<T: Transport + ?Sized> TransportExt for T {}
