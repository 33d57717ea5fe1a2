use async_trait::async_trait;
use reqwest::Method;

use crate::Result;
use crate::error::{Error, INVALID_SESSION};
use crate::models::Login;
use crate::registry::Payload;
use crate::transport::{LOGIN_PATH, Transport};
use crate::types::Params;

/// Which API error codes mean "log in again and retry".
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ReauthPolicy {
    pub invalid_session_codes: Vec<String>,
}

impl Default for ReauthPolicy {
    fn default() -> Self {
        Self {
            invalid_session_codes: vec![INVALID_SESSION.to_owned()],
        }
    }
}

impl ReauthPolicy {
    #[must_use]
    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.invalid_session_codes.push(code.into());
        self
    }

    pub(crate) fn should_reauthenticate(&self, err: &Error) -> bool {
        err.api_error().is_some_and(|api_error| {
            self.invalid_session_codes
                .iter()
                .any(|code| *code == api_error.code)
        })
    }
}

/// Decorator that recovers from an expired session.
///
/// When the wrapped transport reports an invalid session, it logs in once
/// (`POST login` without parameters, which lets a session-aware transport
/// obtain fresh credentials) and retries the call once. Any error after that,
/// including a failed login, is returned as is.
#[derive(Clone, Debug)]
pub struct Reauthenticating<T> {
    inner: T,
    policy: ReauthPolicy,
}

impl<T: Transport> Reauthenticating<T> {
    pub fn new(inner: T) -> Self {
        Self::with_policy(inner, ReauthPolicy::default())
    }

    pub fn with_policy(inner: T, policy: ReauthPolicy) -> Self {
        Self { inner, policy }
    }

    #[must_use]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for Reauthenticating<T> {
    async fn perform(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        result: &mut dyn Payload,
    ) -> Result<()> {
        let err = match self
            .inner
            .perform(method.clone(), path, params, result)
            .await
        {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        let is_login = method == Method::POST && path.trim_matches('/') == LOGIN_PATH;
        if is_login || !self.policy.should_reauthenticate(&err) {
            return Err(err);
        }

        #[cfg(feature = "tracing")]
        tracing::info!(method = %method, path = %path, error = %err, "session invalid, logging in again");

        let mut login = Login::default();
        self.inner
            .perform(Method::POST, LOGIN_PATH, None, &mut login)
            .await?;

        self.inner.perform(method, path, params, result).await
    }
}
