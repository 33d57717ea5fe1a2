use std::any::Any;
use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use futures::lock::Mutex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Method, Request, StatusCode};
use secrecy::ExposeSecret as _;
use url::Url;

use crate::Result;
use crate::credentials::CredentialsProvider;
use crate::error::{ApiError, Error};
use crate::models::{LoggedInStatus, Login};
use crate::registry::Payload;
use crate::serde_helpers;
use crate::transport::{LOGIN_PATH, Transport, TransportConfig, TransportExt as _};
use crate::types::Params;

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_LANGUAGE_EN: &str = "en";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

const AUTH_PARAM: &str = "auth";
const SERVICE_PARAM: &str = "service";

/// Snapshot of the login session owned by an [`HttpTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Session {
    pub base_url: Url,
    pub service: String,
    /// Absent until the first successful login, and again after a logout.
    pub login_state: Option<Login>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_usage_at: Option<DateTime<Utc>>,
}

impl Session {
    fn session_key(&self) -> Option<&str> {
        self.login_state
            .as_ref()
            .map(|login| login.session_key.as_str())
            .filter(|key| !key.is_empty())
    }
}

/// Session-aware transport speaking to the nExt REST API.
///
/// Session state sits behind a lock that is never held across a request, so
/// ordinary calls run concurrently. Logins are serialized by a separate async
/// lock: concurrent [`HttpTransport::login`] callers perform at most one
/// network login and the rest reuse its result after a touch.
pub struct HttpTransport {
    config: TransportConfig,
    credentials: Arc<dyn CredentialsProvider>,
    session: RwLock<Session>,
    login_lock: Mutex<()>,
    client: ReqwestClient,
}

impl HttpTransport {
    pub fn new<C: CredentialsProvider + 'static>(
        config: TransportConfig,
        credentials: C,
    ) -> Result<Self> {
        Self::with_client(config, credentials, ReqwestClient::new())
    }

    /// Creates a transport that sends requests through a custom HTTP client.
    pub fn with_client<C: CredentialsProvider + 'static>(
        config: TransportConfig,
        credentials: C,
        client: ReqwestClient,
    ) -> Result<Self> {
        let session = Session {
            base_url: config.base_url()?,
            service: config.service.clone(),
            login_state: None,
            expires_at: None,
            last_usage_at: None,
        };

        Ok(Self {
            config,
            credentials: Arc::new(credentials),
            session: RwLock::new(session),
            login_lock: Mutex::new(()),
            client,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn session(&self) -> Result<Session> {
        self.read_session(Session::clone)
    }

    pub fn login_state(&self) -> Result<Option<Login>> {
        self.read_session(|session| session.login_state.clone())
    }

    /// Logs in, reusing the cached session when a touch confirms it is alive.
    ///
    /// A touch that fails or reports `logged_in == false` falls through to a
    /// fresh login with new credentials.
    pub async fn login(&self) -> Result<Login> {
        let _guard = self.login_lock.lock().await;

        if let Some(cached) = self.login_state()? {
            match self.call::<LoggedInStatus>(Method::PUT, LOGIN_PATH, None).await {
                Ok(status) if status.logged_in => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("session still valid, reusing cached login");
                    return Ok(self.login_state()?.unwrap_or(cached));
                }
                Ok(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("session expired, logging in again");
                }
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(error = %_err, "touch failed, logging in again");
                }
            }
        }

        self.fresh_login().await
    }

    /// Logs in with new credentials without checking the cached session first.
    pub async fn force_login(&self) -> Result<Login> {
        let _guard = self.login_lock.lock().await;
        self.fresh_login().await
    }

    /// Keeps the session alive. Any successful call does the same.
    pub async fn touch(&self) -> Result<LoggedInStatus> {
        self.call(Method::PUT, LOGIN_PATH, None).await
    }

    /// Invalidates the session remotely and drops the cached login state.
    pub async fn logout(&self) -> Result<LoggedInStatus> {
        self.call(Method::DELETE, LOGIN_PATH, None).await
    }

    async fn fresh_login(&self) -> Result<Login> {
        let auth = self.credentials.credentials()?;
        let params = Params::new()
            .with(AUTH_PARAM, auth.expose_secret())
            .with(SERVICE_PARAM, self.config.service.as_str());

        let mut login = Login::default();
        self.execute(Method::POST, LOGIN_PATH, Some(&params), &mut login)
            .await?;

        let now = Utc::now();
        self.update_session(|session| {
            session.login_state = Some(login.clone());
            session.expires_at = expiry(&login, now);
        })?;

        #[cfg(feature = "tracing")]
        tracing::info!(environment = %login.environment, "logged in");

        Ok(login)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self, params, result),
            fields(status_code)
        )
    )]
    async fn execute(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        result: &mut dyn Payload,
    ) -> Result<()> {
        let session_key = self.read_session(|session| session.session_key().map(str::to_owned))?;
        let request = self.build_request(&method, path, params, session_key.as_deref())?;

        let response = self.client.execute(request).await?;
        let status_code = response.status();

        let now = Utc::now();
        self.update_session(|session| {
            session.last_usage_at = Some(now);
            if status_code.is_success() {
                if let Some(login) = &session.login_state {
                    session.expires_at = expiry(login, now);
                }
            }
        })?;

        let body = response.bytes().await?;

        #[cfg(feature = "tracing")]
        {
            tracing::Span::current().record("status_code", status_code.as_u16());
            if !status_code.is_success() {
                tracing::warn!(
                    status = %status_code,
                    method = %method,
                    path = %path,
                    request = %redacted(params),
                    response = %String::from_utf8_lossy(&body),
                    "API request failed"
                );
            }
        }

        classify(status_code, &body, result)
    }

    fn build_request(
        &self,
        method: &Method,
        path: &str,
        params: Option<&Params>,
        session_key: Option<&str>,
    ) -> Result<Request> {
        let mut url = self.read_session(|session| session.base_url.clone())?;
        let path = path.trim_matches('/');
        if !path.is_empty() {
            url.path_segments_mut()
                .map_err(|()| Error::validation("base URL cannot carry a path"))?
                .pop_if_empty()
                .extend(path.split('/'));
        }

        let has_body = *method == Method::POST || *method == Method::PUT;
        if !has_body {
            if let Some(params) = params.filter(|params| !params.is_empty()) {
                url.query_pairs_mut().extend_pairs(params.iter());
            }
        }

        let mut builder = self
            .client
            .request(method.clone(), url)
            .header(ACCEPT, ACCEPT_JSON)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_EN)
            .header(CONTENT_TYPE, FORM_URLENCODED);

        if has_body {
            let body = match params {
                Some(params) => serde_html_form::to_string(params)?,
                None => String::new(),
            };
            builder = builder.body(body);
        }

        if let Some(key) = session_key {
            builder = builder.basic_auth(key, Some(key));
        }

        Ok(builder.build()?)
    }

    fn read_session<R, F: FnOnce(&Session) -> R>(&self, read: F) -> Result<R> {
        let session = self
            .session
            .read()
            .map_err(|_poisoned| Error::synchronization("session state lock poisoned"))?;
        Ok(read(&session))
    }

    fn update_session<F: FnOnce(&mut Session)>(&self, update: F) -> Result<()> {
        let mut session = self
            .session
            .write()
            .map_err(|_poisoned| Error::synchronization("session state lock poisoned"))?;
        update(&mut session);
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        result: &mut dyn Payload,
    ) -> Result<()> {
        let is_login_path = path.trim_matches('/') == LOGIN_PATH;

        if is_login_path && method == Method::POST && params.is_none() {
            if let Some(login) = (&mut *result as &mut dyn Any).downcast_mut::<Login>() {
                *login = self.login().await?;
                return Ok(());
            }

            #[cfg(feature = "tracing")]
            tracing::warn!(
                result_type = %result.result_type(),
                "login called without a Login container, skipping session reuse"
            );
        }

        self.execute(method.clone(), path, params, result).await?;

        if is_login_path && method == Method::DELETE {
            self.update_session(|session| {
                session.login_state = None;
                session.expires_at = None;
            })?;
        }

        Ok(())
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Maps a response status to the outcome of the call.
///
/// `204` leaves `result` untouched, `400`/`401`/`404` carry an [`ApiError`],
/// `429` is reported without looking at the body, and anything else is
/// decoded into `result`.
fn classify(status_code: StatusCode, body: &[u8], result: &mut dyn Payload) -> Result<()> {
    match status_code {
        StatusCode::NO_CONTENT => Ok(()),
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
            let api_error: ApiError = serde_helpers::from_slice(body)?;
            Err(api_error.into())
        }
        StatusCode::TOO_MANY_REQUESTS => Err(Error::rate_limited()),
        _ => result.decode(body).map_err(Error::from),
    }
}

fn expiry(login: &Login, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if login.expires_in <= 0 {
        return None;
    }
    TimeDelta::try_seconds(login.expires_in).and_then(|ttl| from.checked_add_signed(ttl))
}

#[cfg(feature = "tracing")]
fn redacted(params: Option<&Params>) -> String {
    params
        .map(|params| {
            params
                .iter()
                .map(|(key, value)| {
                    if key == AUTH_PARAM {
                        format!("{key}=[REDACTED]")
                    } else {
                        format!("{key}={value}")
                    }
                })
                .collect::<Vec<_>>()
                .join("&")
        })
        .unwrap_or_default()
}
