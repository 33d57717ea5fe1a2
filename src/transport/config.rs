use url::Url;

use crate::Result;
use crate::error::Error;
use crate::{API_VERSION, SERVICE};

/// Where the API lives and which service the session logs in to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct TransportConfig {
    pub root: Url,
    pub version: String,
    pub service: String,
}

impl TransportConfig {
    /// Parses `root` and validates the remaining values, e.g. from app-level config.
    pub fn from_raw(root: &str, version: &str, service: &str) -> Result<Self> {
        let root = Url::parse(root)
            .map_err(|e| Error::validation(format!("invalid API root `{root}`: {e}")))?;

        Self::new(root, version, service)
    }

    /// Configuration for `root` with the current API version and default service.
    pub fn for_root(root: &str) -> Result<Self> {
        Self::from_raw(root, API_VERSION, SERVICE)
    }

    pub fn new<V: Into<String>, S: Into<String>>(root: Url, version: V, service: S) -> Result<Self> {
        let version = version.into();
        let service = service.into();

        if !matches!(root.scheme(), "http" | "https") {
            return Err(Error::validation(format!(
                "API root must be http or https, got `{}`",
                root.scheme()
            )));
        }
        if root.cannot_be_a_base() {
            return Err(Error::validation(format!(
                "API root `{root}` cannot carry a path"
            )));
        }
        let version = version.trim_matches('/').to_owned();
        if version.is_empty() {
            return Err(Error::validation("API version must not be empty"));
        }
        if service.trim().is_empty() {
            return Err(Error::validation("service identifier must not be empty"));
        }

        Ok(Self {
            root,
            version,
            service,
        })
    }

    /// `{root}/{version}`, the base every request path is appended to.
    pub fn base_url(&self) -> Result<Url> {
        let mut base = self.root.clone();
        base.path_segments_mut()
            .map_err(|()| Error::validation(format!("API root `{}` cannot carry a path", self.root)))?
            .pop_if_empty()
            .push(&self.version);
        Ok(base)
    }
}
