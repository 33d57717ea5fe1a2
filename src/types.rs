use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::Error;

/// Prefix of legacy sequence type names, as in `*[]models.Account`.
pub const LEGACY_SEQUENCE_PREFIX: &str = "*[]models.";

/// String parameters sent as a form body (`POST`/`PUT`) or a query string.
///
/// Keys are unique; inserting an existing key replaces its value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Whether a result container holds one model or an ordered sequence of them.
#[non_exhaustive]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Shape {
    #[default]
    Single,
    Sequence,
}

/// Wire discriminant naming the container a proxied call must be decoded into.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ResultType {
    pub model: String,
    #[serde(default)]
    pub shape: Shape,
}

impl ResultType {
    pub fn single<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
            shape: Shape::Single,
        }
    }

    pub fn sequence<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
            shape: Shape::Sequence,
        }
    }

    /// Parses the Go-style name: `*[]models.Account` is a sequence of `Account`,
    /// anything else names a single model.
    pub fn from_legacy_name(name: &str) -> Result<Self> {
        let name = name.trim();
        let result_type = match name.strip_prefix(LEGACY_SEQUENCE_PREFIX) {
            Some(model) => Self::sequence(model),
            None => Self::single(name),
        };
        if result_type.model.is_empty() {
            return Err(Error::validation(format!(
                "result type name `{name}` has no model"
            )));
        }
        Ok(result_type)
    }

    #[must_use]
    pub fn legacy_name(&self) -> String {
        match self.shape {
            Shape::Single => self.model.clone(),
            Shape::Sequence => format!("{LEGACY_SEQUENCE_PREFIX}{}", self.model),
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            Shape::Single => f.write_str(&self.model),
            Shape::Sequence => write!(f, "[{}]", self.model),
        }
    }
}

impl FromStr for ResultType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ResultType::from_legacy_name(s)
    }
}
