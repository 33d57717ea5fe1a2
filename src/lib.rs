#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod client;
pub mod credentials;
pub mod error;
pub mod models;
#[cfg(feature = "proxy")]
pub mod proxy;
pub mod registry;
mod serde_helpers;
pub mod transport;
pub mod types;

pub use client::Client;
pub use error::{Error, Kind as ErrorKind};
pub use types::{Params, ResultType, Shape};

pub type Result<T> = std::result::Result<T, Error>;

/// Production API root.
pub const BASE_URL: &str = "https://api.nordnet.se/next";
/// Test system root. Safe to experiment against.
pub const TEST_BASE_URL: &str = "https://api.test.nordnet.se/next";
pub const API_VERSION: &str = "2";
/// Service identifier sent with every login.
pub const SERVICE: &str = "NEXTAPI";
