use std::fmt;

use secrecy::SecretString;

use crate::Result;

/// Source of the pre-encrypted `auth` blob sent with `POST login`.
///
/// The blob is opaque here: producing it (RSA encryption of user, password and
/// timestamp with the service's public key) is the provider's business. A
/// provider is asked again for every fresh login, so it may embed a timestamp.
pub trait CredentialsProvider: Send + Sync {
    fn credentials(&self) -> Result<SecretString>;
}

impl<F> CredentialsProvider for F
where
    F: Fn() -> Result<SecretString> + Send + Sync,
{
    fn credentials(&self) -> Result<SecretString> {
        self()
    }
}

/// A provider that always hands out the same blob.
#[derive(Clone)]
pub struct StaticCredentials(SecretString);

impl StaticCredentials {
    pub fn new<S: Into<String>>(auth: S) -> Self {
        Self(SecretString::from(auth.into()))
    }
}

impl CredentialsProvider for StaticCredentials {
    fn credentials(&self) -> Result<SecretString> {
        Ok(self.0.clone())
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticCredentials").field(&"[REDACTED]").finish()
    }
}
