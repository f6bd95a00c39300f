//! Remembered login passwords in the OS keychain.
//!
//! One keychain service per API base URL, one entry per email, so two
//! backends never share a password.

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

const SERVICE_PREFIX: &str = "volunteer-map";

#[derive(Error, Debug)]
#[error("Keychain error for {email}: {source}")]
pub struct CredentialError {
    pub email: String,
    #[source]
    pub source: keyring::Error,
}

/// Passwords remembered for one API backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStore {
    service: String,
}

impl CredentialStore {
    pub fn for_api(base_url: &str) -> Self {
        Self {
            service: service_name(base_url),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, email: &str) -> Result<Entry, CredentialError> {
        Entry::new(&self.service, email).map_err(|source| keychain_error(email, source))
    }

    pub fn remember(&self, email: &str, password: &str) -> Result<(), CredentialError> {
        self.entry(email)?
            .set_password(password)
            .map_err(|source| keychain_error(email, source))?;
        debug!(service = %self.service, "Password remembered");
        Ok(())
    }

    /// The remembered password, Ok(None) when nothing is stored for `email`
    pub fn password(&self, email: &str) -> Result<Option<String>, CredentialError> {
        missing_as_none(email, self.entry(email)?.get_password())
    }

    /// Delete the remembered password. Ok(false) when there was none.
    pub fn forget(&self, email: &str) -> Result<bool, CredentialError> {
        let removed = missing_as_none(email, self.entry(email)?.delete_credential())?;
        Ok(removed.is_some())
    }
}

fn service_name(base_url: &str) -> String {
    format!(
        "{}@{}",
        SERVICE_PREFIX,
        base_url.trim().trim_end_matches('/').to_ascii_lowercase()
    )
}

fn keychain_error(email: &str, source: keyring::Error) -> CredentialError {
    CredentialError {
        email: email.to_string(),
        source,
    }
}

/// `NoEntry` is an answer, not a failure
fn missing_as_none<T>(
    email: &str,
    result: Result<T, keyring::Error>,
) -> Result<Option<T>, CredentialError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(source) => Err(keychain_error(email, source)),
    }
}
