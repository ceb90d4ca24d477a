//! Credential resolution.
//!
//! Each vendor needs one or more credential/region values. Lookup tries the
//! OS keyring first and falls back to the process environment under the same
//! name; a missing required value fails fast with
//! [`Error::Configuration`](crate::Error::Configuration) before any network
//! call is made.

use keyring::Entry;

use crate::error::Error;
use crate::Result;

const KEYRING_SERVICE: &str = "prompt-relay";

fn lookup(name: &str) -> Option<String> {
    if let Ok(entry) = Entry::new(KEYRING_SERVICE, name) {
        if let Ok(secret) = entry.get_password() {
            return Some(secret);
        }
    }
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Resolve a required credential for `provider`.
pub(crate) fn require(provider: &'static str, name: &str) -> Result<String> {
    lookup(name).ok_or_else(|| {
        Error::configuration(format!("{name} is not available (required for {provider})"))
    })
}
