//! Wallet accounts and their display form.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Addresses shorter than this are shown as-is.
const MIN_SHORTENED_LEN: usize = 10;
const PREFIX_CHARS: usize = 6;
const SUFFIX_CHARS: usize = 4;

/// Account identifier supplied by the wallet provider.
///
/// Treated as opaque: usually a (possibly checksummed) hex address, but no
/// structure beyond "non-empty string" is assumed.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(String);

impl Account {
    /// Creates an account, rejecting empty identifiers.
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        if address.trim().is_empty() {
            None
        } else {
            Some(Self(address))
        }
    }

    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the shortened display form.
    pub fn short(&self) -> String {
        format_address(&self.0)
    }
}

impl AsRef<str> for Account {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Truncates an address for display as `0x1234...abcd`.
///
/// Inputs shorter than ten characters are returned unchanged.
pub fn format_address(address: &str) -> String {
    let len = address.chars().count();
    if len < MIN_SHORTENED_LEN {
        return address.to_string();
    }

    let head: String = address.chars().take(PREFIX_CHARS).collect();
    let tail: String = address.chars().skip(len - SUFFIX_CHARS).collect();
    format!("{head}...{tail}")
}
