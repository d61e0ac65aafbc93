// Credential handling: the user's provider API key and its obfuscated transit form.
// The key only leaves the process as an `ObfuscatedToken`, produced fresh per request.

pub mod codec;

use std::fmt;

pub use codec::obfuscate;

/// The user's secret provider API key. Never logged, never serialized.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

/// Transit form of a `Credential`, decodable only with the shared passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObfuscatedToken(String);

impl ObfuscatedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
