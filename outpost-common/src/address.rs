use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

/// Matches a standard mailbox address: local part, `@`, dotted domain.
#[allow(clippy::unwrap_used, reason = "Pattern is a compile-time constant")]
static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$").unwrap()
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid email address: {0}")]
pub struct InvalidAddress(pub String);

/// A validated, lower-cased email address.
///
/// Addresses are normalized to lower case at construction, so two
/// addresses differing only in case compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and normalize an address.
    ///
    /// # Errors
    /// If the input does not match the mailbox pattern.
    pub fn parse(input: &str) -> Result<Self, InvalidAddress> {
        let normalized = input.trim().to_lowercase();
        if ADDRESS_PATTERN.is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(InvalidAddress(input.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The domain half of the address. Construction guarantees an `@`
    /// is present.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EmailAddress {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for EmailAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
