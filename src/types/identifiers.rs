use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ADDRESS_HEX_LEN: usize = 40;

/// A 20-byte account address, always held as lowercase `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// # Errors
    /// Returns `Validation` when the input is not `0x` followed by 40 hex digits.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| RegistryError::Validation(format!("Address must start with 0x: {trimmed}")))?;

        if digits.len() != ADDRESS_HEX_LEN || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RegistryError::Validation(format!(
                "Address must be 20 bytes of hex: {trimmed}"
            )));
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// For constants already known to be well formed.
    pub(crate) fn from_static(raw: &'static str) -> Self {
        Self(raw.to_ascii_lowercase())
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Shortened `0x1234...abcd` form used in status lines.
    #[must_use]
    pub fn short(&self) -> String {
        let tail_start = self.0.len().saturating_sub(4);
        format!("{}...{}", &self.0[..6], &self.0[tail_start..])
    }
}

impl FromStr for AccountAddress {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<AccountAddress> for String {
    fn from(address: AccountAddress) -> Self {
        address.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(u64);

impl StudentId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Parses a decimal identifier as typed by a user.
    ///
    /// # Errors
    /// Returns `Validation` for empty, signed, fractional or oversized input.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::Validation(
                "Please enter a student ID".to_string(),
            ));
        }

        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| RegistryError::Validation(format!("Invalid student ID: {trimmed}")))
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentName(String);

impl StudentName {
    /// # Errors
    /// Returns `Validation` when the name is empty or only whitespace.
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(RegistryError::Validation(
                "Please enter a student name".to_string(),
            ));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash of a broadcast transaction, `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(String);

impl TxHash {
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
