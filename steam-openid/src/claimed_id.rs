//! Claimed identifier shape validation and SteamID extraction.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{OpenIdError, Result};

/// Digit count accepted in a claimed identifier.
const ID_DIGITS: std::ops::RangeInclusive<usize> = 15..=25;

/// A verified SteamID64, kept as its decimal digit string.
///
/// Deserializing runs the same digit-count check as claimed-id parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SteamId(String);

impl SteamId {
    /// Validate a claimed identifier URL and extract its numeric id.
    ///
    /// # Errors
    ///
    /// Returns [`OpenIdError::MalformedClaimedId`] unless `claimed_id` matches
    /// `^(http|https)://<host>/openid/id/<15-25 digits>$` for an allowed host.
    pub fn from_claimed_id(claimed_id: &str, pattern: &Regex) -> Result<Self> {
        let id = pattern
            .captures(claimed_id)
            .and_then(|caps| caps.name("id"))
            .ok_or_else(|| OpenIdError::MalformedClaimedId(claimed_id.to_string()))?;
        Ok(Self(digits(id.as_str())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, when it fits in 64 bits.
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

impl TryFrom<String> for SteamId {
    type Error = OpenIdError;

    fn try_from(value: String) -> Result<Self> {
        if ID_DIGITS.contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value))
        } else {
            Err(OpenIdError::MalformedClaimedId(value))
        }
    }
}

impl From<SteamId> for String {
    fn from(id: SteamId) -> Self {
        id.0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SteamId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
