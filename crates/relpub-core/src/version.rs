//! Version tokens.
//!
//! Dated resources are versioned by an 8-digit `YYYYMMDD` token, either
//! embedded in the artifact filename (`name_20250110.db.gzip`) or declared
//! by the upstream feed. The engine never orders tokens; it only compares
//! them for equality against the previously published token.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::CoreError;

/// A validated 8-digit `YYYYMMDD` date token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateToken(String);

impl DateToken {
    /// Parse a token, requiring exactly 8 ASCII digits.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(CoreError::InvalidDateToken(s.to_string()))
        }
    }

    /// Format a calendar date as a token.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y%m%d").to_string())
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Find an embedded `_YYYYMMDD` token in a filename.
    ///
    /// The eight digits must end at a non-digit boundary, so a longer digit
    /// run (`_123456789`) is not mistaken for a date.
    pub fn find_in_filename(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            if b != b'_' {
                continue;
            }
            let digits = &bytes[i + 1..];
            if digits.len() < 8 || !digits[..8].iter().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if digits.get(8).is_some_and(|b| b.is_ascii_digit()) {
                continue;
            }
            // Safe: the matched range is pure ASCII.
            return Some(Self(name[i + 1..i + 9].to_string()));
        }
        None
    }
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DateToken {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<DateToken> for String {
    fn from(token: DateToken) -> Self {
        token.0
    }
}

/// The version resolved for one resource, as seen by the change detector.
///
/// `digest` is present for hash-versioned resources (primary variants,
/// compressed bundles) and absent for pure date-token resources: a dated
/// feed is versioned solely by its token and its content is never diffed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Resource key: a variant tag or a resource name.
    pub resource_key: String,
    /// The resolved version token.
    pub token: String,
    /// Payload digest, when the resource is hash-versioned.
    pub digest: Option<ContentDigest>,
}
