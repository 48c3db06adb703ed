//! Dotted version numbers with open-ended sentinels
//!
//! A [`Version`] is either one of the two sentinels ([`Version::ZERO`],
//! [`Version::INFINITY`]) used as open bounds, or a parsed sequence of
//! dot-separated tokens. Variant order gives `ZERO < parsed < INFINITY`
//! without special cases at comparison sites.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("Version string is empty")]
    Empty,

    #[error("Invalid version token '{token}' in '{version}'")]
    InvalidToken { version: String, token: String },

    #[error("Version number '{token}' in '{version}' is too large")]
    NumberTooLarge { version: String, token: String },
}

/// One dot-separated component of a version, e.g. `10` or `0-beta`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Leading decimal number, if the token starts with a digit
    number: Option<u64>,
    /// Everything after the leading number
    qualifier: String,
}

impl Token {
    fn parse(version: &str, raw: &str) -> Result<Self, VersionParseError> {
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'));
        if !valid {
            return Err(VersionParseError::InvalidToken {
                version: version.to_string(),
                token: raw.to_string(),
            });
        }

        let digits = raw.chars().take_while(|c| c.is_ascii_digit()).count();
        let (number, qualifier) = raw.split_at(digits);
        let number = if number.is_empty() {
            None
        } else {
            Some(
                number
                    .parse::<u64>()
                    .map_err(|_| VersionParseError::NumberTooLarge {
                        version: version.to_string(),
                        token: raw.to_string(),
                    })?,
            )
        };

        Ok(Self {
            number,
            qualifier: qualifier.to_string(),
        })
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        // A bare number outranks the same number with a qualifier: 0-beta < 0
        let qualifiers = match (self.qualifier.is_empty(), other.qualifier.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.qualifier.cmp(&other.qualifier),
        };
        self.number.cmp(&other.number).then(qualifiers)
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(number) = self.number {
            write!(f, "{}", number)?;
        }
        f.write_str(&self.qualifier)
    }
}

/// A module version, totally ordered
///
/// Variant order matters: the derived `Ord` ranks `Zero` below and
/// `Infinity` above every parsed version. Parsed versions compare token by
/// token, and a proper prefix is smaller (`1.0` < `1.0.0`), which is exactly
/// the lexicographic order of `Vec`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
    Zero,
    Parsed(Vec<Token>),
    Infinity,
}

impl Version {
    /// Lower than every parseable version
    pub const ZERO: Version = Version::Zero;
    /// Higher than every parseable version
    pub const INFINITY: Version = Version::Infinity;

    pub fn parse(version: &str) -> Result<Self, VersionParseError> {
        if version.is_empty() {
            return Err(VersionParseError::Empty);
        }

        version
            .split('.')
            .map(|token| Token::parse(version, token))
            .collect::<Result<Vec<_>, _>>()
            .map(Version::Parsed)
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Version::Parsed(_))
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Zero => f.write_str("0"),
            Version::Infinity => f.write_str("infinity"),
            Version::Parsed(tokens) => {
                for (i, token) in tokens.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{}", token)?;
                }
                Ok(())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}
