use serde::{Serialize, Serializer};
use std::fmt;

use crate::MetarError;

/// A normalized ICAO station code: exactly 4 uppercase ASCII letters or digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationCode(String);

impl StationCode {
    /// Trim and uppercase user input, then validate it.
    pub fn parse(input: &str) -> Result<Self, MetarError> {
        let normalized = input.trim().to_ascii_uppercase();

        if is_station_token(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(MetarError::InvalidStation { input: input.to_string() })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// True for exactly 4 uppercase ASCII letters or digits.
pub(crate) fn is_station_token(token: &str) -> bool {
    token.len() == 4
        && token
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for StationCode {
    type Error = MetarError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for StationCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
