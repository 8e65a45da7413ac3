//! Error taxonomy for fetching and decoding METAR reports.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetarError {
    /// Station or time group could not be parsed; no partial result exists.
    #[error("Malformed METAR report: {reason}")]
    MalformedReport { reason: String },

    /// The upstream source has nothing for this station.
    #[error("No METAR data found for station {station}")]
    NoData { station: String },

    /// Network failure, timeout, or an unexpected upstream status.
    #[error("Upstream weather source unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// Requested station code is not 4 alphanumeric characters.
    #[error("Invalid station code '{input}': must be 4 letters or digits")]
    InvalidStation { input: String },
}

impl MetarError {
    pub fn malformed<S: Into<String>>(reason: S) -> Self {
        Self::MalformedReport { reason: reason.into() }
    }

    pub fn no_data<S: Into<String>>(station: S) -> Self {
        Self::NoData { station: station.into() }
    }

    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable { message: message.into() }
    }

    /// Plain-language message safe to show to end users.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            MetarError::MalformedReport { .. } => {
                "Error decoding METAR: the report could not be read.".to_string()
            }
            MetarError::NoData { station } => {
                format!("No METAR data found for airport code: {station}")
            }
            MetarError::UpstreamUnavailable { .. } => {
                "Failed to fetch METAR data. Please try again later.".to_string()
            }
            MetarError::InvalidStation { input } if input.trim().is_empty() => {
                "Please enter an airport code".to_string()
            }
            MetarError::InvalidStation { .. } => {
                "Airport code must be 4 characters (e.g., VOMM, KJFK)".to_string()
            }
        }
    }
}
