use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    MetarError, StationCode, decoder,
    model::{DecodedReport, RawReport},
    render,
};

/// Response shape shared by the web page and the JSON endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherReport {
    pub airport_code: StationCode,
    pub raw_metar: String,
    pub decoded: DecodedSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedSummary {
    pub summary: String,
    pub details: Vec<String>,
    pub station: String,
    /// `YYYY-MM-DD HH:MM UTC`
    pub time: String,
}

impl WeatherReport {
    pub fn new(raw: &RawReport, decoded: &DecodedReport) -> Self {
        let rendered = render::render(decoded);

        Self {
            airport_code: raw.station.clone(),
            raw_metar: raw.raw_text.clone(),
            decoded: DecodedSummary {
                summary: rendered.summary,
                details: rendered.details,
                station: decoded.station.clone(),
                time: decoded.observed_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            },
        }
    }
}

/// Decode `raw` and shape it into a [`WeatherReport`].
pub fn build_report(raw: &RawReport) -> Result<WeatherReport, MetarError> {
    build_report_at(raw, Utc::now())
}

pub fn build_report_at(
    raw: &RawReport,
    reference: DateTime<Utc>,
) -> Result<WeatherReport, MetarError> {
    let decoded = decoder::parse_at(&raw.raw_text, reference)?;
    Ok(WeatherReport::new(raw, &decoded))
}
