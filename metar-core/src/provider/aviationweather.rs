use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::{MetarError, RawReport, StationCode};

use super::{MetarSource, ProviderId, check_status, http_client, raw_report};

/// aviationweather.gov data API: `GET <base>?ids=<CODE>&format=raw`.
#[derive(Debug, Clone)]
pub struct AviationWeatherProvider {
    base_url: String,
    http: Client,
}

impl AviationWeatherProvider {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self { base_url, http: http_client(timeout)? })
    }
}

#[async_trait]
impl MetarSource for AviationWeatherProvider {
    async fn fetch(&self, station: &StationCode) -> Result<RawReport, MetarError> {
        debug!(%station, url = %self.base_url, "requesting METAR from aviationweather.gov");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[("ids", station.as_str()), ("format", "raw")])
            .send()
            .await
            .map_err(|e| {
                MetarError::upstream(format!("Failed to send request to aviationweather.gov: {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            MetarError::upstream(format!("Failed to read aviationweather.gov response body: {e}"))
        })?;

        check_status(ProviderId::AviationWeather, station, status, &body)?;
        parse_body(station, &body)
    }
}

/// The API may return several reports, newest first; keep the first.
fn parse_body(station: &StationCode, body: &str) -> Result<RawReport, MetarError> {
    let first = body.lines().map(str::trim).find(|l| !l.is_empty());
    raw_report(station, first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kjfk() -> StationCode {
        StationCode::parse("KJFK").unwrap()
    }

    #[test]
    fn takes_newest_report() {
        let body = "\nKJFK 041851Z 31008KT 10SM FEW250 M04/M17 A3034\n\
                    KJFK 041751Z 30009KT 10SM FEW250 M03/M17 A3032\n";
        let raw = parse_body(&kjfk(), body).expect("report");

        assert_eq!(raw.raw_text, "KJFK 041851Z 31008KT 10SM FEW250 M04/M17 A3034");
        assert_eq!(raw.station, kjfk());
    }

    #[test]
    fn empty_body_is_no_data() {
        assert!(matches!(parse_body(&kjfk(), "\n\n"), Err(MetarError::NoData { .. })));
    }

    #[test]
    fn builds_with_timeout() {
        let provider = AviationWeatherProvider::new(
            ProviderId::AviationWeather.default_base_url().to_string(),
            Duration::from_secs(10),
        );
        assert!(provider.is_ok());
    }
}
