use crate::{
    Config, MetarError, RawReport, StationCode, WeatherReport,
    provider::{aviationweather::AviationWeatherProvider, noaa::NoaaProvider},
    report,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::{convert::TryFrom, fmt::Debug, time::Duration};
use tracing::{info, warn};

pub mod aviationweather;
pub mod noaa;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    AviationWeather,
    Noaa,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::AviationWeather => "aviationweather",
            ProviderId::Noaa => "noaa",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::AviationWeather => "https://aviationweather.gov/api/data/metar",
            ProviderId::Noaa => "https://tgftp.nws.noaa.gov/data/observations/metar/stations",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::AviationWeather, ProviderId::Noaa]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "aviationweather" => Ok(ProviderId::AviationWeather),
            "noaa" => Ok(ProviderId::Noaa),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: aviationweather, noaa."
            )),
        }
    }
}

/// Upstream source of raw METAR text.
#[async_trait]
pub trait MetarSource: Send + Sync + Debug {
    /// Fetch the latest report for `station`.
    ///
    /// Fails with [`MetarError::NoData`] when the source has nothing for the
    /// station and [`MetarError::UpstreamUnavailable`] on transport errors.
    async fn fetch(&self, station: &StationCode) -> Result<RawReport, MetarError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn MetarSource>> {
    let base_url = config.base_url_for(id);
    let timeout = config.timeout();

    let boxed: Box<dyn MetarSource> = match id {
        ProviderId::AviationWeather => Box::new(AviationWeatherProvider::new(base_url, timeout)?),
        ProviderId::Noaa => Box::new(NoaaProvider::new(base_url, timeout)?),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn MetarSource>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

/// Fetch the latest report for `station` and decode it.
///
/// Decoding only starts once the fetch has succeeded.
pub async fn fetch_report(
    source: &dyn MetarSource,
    station: &StationCode,
) -> Result<WeatherReport, MetarError> {
    let raw = source.fetch(station).await.inspect_err(|err| {
        warn!(%station, error = %err, "METAR fetch failed");
    })?;

    let report = report::build_report(&raw).inspect_err(|err| {
        warn!(%station, raw = %raw.raw_text, error = %err, "METAR decode failed");
    })?;

    info!(%station, summary = %report.decoded.summary, "decoded METAR");
    Ok(report)
}

pub(crate) fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("metar-reader/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))
}

/// Map an upstream HTTP status to the error taxonomy; `Ok` means read the body.
pub(crate) fn check_status(
    id: ProviderId,
    station: &StationCode,
    status: StatusCode,
    body: &str,
) -> Result<(), MetarError> {
    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
        return Err(MetarError::no_data(station.as_str()));
    }

    if !status.is_success() {
        return Err(MetarError::upstream(format!(
            "{id} request failed with status {status}: {}",
            truncate_body(body)
        )));
    }

    Ok(())
}

/// Wrap a selected report line, treating blank or "No ..."/"Error ..." text as no data.
pub(crate) fn raw_report(
    station: &StationCode,
    line: Option<&str>,
) -> Result<RawReport, MetarError> {
    match line.map(str::trim) {
        Some(text) if !text.is_empty() && !text.starts_with("No") && !text.starts_with("Error") => {
            Ok(RawReport::new(station.clone(), text))
        }
        _ => Err(MetarError::no_data(station.as_str())),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[derive(Debug)]
    struct FixedSource(Result<&'static str, MetarError>);

    #[async_trait]
    impl MetarSource for FixedSource {
        async fn fetch(&self, station: &StationCode) -> Result<RawReport, MetarError> {
            self.0.clone().map(|text| RawReport::new(station.clone(), text))
        }
    }

    fn kjfk() -> StationCode {
        StationCode::parse("KJFK").unwrap()
    }

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn default_provider_from_config_works_without_file() {
        let cfg = Config::default();
        assert!(default_provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn provider_from_config_errors_for_bad_default() {
        let cfg = Config { default_provider: Some("nope".into()), ..Config::default() };
        assert!(default_provider_from_config(&cfg).is_err());
    }

    #[test]
    fn status_mapping() {
        let station = kjfk();
        let id = ProviderId::AviationWeather;

        assert!(check_status(id, &station, StatusCode::OK, "").is_ok());
        assert!(matches!(
            check_status(id, &station, StatusCode::NO_CONTENT, ""),
            Err(MetarError::NoData { .. })
        ));
        assert!(matches!(
            check_status(id, &station, StatusCode::NOT_FOUND, ""),
            Err(MetarError::NoData { .. })
        ));

        let body = "x".repeat(500);
        let err = check_status(id, &station, StatusCode::BAD_GATEWAY, &body).unwrap_err();
        let MetarError::UpstreamUnavailable { message } = err else {
            panic!("expected upstream error");
        };
        assert!(message.contains("502"));
        assert!(message.ends_with("..."));
    }

    #[test]
    fn no_data_bodies() {
        let station = kjfk();
        let bodies = [
            None,
            Some(""),
            Some("   "),
            Some("No valid METAR available"),
            Some("Error: Invalid airport code"),
        ];
        for line in bodies {
            let result = raw_report(&station, line);
            assert!(matches!(result, Err(MetarError::NoData { .. })), "{line:?}");
        }

        let raw = raw_report(&station, Some("  KJFK 041851Z 31008KT \n")).expect("report");
        assert_eq!(raw.raw_text, "KJFK 041851Z 31008KT");
    }

    #[tokio::test]
    async fn fetch_report_decodes_fetched_text() {
        let source = FixedSource(Ok("KJFK 041851Z 31008KT 10SM FEW250 M04/M17 A3034"));
        let report = fetch_report(&source, &kjfk()).await.expect("report");

        assert_eq!(report.airport_code.as_str(), "KJFK");
        assert!(report.decoded.summary.starts_with("Few clouds, 25°F"));
    }

    #[tokio::test]
    async fn fetch_report_passes_upstream_errors_through() {
        let source = FixedSource(Err(MetarError::no_data("KJFK")));
        let err = fetch_report(&source, &kjfk()).await.unwrap_err();
        assert_eq!(err, MetarError::no_data("KJFK"));

        let source = FixedSource(Ok("garbage"));
        let err = fetch_report(&source, &kjfk()).await.unwrap_err();
        assert!(matches!(err, MetarError::MalformedReport { .. }));
    }
}
