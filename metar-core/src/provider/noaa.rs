use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::{MetarError, RawReport, StationCode};

use super::{MetarSource, ProviderId, check_status, http_client, raw_report};

/// NWS text feed: `GET <base>/<CODE>.TXT`, a timestamp line followed by the report.
#[derive(Debug, Clone)]
pub struct NoaaProvider {
    base_url: String,
    http: Client,
}

impl NoaaProvider {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self { base_url, http: http_client(timeout)? })
    }

    fn station_url(&self, station: &StationCode) -> String {
        format!("{}/{station}.TXT", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl MetarSource for NoaaProvider {
    async fn fetch(&self, station: &StationCode) -> Result<RawReport, MetarError> {
        let url = self.station_url(station);
        debug!(%station, %url, "requesting METAR from NOAA");

        let res = self.http.get(&url).send().await.map_err(|e| {
            MetarError::upstream(format!("Failed to send request to NOAA: {e}"))
        })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| MetarError::upstream(format!("Failed to read NOAA response body: {e}")))?;

        check_status(ProviderId::Noaa, station, status, &body)?;
        parse_body(station, &body)
    }
}

fn parse_body(station: &StationCode, body: &str) -> Result<RawReport, MetarError> {
    let last = body.lines().map(str::trim).rfind(|l| !l.is_empty());
    raw_report(station, last)
}
