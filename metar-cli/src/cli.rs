use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select, Text};
use metar_core::{
    Config, ProviderId, RawReport, StationCode, WeatherReport, fetch_report,
    provider::{default_provider_from_config, provider_from_config},
};
use std::sync::Arc;

use crate::web;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "metar", version, about = "Read airport METAR weather reports in plain English")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the upstream provider, timeout and server port.
    Configure,

    /// Fetch and decode the latest report for an airport.
    Show {
        /// 4-character ICAO code, e.g. KJFK or VOMM.
        code: String,

        /// Provider short name, e.g. "aviationweather" or "noaa".
        #[arg(long)]
        provider: Option<String>,

        /// Print the JSON API response instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Decode METAR text given on the command line, without fetching.
    Decode {
        /// Raw report, e.g. `KJFK 041851Z 31008KT 10SM FEW250 M04/M17 A3034`.
        #[arg(required = true, num_args = 1..)]
        raw: Vec<String>,

        /// Requested station code; defaults to the report's own station.
        #[arg(long)]
        station: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Serve the web page and `/api/weather/<code>`.
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(Config::load()?),
            Command::Show { code, provider, json } => {
                let config = Config::load()?;
                let station = StationCode::parse(&code).map_err(|e| anyhow!(e.user_message()))?;
                let source = match provider {
                    Some(name) => {
                        provider_from_config(ProviderId::try_from(name.as_str())?, &config)?
                    }
                    None => default_provider_from_config(&config)?,
                };

                let report = fetch_report(source.as_ref(), &station)
                    .await
                    .with_context(|| format!("Could not get weather for {station}"))?;
                print_report(&report, json)
            }
            Command::Decode { raw, station, json } => {
                let report = decode(&raw, station.as_deref())?;
                print_report(&report, json)
            }
            Command::Serve { host, port } => {
                let config = Config::load()?;
                let source = default_provider_from_config(&config)?;
                let host = host.unwrap_or(config.server.host);
                let port = port.unwrap_or(config.server.port);

                web::run(&host, port, Arc::from(source)).await
            }
        }
    }
}

/// Decode text given on the command line. Needs no config or network.
fn decode(raw: &[String], station: Option<&str>) -> anyhow::Result<WeatherReport> {
    let text = raw.join(" ");
    let decoded = metar_core::parse(&text)?;
    let station = StationCode::parse(station.unwrap_or(decoded.station.as_str()))?;

    Ok(WeatherReport::new(&RawReport::new(station, text), &decoded))
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current = config.default_provider_id().unwrap_or(ProviderId::AviationWeather);
    let start = ProviderId::all().iter().position(|id| *id == current).unwrap_or(0);

    let provider = Select::new("Default METAR provider:", ProviderId::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;
    config.set_default_provider(provider);

    let base_url = Text::new("Custom endpoint URL (leave empty for the provider default):")
        .with_default(config.upstream.base_url.as_deref().unwrap_or(""))
        .prompt()?;
    config.upstream.base_url = Some(base_url.trim().to_string()).filter(|u| !u.is_empty());

    config.upstream.timeout_secs = CustomType::<u64>::new("Request timeout in seconds:")
        .with_default(config.upstream.timeout_secs)
        .with_error_message("Please type a whole number of seconds")
        .prompt()?;

    config.server.port = CustomType::<u16>::new("Web server port:")
        .with_default(config.server.port)
        .with_error_message("Please type a port number")
        .prompt()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn print_report(report: &WeatherReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{}", render_text(report));
    Ok(())
}

fn render_text(report: &WeatherReport) -> String {
    let mut out = format!(
        "Airport: {}\nTime: {}\nRaw METAR: {}\n\nSummary:\n   {}\n",
        report.decoded.station, report.decoded.time, report.raw_metar, report.decoded.summary
    );

    if !report.decoded.details.is_empty() {
        out.push_str("\nDetails:\n");
        for detail in &report.decoded.details {
            out.push_str(&format!("   • {detail}\n"));
        }
    }

    out
}
