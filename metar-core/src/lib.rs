//! Core library for the `metar` reader.
//!
//! This crate defines:
//! - METAR decoding into typed reports, and plain-English rendering
//! - The response shape shared by the web page and JSON API
//! - Configuration handling
//! - Abstraction over upstream METAR sources
//!
//! It is used by `metar-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod decoder;
pub mod error;
pub mod model;
pub mod provider;
pub mod render;
pub mod report;
pub mod station;
pub mod units;

pub use config::{Config, ServerConfig, UpstreamConfig};
pub use decoder::{parse, parse_at};
pub use error::MetarError;
pub use model::{DecodedReport, RawReport};
pub use provider::{MetarSource, ProviderId, fetch_report};
pub use render::RenderedSummary;
pub use report::{DecodedSummary, WeatherReport, build_report, build_report_at};
pub use station::StationCode;
