use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::provider::ProviderId;

/// Settings for the upstream METAR source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Overrides the provider's built-in endpoint when set.
    pub base_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Bind address for `metar serve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default provider id, e.g. "aviationweather" or "noaa".
    pub default_provider: Option<String>,

    /// Example TOML:
    /// [upstream]
    /// timeout_secs = 10
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { base_url: None, timeout_secs: default_timeout_secs() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Config {
    /// The configured default provider, or aviationweather.gov when unset.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s).with_context(|| {
                format!(
                    "Invalid default provider in config.\n\
                     Hint: run `metar configure` or edit {}",
                    Self::config_file_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "config.toml".to_string())
                )
            }),
            None => Ok(ProviderId::AviationWeather),
        }
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Endpoint to use for `id`: the configured override, else the provider default.
    pub fn base_url_for(&self, id: ProviderId) -> String {
        self.upstream
            .base_url
            .clone()
            .unwrap_or_else(|| id.default_base_url().to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_secs)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        if cfg.upstream.timeout_secs == 0 {
            return Err(anyhow!("upstream.timeout_secs must be greater than zero"));
        }
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "metar-reader", "metar")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_provider_falls_back_to_aviationweather() {
        let cfg = Config::default();
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::AviationWeather);
    }

    #[test]
    fn unknown_default_provider_errors() {
        let cfg = Config { default_provider: Some("metoffice".into()), ..Config::default() };
        let err = cfg.default_provider_id().unwrap_err();

        assert!(format!("{err:#}").contains("Unknown provider 'metoffice'"));
    }

    #[test]
    fn set_default_provider_overrides_default() {
        let mut cfg = Config::default();
        cfg.set_default_provider(ProviderId::Noaa);

        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::Noaa);
    }

    #[test]
    fn base_url_override_applies_to_any_provider() {
        let mut cfg = Config::default();
        assert_eq!(
            cfg.base_url_for(ProviderId::AviationWeather),
            ProviderId::AviationWeather.default_base_url()
        );

        cfg.upstream.base_url = Some("http://localhost:9000/metar".into());
        assert_eq!(cfg.base_url_for(ProviderId::Noaa), "http://localhost:9000/metar");
    }

    #[test]
    fn partial_toml_gets_defaults() {
        let cfg = Config::from_toml("default_provider = \"noaa\"\n[server]\nport = 8080\n")
            .expect("valid toml");

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_toml("[upstream]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_default_provider(ProviderId::Noaa);
        cfg.upstream.timeout_secs = 5;

        let text = toml::to_string_pretty(&cfg).expect("serializes");
        assert_eq!(Config::from_toml(&text).expect("parses"), cfg);
    }
}
