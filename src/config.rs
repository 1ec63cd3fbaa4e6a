use crate::binder::StaleStatePolicy;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub view: ViewConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub dataset: PathBuf,
    /// Single-byte CSV field delimiter
    pub delimiter: String,
    /// Optional GeoJSON boundaries drawn under the points
    pub outline: Option<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("data/aldeias_indigenas.csv"),
            delimiter: ",".to_string(),
            outline: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ViewConfig {
    pub title: String,
    pub stale_states: StaleStatePolicy,
    /// Hover search radius in degrees at the fitted zoom; never smaller than a map cell
    pub hover_radius_deg: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: "Aldeias Indígenas no Brasil".to_string(),
            stale_states: StaleStatePolicy::default(),
            hover_radius_deg: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    /// Log file used while the dashboard owns the terminal
    pub file: PathBuf,
    /// Default filter directive when RUST_LOG and -v are absent
    pub level: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("aldeias-tui.log"),
            level: None,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "Failed to parse TOML configuration")?;
        config.delimiter()?;
        Ok(config)
    }

    pub fn delimiter(&self) -> Result<u8> {
        match self.input.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => Err(anyhow!(
                "CSV delimiter must be a single byte, got {:?}",
                self.input.delimiter
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.input.dataset, PathBuf::from("data/aldeias_indigenas.csv"));
        assert_eq!(config.delimiter().unwrap(), b',');
        assert_eq!(config.view.stale_states, StaleStatePolicy::Prune);
        assert!(config.input.outline.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::parse(
            r#"
            [input]
            dataset = "data/localidades.csv"
            delimiter = ";"
            outline = "data/uf.geojson"

            [view]
            title = "Localidades"
            stale_states = "keep"
            hover_radius_deg = 1.5

            [log]
            file = "/tmp/dash.log"
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.delimiter().unwrap(), b';');
        assert_eq!(config.input.outline, Some(PathBuf::from("data/uf.geojson")));
        assert_eq!(config.view.stale_states, StaleStatePolicy::Keep);
        assert_eq!(config.view.hover_radius_deg, 1.5);
        assert_eq!(config.log.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_bad_delimiter_rejected() {
        assert!(AppConfig::parse("[input]\ndelimiter = \"::\"\n").is_err());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(AppConfig::parse("[view]\nstale_states = \"sometimes\"\n").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_or_default(Path::new("no/such/config.toml")).unwrap();
        assert_eq!(config.view.hover_radius_deg, 0.5);
        assert!(AppConfig::load_from_file(Path::new("no/such/config.toml")).is_err());
    }
}
