use std::path::{Path, PathBuf};

use gml_core::{PatternTables, TheoryError};
use gml_exchange::envelope::{DEFAULT_AUTHOR, DEFAULT_SOURCE};
use gml_exchange::export::DEFAULT_INLINE_LIMIT;
use gml_exchange::{Environment, ExportSettings};

#[derive(serde::Serialize, serde::Deserialize, Default, Debug, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub chords: Vec<ChordConfig>,
    #[serde(default)]
    pub scales: Vec<ScaleConfig>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct ExchangeConfig {
    pub environment: Environment,
    pub inline_limit: usize,
    pub store_dir: Option<PathBuf>,
    pub author: String,
    pub auto_process: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Local,
            inline_limit: DEFAULT_INLINE_LIMIT,
            store_dir: None,
            author: DEFAULT_AUTHOR.to_string(),
            auto_process: true,
        }
    }
}

/// Extra chord: offsets from the root
#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
pub struct ChordConfig {
    pub name: String,
    pub offsets: Vec<u8>,
}

/// Extra scale: semitone steps
#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
pub struct ScaleConfig {
    pub name: String,
    pub steps: Vec<u8>,
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gml")
        .join("config.toml")
}

fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gml")
        .join("exchange")
}

/// Missing file means defaults; a malformed one is reported and ignored.
pub fn load_config(path: Option<&Path>) -> AppConfig {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let Ok(text) = std::fs::read_to_string(&path) else {
        tracing::debug!("No config at {}", path.display());
        return AppConfig::default();
    };
    parse_config(&text).unwrap_or_else(|e| {
        tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
        AppConfig::default()
    })
}

pub fn parse_config(text: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(text)
}

impl AppConfig {
    /// Built-in tables plus configured scales, then chords
    pub fn build_tables(&self) -> Result<PatternTables, TheoryError> {
        let tables = self
            .scales
            .iter()
            .try_fold(PatternTables::standard(), |t, s| t.with_scale(&s.name, &s.steps))?;
        self.chords
            .iter()
            .try_fold(tables, |t, c| t.with_chord(&c.name, &c.offsets))
    }

    pub fn store_dir(&self) -> PathBuf {
        self.exchange.store_dir.clone().unwrap_or_else(default_store_dir)
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            environment: self.exchange.environment,
            inline_limit: self.exchange.inline_limit,
            default_author: self.exchange.author.clone(),
            default_source: DEFAULT_SOURCE.to_string(),
        }
    }
}
