use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use tidecast_models::config::{EnsembleConfig, LoaderConfig, PipelineConfig};

/// Where the ensemble comes from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServeMode {
    /// Fit every model from the historical table (synthetic fallback).
    #[default]
    Train,
    /// Load previously saved model artifacts; refuse to start without them.
    Pretrained,
}

impl FromStr for ServeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "train" => Ok(ServeMode::Train),
            "pretrained" | "load" => Ok(ServeMode::Pretrained),
            _ => Err(format!("Unknown serve mode: {}. Expected train or pretrained", s)),
        }
    }
}

/// JSON layout of `/predict` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// One value per window year plus a `years` list.
    Series,
    /// Only the target-year value per model.
    Point,
}

impl FromStr for ResponseShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "series" => Ok(ResponseShape::Series),
            "point" => Ok(ResponseShape::Point),
            _ => Err(format!("Unknown response shape: {}. Expected series or point", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub mode: ServeMode,
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub models_dir: PathBuf,
    /// Defaults to `series` when training and `point` when pretrained.
    pub response_shape: Option<ResponseShape>,
    pub pipeline: PipelineConfig,
    pub loader: LoaderConfig,
    pub ensemble: EnsembleConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            mode: ServeMode::Train,
            host: String::from("0.0.0.0"),
            port: 5000,
            data_path: PathBuf::from("data/sea_level.csv"),
            models_dir: PathBuf::from("models"),
            response_shape: None,
            pipeline: PipelineConfig::default(),
            loader: LoaderConfig::default(),
            ensemble: EnsembleConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn response_shape(&self) -> ResponseShape {
        self.response_shape.unwrap_or(match self.mode {
            ServeMode::Train => ResponseShape::Series,
            ServeMode::Pretrained => ResponseShape::Point,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Read the optional `--config` file, then apply CLI overrides.
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let mut config = match arg::<PathBuf>(matches, "config") {
            Some(path) => load_server_config(&path)?,
            None => ServerConfig::default(),
        };

        if let Some(mode) = arg::<String>(matches, "mode") {
            config.mode = ServeMode::from_str(&mode).map_err(anyhow::Error::msg)?;
        }
        if let Some(shape) = arg::<String>(matches, "shape") {
            config.response_shape =
                Some(ResponseShape::from_str(&shape).map_err(anyhow::Error::msg)?);
        }
        if let Some(data_path) = arg::<PathBuf>(matches, "data") {
            config.data_path = data_path;
        }
        if let Some(models_dir) = arg::<PathBuf>(matches, "models_dir") {
            config.models_dir = models_dir;
        }
        if let Some(host) = arg::<String>(matches, "host") {
            config.host = host;
        }
        if let Some(port) = arg::<u16>(matches, "port") {
            config.port = port;
        }
        if let Some(present_year) = arg::<i32>(matches, "present_year") {
            config.pipeline.present_year = present_year;
        }

        Ok(config)
    }
}

/// Argument value if the subcommand defines `id` and it was given.
fn arg<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<T> {
    matches.try_get_one::<T>(id).ok().flatten().cloned()
}

/// Load a server configuration from a JSON file. Missing fields take defaults.
pub fn load_server_config<P: AsRef<Path>>(path: P) -> Result<ServerConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: ServerConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
