use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{OcrApiError, Result};

/// Engine configuration file used when `CONFIG_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    /// Where the engine configuration came from; `None` means built-in defaults.
    pub engine_source: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env::var("OCR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env_or("OCR_PORT", 80),
            workers: parse_env_or("OCR_WORKERS", 1).max(1),
            max_body_bytes: parse_env_or("OCR_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
        }
    }
}

impl ServerConfig {
    /// Startup flags win over the environment.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        workers: Option<usize>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(workers) = workers {
            self.workers = workers.max(1);
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings handed to the OCR engine, read from the `CONFIG_PATH` file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(alias = "Global")]
    pub global: GlobalConfig,
    #[serde(alias = "Tesseract")]
    pub tesseract: TesseractConfig,
}

/// Stage defaults and geometry limits shared by every engine call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub use_det: bool,
    pub use_cls: bool,
    pub use_rec: bool,
    pub return_word_box: bool,
    /// Lines scoring below this are dropped.
    pub text_score: f32,
    /// Images shorter than this skip detection.
    pub min_height: u32,
    /// Images wider than `width_height_ratio * height` skip detection.
    pub width_height_ratio: f32,
    pub max_side_len: u32,
    pub min_side_len: u32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            use_det: true,
            use_cls: true,
            use_rec: true,
            return_word_box: false,
            text_score: 0.5,
            min_height: 30,
            width_height_ratio: 8.0,
            max_side_len: 2000,
            min_side_len: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TesseractConfig {
    /// `+`-separated Tesseract language codes, e.g. `eng+deu`.
    pub languages: String,
    /// Directory holding `*.traineddata`; `None` uses Tesseract's own lookup.
    pub data_path: Option<String>,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            languages: "eng".to_string(),
            data_path: None,
        }
    }
}

impl EngineConfig {
    /// Load engine settings from a YAML, TOML or JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .build()
            .map_err(|e| {
                OcrApiError::Config(format!("Failed to read {}: {e}", path.display()))
            })?;

        settings.try_deserialize().map_err(|e| {
            OcrApiError::Config(format!("Invalid engine config {}: {e}", path.display()))
        })
    }
}

impl Config {
    /// Build the process configuration from the environment.
    ///
    /// An explicit `CONFIG_PATH` must point at a readable file. Without it the
    /// default path is tried and built-in engine defaults are used if absent.
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig::default();

        let (engine, engine_source) = match env::var("CONFIG_PATH") {
            Ok(path) => {
                let path = PathBuf::from(path);
                (EngineConfig::from_file(&path)?, Some(path))
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    (EngineConfig::from_file(&path)?, Some(path))
                } else {
                    tracing::warn!(
                        "{} not found and CONFIG_PATH is unset. Using built-in engine defaults.",
                        DEFAULT_CONFIG_PATH
                    );
                    (EngineConfig::default(), None)
                }
            }
        };

        Ok(Self {
            server,
            engine,
            engine_source,
        })
    }
}
