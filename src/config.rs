use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct VisionConfig {
    /// Base URL of an OpenAI-compatible API, without the `/chat/completions` suffix.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the bearer token.
    pub api_key_env: String,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub grid_directory: PathBuf,
    pub exiftool_path: String,
    pub concurrency: usize,
    pub log_level: String,
    pub vision: VisionConfig,
}

/// Values supplied on the command line. They win over every other source.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub grid_directory: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub log_level: Option<String>,
}

impl AppConfig {
    pub fn new(overrides: ConfigOverrides) -> Result<Self> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("grid_directory", "src/content/grid")?
            .set_default("exiftool_path", "exiftool")?
            .set_default("concurrency", 4i64)?
            .set_default("log_level", "info")?
            .set_default("vision.endpoint", "https://api.openai.com/v1")?
            .set_default("vision.model", "gpt-4o")?
            .set_default("vision.api_key_env", "OPENAI_API_KEY")?
            .set_default("vision.max_tokens", 600i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = &overrides.config_file {
            builder = builder.add_source(File::from(path.as_path()));
        }

        let s = builder
            .add_source(
                Environment::with_prefix("GRID_VISION")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option(
                "grid_directory",
                overrides
                    .grid_directory
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("concurrency", overrides.concurrency.map(|c| c as i64))?
            .set_override_option("log_level", overrides.log_level)?
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(AppError::Generic(
                "concurrency must be at least 1".to_string(),
            ));
        }
        let url = Url::parse(&self.vision.endpoint)?;
        if url.cannot_be_a_base() {
            return Err(AppError::Generic(format!(
                "vision endpoint is not a base URL: {}",
                self.vision.endpoint
            )));
        }
        Ok(())
    }
}
