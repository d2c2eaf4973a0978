use serde::Deserialize;

use crate::domain::PipelineSettings;
use crate::infrastructure::services::ClassificationConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
    pub classification: ClassificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where gazetteers live and which settings apply when a caller gives none
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub gazetteer_dir: String,
    pub default_model: String,
    pub default_language: String,
    pub case_sensitive: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gazetteer_dir: "gazetteers".to_string(),
            default_model: "ner-base".to_string(),
            default_language: "en".to_string(),
            case_sensitive: false,
        }
    }
}

impl PipelineConfig {
    /// Settings built from the configured defaults
    pub fn default_settings(&self) -> PipelineSettings {
        PipelineSettings::new(&self.default_model, &self.default_language)
            .with_case_sensitive(self.case_sensitive)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
