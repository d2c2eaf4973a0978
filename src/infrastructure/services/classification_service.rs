//! Classification service - classify text through the pipeline cache

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{classify, DomainError, Label, PipelineSettings, SlotKey};
use crate::infrastructure::cache::{CacheStats, PipelineCache};

/// Configuration for the classification service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Longest accepted input, in characters
    pub max_text_chars: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            max_text_chars: 100_000,
        }
    }
}

impl ClassificationConfig {
    /// Sets the longest accepted input
    pub fn with_max_text_chars(mut self, max: usize) -> Self {
        self.max_text_chars = max;
        self
    }
}

/// Request to classify one text
#[derive(Debug, Clone)]
pub struct ClassifyRequest {
    pub slot_key: String,
    pub settings: PipelineSettings,
    pub text: String,
}

/// Labels found in a text, with the pipeline build that produced them
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub slot_key: SlotKey,
    pub generation: u64,
    /// When the pipeline that produced the labels was built
    pub built_at: DateTime<Utc>,
    pub labels: Vec<Label>,
}

/// Trait for the classification service (for dependency injection)
#[async_trait]
pub trait ClassificationServiceTrait: Send + Sync + std::fmt::Debug {
    /// Classify a text with the pipeline cached for the request's slot
    async fn classify(&self, request: ClassifyRequest) -> Result<ClassificationResult, DomainError>;

    /// Current cache counters
    fn cache_stats(&self) -> CacheStats;
}

/// Service running classification requests through a shared [`PipelineCache`]
#[derive(Debug)]
pub struct ClassificationService {
    cache: Arc<PipelineCache>,
    config: ClassificationConfig,
}

impl ClassificationService {
    /// Creates a new classification service
    pub fn new(cache: Arc<PipelineCache>) -> Self {
        Self::with_config(cache, ClassificationConfig::default())
    }

    /// Creates a new classification service with custom config
    pub fn with_config(cache: Arc<PipelineCache>, config: ClassificationConfig) -> Self {
        Self { cache, config }
    }

    pub fn cache(&self) -> &Arc<PipelineCache> {
        &self.cache
    }

    fn validate_text(&self, text: &str) -> Result<(), DomainError> {
        let chars = text.chars().count();
        if chars > self.config.max_text_chars {
            return Err(DomainError::invalid_input(format!(
                "Text has {} characters (max {})",
                chars, self.config.max_text_chars
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ClassificationServiceTrait for ClassificationService {
    async fn classify(&self, request: ClassifyRequest) -> Result<ClassificationResult, DomainError> {
        let slot_key = SlotKey::new(request.slot_key)?;
        self.validate_text(&request.text)?;

        let handle = self.cache.obtain(&slot_key, &request.settings).await?;
        let generation = handle.generation();
        let built_at = handle.built_at();
        let text = request.text;

        let labels = tokio::task::spawn_blocking(move || {
            handle.use_pipeline(|pipeline| classify(pipeline, &text))
        })
        .await
        .map_err(|e| DomainError::internal(format!("Classification task failed: {}", e)))??;

        debug!(
            slot_key = %slot_key,
            generation = generation,
            labels = labels.len(),
            "Classified text"
        );

        Ok(ClassificationResult {
            slot_key,
            generation,
            built_at,
            labels,
        })
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
