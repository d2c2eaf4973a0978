//! Gazetteer pipeline builder - loads gazetteers from disk or an inline catalog

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use super::gazetteer::{Gazetteer, GazetteerPipeline};
use crate::domain::{DomainError, Pipeline, PipelineBuilder, PipelineSettings};

/// Builds [`GazetteerPipeline`]s.
///
/// The gazetteer for `(model, language)` is looked up in the inline catalog first,
/// then read from `<gazetteer_dir>/<model>.<language>.json`.
#[derive(Debug, Clone)]
pub struct GazetteerPipelineBuilder {
    gazetteer_dir: PathBuf,
    inline: HashMap<(String, String), Gazetteer>,
}

impl GazetteerPipelineBuilder {
    pub fn new(gazetteer_dir: impl Into<PathBuf>) -> Self {
        Self {
            gazetteer_dir: gazetteer_dir.into(),
            inline: HashMap::new(),
        }
    }

    /// Register an in-memory gazetteer for `model` and `language`
    pub fn with_gazetteer(
        mut self,
        model: impl Into<String>,
        language: impl Into<String>,
        gazetteer: Gazetteer,
    ) -> Self {
        self.inline.insert((model.into(), language.into()), gazetteer);
        self
    }

    /// File the gazetteer for `settings` is read from
    pub fn gazetteer_path(&self, settings: &PipelineSettings) -> PathBuf {
        self.gazetteer_dir
            .join(format!("{}.{}.json", settings.model(), settings.language()))
    }

    async fn load(&self, settings: &PipelineSettings) -> Result<Gazetteer, DomainError> {
        let key = (settings.model().to_string(), settings.language().to_string());
        if let Some(gazetteer) = self.inline.get(&key) {
            return Ok(gazetteer.clone());
        }

        let path = self.gazetteer_path(settings);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DomainError::not_found(format!("Gazetteer file '{}' not found", path.display()))
            } else {
                DomainError::internal(format!(
                    "Failed to read gazetteer file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;

        serde_json::from_str(&content).map_err(|e| {
            DomainError::configuration(format!(
                "Invalid gazetteer file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl PipelineBuilder for GazetteerPipelineBuilder {
    async fn build(&self, settings: &PipelineSettings) -> Result<Arc<dyn Pipeline>, DomainError> {
        let started = Instant::now();
        let gazetteer = self.load(settings).await?;
        let pipeline = GazetteerPipeline::compile(&gazetteer, settings)?;

        if pipeline.phrase_count() == 0 {
            warn!(
                model = settings.model(),
                language = settings.language(),
                "Gazetteer pipeline recognizes no phrases"
            );
        }

        info!(
            model = settings.model(),
            language = settings.language(),
            phrases = pipeline.phrase_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Compiled gazetteer pipeline"
        );

        Ok(Arc::new(pipeline))
    }
}
