//! NLP Pipeline Cache
//!
//! A keyed cache for expensive, settings-sensitive classification pipelines:
//! - One pipeline per slot (tenant, collective), built at most once per settings
//! - Transparent rebuild when the requested settings drift
//! - Scoped handles that keep superseded pipelines alive until released
//! - Label extraction from per-token pipeline output

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use infrastructure::cache::PipelineCache;
use infrastructure::pipeline::GazetteerPipelineBuilder;
use infrastructure::services::ClassificationService;
use tracing::info;

/// Create the pipeline cache for the configured gazetteer directory
pub fn create_pipeline_cache(config: &AppConfig) -> Arc<PipelineCache> {
    info!(
        gazetteer_dir = %config.pipeline.gazetteer_dir,
        "Creating pipeline cache"
    );

    let builder = GazetteerPipelineBuilder::new(&config.pipeline.gazetteer_dir);
    Arc::new(PipelineCache::new(Arc::new(builder)))
}

/// Create the classification service with its own pipeline cache
pub fn create_classification_service(config: &AppConfig) -> Arc<ClassificationService> {
    let cache = create_pipeline_cache(config);
    Arc::new(ClassificationService::with_config(
        cache,
        config.classification.clone(),
    ))
}
