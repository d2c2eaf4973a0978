use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nlp_pipeline_cache::domain::{
    DomainError, Label, Pipeline, PipelineBuilder, PipelineSettings, SlotKey,
};
use nlp_pipeline_cache::infrastructure::cache::PipelineCache;
use nlp_pipeline_cache::infrastructure::pipeline::{Gazetteer, GazetteerPipelineBuilder};
use nlp_pipeline_cache::infrastructure::services::{
    ClassificationService, ClassificationServiceTrait, ClassifyRequest,
};

/// Gazetteer builder that counts builds and takes a while to load
struct SlowBuilder {
    inner: GazetteerPipelineBuilder,
    builds: AtomicUsize,
}

impl SlowBuilder {
    fn new() -> Self {
        let inner = GazetteerPipelineBuilder::new("/nonexistent")
            .with_gazetteer(
                "world",
                "en",
                Gazetteer::new()
                    .with_entries("LOC", ["Paris", "France"])
                    .with_entries("PER", ["Marie Curie"]),
            )
            .with_gazetteer(
                "world",
                "fr",
                Gazetteer::new().with_entries("LOC", ["Paris"]),
            );

        Self {
            inner,
            builds: AtomicUsize::new(0),
        }
    }

    fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PipelineBuilder for SlowBuilder {
    async fn build(&self, settings: &PipelineSettings) -> Result<Arc<dyn Pipeline>, DomainError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.inner.build(settings).await
    }
}

fn request(slot: &str, language: &str, text: &str) -> ClassifyRequest {
    ClassifyRequest {
        slot_key: slot.to_string(),
        settings: PipelineSettings::new("world", language),
        text: text.to_string(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tenants_share_one_pipeline_each() {
    let builder = Arc::new(SlowBuilder::new());
    let cache = Arc::new(PipelineCache::new(builder.clone()));
    let service = Arc::new(ClassificationService::new(cache.clone()));

    let tasks: Vec<_> = (0..24)
        .map(|i| {
            let service = service.clone();
            let slot = format!("tenant-{}", i % 3);
            tokio::spawn(async move {
                service
                    .classify(request(&slot, "en", "Marie Curie lived in Paris"))
                    .await
            })
        })
        .collect();

    for task in tasks {
        let result = task.await.unwrap().unwrap();
        assert_eq!(
            result.labels,
            vec![
                Label::new("Marie Curie", "PER", 0, 11),
                Label::new("Paris", "LOC", 21, 26),
            ]
        );
    }

    assert_eq!(builder.builds(), 3);
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.stats().open_handles, 0);
}

#[tokio::test]
async fn settings_change_and_failed_rebuild() {
    let builder = Arc::new(SlowBuilder::new());
    let cache = Arc::new(PipelineCache::new(builder.clone()));
    let slot = SlotKey::new("collective-1").unwrap();
    let english = PipelineSettings::new("world", "en");

    let first = cache.obtain(&slot, &english).await.unwrap();
    let generation = first.generation();
    drop(first);

    let french = cache
        .obtain(&slot, &PipelineSettings::new("world", "fr"))
        .await
        .unwrap();
    assert_eq!(french.classify("Paris, France").unwrap().len(), 1);
    drop(french);
    assert_eq!(builder.builds(), 2);

    let missing = cache
        .obtain(&slot, &PipelineSettings::new("world", "de"))
        .await
        .unwrap_err();
    assert!(missing.is_build_failure());
    assert_eq!(cache.peek(&slot), Some(PipelineSettings::new("world", "fr")));

    let back = cache.obtain(&slot, &english).await.unwrap();
    assert_ne!(back.generation(), generation);
    assert_eq!(builder.builds(), 4);
}
