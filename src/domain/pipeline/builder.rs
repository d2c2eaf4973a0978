//! Pipeline builder trait

use std::sync::Arc;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{Pipeline, PipelineSettings};
use crate::domain::DomainError;

/// Builds pipelines from settings.
///
/// Building is expensive (model loading) and may fail. The returned pipeline must
/// be safe to share across threads and to drop once it has been superseded.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PipelineBuilder: Send + Sync {
    /// Build a pipeline configured by `settings`
    async fn build(&self, settings: &PipelineSettings) -> Result<Arc<dyn Pipeline>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::Semaphore;

    use super::*;
    use crate::domain::pipeline::AnnotatedToken;

    /// Pipeline that replays a fixed token stream
    #[derive(Debug, Default)]
    pub struct StaticPipeline {
        tokens: Vec<AnnotatedToken>,
        dropped: Option<Arc<AtomicBool>>,
    }

    impl StaticPipeline {
        pub fn new(tokens: Vec<AnnotatedToken>) -> Self {
            Self {
                tokens,
                dropped: None,
            }
        }

        /// Pipeline whose single token names the model it was built for
        pub fn for_settings(settings: &PipelineSettings) -> Self {
            let model = settings.model();
            Self::new(vec![AnnotatedToken::new(
                model,
                "MODEL",
                0,
                model.chars().count(),
            )])
        }

        /// Flag set when this pipeline is dropped
        pub fn with_drop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
            self.dropped = Some(flag);
            self
        }
    }

    impl Drop for StaticPipeline {
        fn drop(&mut self) {
            if let Some(ref flag) = self.dropped {
                flag.store(true, Ordering::SeqCst);
            }
        }
    }

    impl Pipeline for StaticPipeline {
        fn annotate(&self, text: &str) -> Result<Vec<AnnotatedToken>, DomainError> {
            if text.is_empty() {
                return Ok(Vec::new());
            }
            Ok(self.tokens.clone())
        }
    }

    /// Model name recorded by a pipeline built through `CountingBuilder`
    pub fn built_model(pipeline: &dyn Pipeline) -> String {
        pipeline
            .annotate("sample")
            .ok()
            .and_then(|tokens| tokens.into_iter().next())
            .map(|token| token.text)
            .unwrap_or_default()
    }

    /// Builder that counts calls and can be slowed down, gated or made to fail
    #[derive(Debug, Default)]
    pub struct CountingBuilder {
        calls: AtomicUsize,
        delay: Option<Duration>,
        failing_models: HashSet<String>,
        gated_models: HashSet<String>,
        gate: Option<Arc<Semaphore>>,
        drop_flag: Option<Arc<AtomicBool>>,
    }

    impl CountingBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Builds for `model` fail
        pub fn failing_for(mut self, model: impl Into<String>) -> Self {
            self.failing_models.insert(model.into());
            self
        }

        /// Builds for `model` wait until the returned semaphore receives a permit
        pub fn gated_for(mut self, model: impl Into<String>) -> (Self, Arc<Semaphore>) {
            let gate = Arc::new(Semaphore::new(0));
            self.gated_models.insert(model.into());
            self.gate = Some(gate.clone());
            (self, gate)
        }

        /// Only the next pipeline built carries the flag
        pub fn with_drop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
            self.drop_flag = Some(flag);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PipelineBuilder for CountingBuilder {
        async fn build(
            &self,
            settings: &PipelineSettings,
        ) -> Result<Arc<dyn Pipeline>, DomainError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);

            if self.gated_models.contains(settings.model()) {
                if let Some(ref gate) = self.gate {
                    let permit = gate
                        .acquire()
                        .await
                        .map_err(|e| DomainError::internal(e.to_string()))?;
                    permit.forget();
                }
            }

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if self.failing_models.contains(settings.model()) {
                return Err(DomainError::not_found(format!(
                    "Model files for '{}' are missing",
                    settings.model()
                )));
            }

            let mut pipeline = StaticPipeline::for_settings(settings);
            if call == 0 {
                if let Some(ref flag) = self.drop_flag {
                    pipeline = pipeline.with_drop_flag(flag.clone());
                }
            }

            Ok(Arc::new(pipeline))
        }
    }
}
