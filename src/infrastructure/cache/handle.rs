//! Scoped access to a cached pipeline

use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::entry::CacheEntry;
use crate::domain::{classify, DomainError, Label, Pipeline, PipelineSettings, SlotKey};

/// Handle to a pipeline issued by [`PipelineCache::obtain`](super::PipelineCache::obtain).
///
/// The handle counts as open until it is dropped, whichever way the caller's scope
/// ends. A handle keeps its pipeline alive even after the cache has replaced it, so
/// work in flight always finishes against the pipeline it started with.
pub struct PipelineHandle {
    entry: Arc<CacheEntry>,
}

impl PipelineHandle {
    pub(crate) fn acquire(entry: Arc<CacheEntry>) -> Self {
        entry.acquire();
        Self { entry }
    }

    pub fn slot_key(&self) -> &SlotKey {
        self.entry.slot_key()
    }

    /// Settings the pipeline was built from
    pub fn settings(&self) -> &PipelineSettings {
        self.entry.settings()
    }

    /// Cache-wide build number of the pipeline
    pub fn generation(&self) -> u64 {
        self.entry.generation()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.entry.built_at()
    }

    pub fn pipeline(&self) -> &dyn Pipeline {
        self.entry.pipeline()
    }

    /// True once the cache has stopped handing this pipeline out
    pub fn is_superseded(&self) -> bool {
        self.entry.is_superseded()
    }

    /// Run `f` against the pipeline and release the handle afterwards
    pub fn use_pipeline<R>(self, f: impl FnOnce(&dyn Pipeline) -> R) -> R {
        f(self.pipeline())
    }

    /// Classify `text` with the pipeline behind this handle
    pub fn classify(&self, text: &str) -> Result<Vec<Label>, DomainError> {
        classify(self.pipeline(), text)
    }
}

impl Deref for PipelineHandle {
    type Target = dyn Pipeline;

    fn deref(&self) -> &Self::Target {
        self.entry.pipeline()
    }
}

impl std::fmt::Debug for PipelineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineHandle")
            .field("slot_key", self.slot_key())
            .field("generation", &self.generation())
            .field("superseded", &self.is_superseded())
            .finish()
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        let remaining = self.entry.release();

        if remaining == 0 && self.entry.is_superseded() {
            debug!(
                slot_key = %self.entry.slot_key(),
                generation = self.entry.generation(),
                "Released last handle on superseded pipeline"
            );
        }
    }
}
