//! Cache entry - a built pipeline plus the settings that produced it

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{Pipeline, PipelineSettings, SlotKey};

/// Entry owned by the cache and shared with open handles.
///
/// Dropping the last reference discards the pipeline.
pub(crate) struct CacheEntry {
    slot_key: SlotKey,
    settings: PipelineSettings,
    pipeline: Arc<dyn Pipeline>,
    generation: u64,
    built_at: DateTime<Utc>,
    open_handles: AtomicUsize,
    superseded: AtomicBool,
}

impl CacheEntry {
    pub(crate) fn new(
        slot_key: SlotKey,
        settings: PipelineSettings,
        pipeline: Arc<dyn Pipeline>,
        generation: u64,
    ) -> Self {
        Self {
            slot_key,
            settings,
            pipeline,
            generation,
            built_at: Utc::now(),
            open_handles: AtomicUsize::new(0),
            superseded: AtomicBool::new(false),
        }
    }

    pub(crate) fn slot_key(&self) -> &SlotKey {
        &self.slot_key
    }

    pub(crate) fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub(crate) fn pipeline(&self) -> &(dyn Pipeline + 'static) {
        self.pipeline.as_ref()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub(crate) fn matches(&self, settings: &PipelineSettings) -> bool {
        self.settings == *settings
    }

    pub(crate) fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::Acquire)
    }

    /// Records a new handle, returning the open count including it
    pub(crate) fn acquire(&self) -> usize {
        self.open_handles.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Records a released handle, returning the open count left
    pub(crate) fn release(&self) -> usize {
        self.open_handles.fetch_sub(1, Ordering::AcqRel) - 1
    }

    pub(crate) fn mark_superseded(&self) {
        self.superseded.store(true, Ordering::Release);
    }

    pub(crate) fn is_superseded(&self) -> bool {
        self.superseded.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("slot_key", &self.slot_key)
            .field("settings", &self.settings)
            .field("generation", &self.generation)
            .field("built_at", &self.built_at)
            .field("open_handles", &self.open_handles())
            .field("superseded", &self.is_superseded())
            .finish()
    }
}

impl Drop for CacheEntry {
    fn drop(&mut self) {
        debug!(
            slot_key = %self.slot_key,
            generation = self.generation,
            model = self.settings.model(),
            "Discarding pipeline"
        );
    }
}
