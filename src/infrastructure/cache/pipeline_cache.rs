//! Pipeline cache - one pipeline per slot, rebuilt when settings drift

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::entry::CacheEntry;
use super::handle::PipelineHandle;
use super::stats::{CacheCounters, CacheStats};
use crate::domain::{DomainError, PipelineBuilder, PipelineSettings, SlotKey};

/// Build attempt that failed, kept so callers queued behind it share the error
struct FailedBuild {
    sequence: u64,
    settings: PipelineSettings,
    cause: Arc<DomainError>,
}

/// State guarded by a slot's construction lock
#[derive(Default)]
struct BuildState {
    last_failure: Option<FailedBuild>,
}

/// One logical place in the cache
#[derive(Default)]
struct Slot {
    /// Entry handed out to new requests
    current: RwLock<Option<Arc<CacheEntry>>>,
    /// Finished build attempts, successful or not
    completed_builds: AtomicU64,
    /// Held for the whole duration of a build
    build_lock: tokio::sync::Mutex<BuildState>,
}

impl Slot {
    fn current(&self) -> Option<Arc<CacheEntry>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn matching(&self, settings: &PipelineSettings) -> Option<Arc<CacheEntry>> {
        self.current().filter(|entry| entry.matches(settings))
    }

    fn replace(&self, entry: Arc<CacheEntry>) -> Option<Arc<CacheEntry>> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(entry)
    }

    fn take(&self) -> Option<Arc<CacheEntry>> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Outcome of warming up one slot
#[derive(Debug)]
pub struct WarmUpOutcome {
    pub slot_key: SlotKey,
    /// Generation of the pipeline now cached for the slot
    pub result: Result<u64, DomainError>,
}

/// Keyed cache of expensive, settings-sensitive pipelines.
///
/// Each slot holds at most one pipeline together with the settings it was built
/// from. Requests with equal settings share the cached pipeline; requests with
/// different settings rebuild it. Builds are serialized per slot and run in
/// parallel across slots.
///
/// A replaced pipeline is released by the cache as soon as the replacement is
/// committed, and discarded once the last handle issued against it is dropped.
///
/// The cache is an explicitly owned value: create it at startup, share it as
/// `Arc<PipelineCache>`, and drop it at shutdown.
pub struct PipelineCache {
    builder: Arc<dyn PipelineBuilder>,
    slots: Mutex<HashMap<SlotKey, Arc<Slot>>>,
    superseded: Mutex<Vec<Weak<CacheEntry>>>,
    next_generation: AtomicU64,
    counters: CacheCounters,
}

impl std::fmt::Debug for PipelineCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineCache")
            .field("slots", &self.len())
            .field("generation", &self.next_generation.load(Ordering::Relaxed))
            .finish()
    }
}

impl PipelineCache {
    /// Create an empty cache building pipelines with `builder`
    pub fn new(builder: Arc<dyn PipelineBuilder>) -> Self {
        Self {
            builder,
            slots: Mutex::new(HashMap::new()),
            superseded: Mutex::new(Vec::new()),
            next_generation: AtomicU64::new(0),
            counters: CacheCounters::default(),
        }
    }

    /// Obtain a handle to the pipeline for `slot_key` built from `settings`.
    ///
    /// Returns the cached pipeline when its settings equal `settings`. Otherwise
    /// waits for the slot's construction lock and builds a replacement, unless a
    /// caller that held the lock meanwhile already built (or failed to build) the
    /// same settings. A failed build leaves the slot as it was.
    ///
    /// Dropping the returned future releases the construction lock.
    pub async fn obtain(
        &self,
        slot_key: &SlotKey,
        settings: &PipelineSettings,
    ) -> Result<PipelineHandle, DomainError> {
        settings.validate()?;

        let slot = self.slot(slot_key);

        if let Some(entry) = slot.matching(settings) {
            self.counters.record_hit();
            return Ok(PipelineHandle::acquire(entry));
        }

        let seen = slot.completed_builds.load(Ordering::Acquire);
        let mut state = slot.build_lock.lock().await;

        if let Some(entry) = slot.matching(settings) {
            self.counters.record_hit();
            return Ok(PipelineHandle::acquire(entry));
        }

        let shared_failure = state
            .last_failure
            .as_ref()
            .filter(|failure| failure.sequence > seen && failure.settings == *settings)
            .map(|failure| failure.cause.clone());

        if let Some(cause) = shared_failure {
            drop(state);
            debug!(
                slot_key = %slot_key,
                model = settings.model(),
                "Sharing failure of concurrent build"
            );
            self.release_if_unused(slot_key, slot);
            return Err(DomainError::build_failure(
                slot_key.clone(),
                settings.clone(),
                cause,
            ));
        }

        let previous = slot.current();
        info!(
            slot_key = %slot_key,
            model = settings.model(),
            language = settings.language(),
            replacing = previous.as_ref().map(|entry| entry.generation()),
            "Building pipeline"
        );

        let started = Instant::now();
        let result = self.builder.build(settings).await;
        let sequence = slot.completed_builds.fetch_add(1, Ordering::AcqRel) + 1;

        match result {
            Ok(pipeline) => {
                state.last_failure = None;

                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
                let entry = Arc::new(CacheEntry::new(
                    slot_key.clone(),
                    settings.clone(),
                    pipeline,
                    generation,
                ));

                let replaced = slot.replace(entry.clone());
                self.counters.record_build(replaced.is_some());

                info!(
                    slot_key = %slot_key,
                    generation = generation,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Pipeline ready"
                );

                if let Some(old) = replaced {
                    self.supersede(old);
                }

                Ok(PipelineHandle::acquire(entry))
            }
            Err(e) => {
                self.counters.record_failure();

                warn!(
                    slot_key = %slot_key,
                    model = settings.model(),
                    error = %e,
                    kept_generation = previous.as_ref().map(|entry| entry.generation()),
                    "Pipeline build failed"
                );

                let cause = Arc::new(e);
                state.last_failure = Some(FailedBuild {
                    sequence,
                    settings: settings.clone(),
                    cause: cause.clone(),
                });
                drop(state);

                self.release_if_unused(slot_key, slot);

                Err(DomainError::build_failure(
                    slot_key.clone(),
                    settings.clone(),
                    cause,
                ))
            }
        }
    }

    /// Build the given slots concurrently, reporting each outcome
    pub async fn warm_up(&self, slots: Vec<(SlotKey, PipelineSettings)>) -> Vec<WarmUpOutcome> {
        let builds = slots.into_iter().map(|(slot_key, settings)| async move {
            let result = self
                .obtain(&slot_key, &settings)
                .await
                .map(|handle| handle.generation());

            WarmUpOutcome { slot_key, result }
        });

        join_all(builds).await
    }

    /// Settings of the pipeline currently cached for `slot_key`
    pub fn peek(&self, slot_key: &SlotKey) -> Option<PipelineSettings> {
        self.lock_slots()
            .get(slot_key)
            .and_then(|slot| slot.current())
            .map(|entry| entry.settings().clone())
    }

    /// Drop the pipeline cached for `slot_key`.
    ///
    /// Open handles keep working against it. Returns false if nothing was cached.
    pub fn evict(&self, slot_key: &SlotKey) -> bool {
        let evicted = {
            let mut slots = self.lock_slots();
            let evicted = slots.get(slot_key).and_then(|slot| slot.take());

            if slots
                .get(slot_key)
                .is_some_and(|slot| Arc::strong_count(slot) == 1)
            {
                slots.remove(slot_key);
            }

            evicted
        };

        match evicted {
            Some(entry) => {
                info!(slot_key = %slot_key, generation = entry.generation(), "Evicted pipeline");
                self.supersede(entry);
                true
            }
            None => false,
        }
    }

    /// Drop every cached pipeline
    pub fn clear(&self) {
        let evicted: Vec<Arc<CacheEntry>> = {
            let mut slots = self.lock_slots();
            let evicted = slots.values().filter_map(|slot| slot.take()).collect();
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            evicted
        };

        info!(evicted = evicted.len(), "Cleared pipeline cache");

        for entry in evicted {
            self.supersede(entry);
        }
    }

    /// Number of slots holding a pipeline
    pub fn len(&self) -> usize {
        self.lock_slots()
            .values()
            .filter(|slot| slot.current().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of the slots holding a pipeline, sorted
    pub fn slot_keys(&self) -> Vec<SlotKey> {
        let mut keys: Vec<SlotKey> = self
            .lock_slots()
            .iter()
            .filter(|(_, slot)| slot.current().is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        let current: Vec<Arc<CacheEntry>> = self
            .lock_slots()
            .values()
            .filter_map(|slot| slot.current())
            .collect();

        let draining: Vec<Arc<CacheEntry>> = {
            let mut superseded = self
                .superseded
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            superseded.retain(|weak| weak.strong_count() > 0);
            superseded.iter().filter_map(Weak::upgrade).collect()
        };

        let open_handles = current
            .iter()
            .chain(draining.iter())
            .map(|entry| entry.open_handles())
            .sum();

        self.counters
            .snapshot(current.len(), open_handles, draining.len())
    }

    fn slot(&self, slot_key: &SlotKey) -> Arc<Slot> {
        self.lock_slots()
            .entry(slot_key.clone())
            .or_default()
            .clone()
    }

    /// Let go of `slot`, removing it when it is empty and nobody else holds it
    fn release_if_unused(&self, slot_key: &SlotKey, slot: Arc<Slot>) {
        drop(slot);

        let mut slots = self.lock_slots();
        let unused = slots
            .get(slot_key)
            .is_some_and(|held| Arc::strong_count(held) == 1 && held.current().is_none());

        if unused {
            slots.remove(slot_key);
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<SlotKey, Arc<Slot>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop handing out `entry`; it is discarded when its last handle is released
    fn supersede(&self, entry: Arc<CacheEntry>) {
        entry.mark_superseded();

        let open = entry.open_handles();
        if open > 0 {
            debug!(
                slot_key = %entry.slot_key(),
                generation = entry.generation(),
                open_handles = open,
                "Superseded pipeline still in use"
            );
        }

        let mut superseded = self
            .superseded
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        superseded.retain(|weak| weak.strong_count() > 0);
        superseded.push(Arc::downgrade(&entry));
    }
}
