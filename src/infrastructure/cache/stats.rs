//! Cache counters and snapshots

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time view of cache activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Slots holding a current pipeline
    pub slots: usize,
    /// Requests served by an already cached pipeline
    pub hits: u64,
    /// Successful builds, first builds and rebuilds alike
    pub builds: u64,
    /// Builds that replaced a pipeline with different settings
    pub rebuilds: u64,
    /// Builds that failed
    pub build_failures: u64,
    /// Handles currently open across current and superseded pipelines
    pub open_handles: usize,
    /// Superseded pipelines still held by open handles
    pub draining: usize,
}

#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    builds: AtomicU64,
    rebuilds: AtomicU64,
    build_failures: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_build(&self, replaced: bool) {
        self.builds.fetch_add(1, Ordering::Relaxed);
        if replaced {
            self.rebuilds.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_failure(&self) {
        self.build_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, slots: usize, open_handles: usize, draining: usize) -> CacheStats {
        CacheStats {
            slots,
            hits: self.hits.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            build_failures: self.build_failures.load(Ordering::Relaxed),
            open_handles,
            draining,
        }
    }
}
