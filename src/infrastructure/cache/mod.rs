//! Cache infrastructure - the keyed pipeline cache and its handles

mod entry;
mod handle;
mod pipeline_cache;
mod stats;

pub use handle::PipelineHandle;
pub use pipeline_cache::{PipelineCache, WarmUpOutcome};
pub use stats::CacheStats;
