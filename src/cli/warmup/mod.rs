//! Warmup command - builds the default pipeline for each slot and reports stats

use clap::Args;
use tracing::{error, info};

use crate::domain::SlotKey;

#[derive(Debug, Args)]
pub struct WarmupArgs {
    /// Slots to build the configured default pipeline for (repeatable)
    #[arg(long = "slot", required = true)]
    pub slots: Vec<String>,
}

/// Run the warmup command
pub async fn run(args: WarmupArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let cache = crate::create_pipeline_cache(&config);
    let settings = config.pipeline.default_settings();

    let slots = args
        .slots
        .into_iter()
        .map(|slot| SlotKey::new(slot).map(|key| (key, settings.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let outcomes = cache.warm_up(slots).await;
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();

    for outcome in &outcomes {
        match &outcome.result {
            Ok(generation) => info!(slot_key = %outcome.slot_key, generation, "Slot warmed up"),
            Err(e) => error!(slot_key = %outcome.slot_key, error = %e, "Slot warmup failed"),
        }
    }

    println!("{}", serde_json::to_string(&cache.stats())?);

    if failed > 0 {
        anyhow::bail!("{} of {} slots failed to warm up", failed, outcomes.len());
    }

    Ok(())
}
