//! CLI module for the NLP pipeline cache
//!
//! Provides subcommands that exercise the cache end to end:
//! - `classify`: classify texts through a cached pipeline
//! - `warmup`: pre-build pipelines for a list of slots

pub mod classify;
pub mod warmup;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// NLP pipeline cache - classify text with cached, per-slot pipelines
#[derive(Parser)]
#[command(name = "nlp-pipeline-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify texts (arguments, or stdin lines when none are given)
    Classify(classify::ClassifyArgs),

    /// Build pipelines for the given slots ahead of use
    Warmup(warmup::WarmupArgs),
}

/// Load `.env`, configuration and logging shared by every command
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&logging::LoggingConfig::from(&config.logging))?;

    Ok(config)
}
