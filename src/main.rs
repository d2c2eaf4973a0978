use clap::Parser;
use nlp_pipeline_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Classify(args) => cli::classify::run(args).await,
        Command::Warmup(args) => cli::warmup::run(args).await,
    }
}
