//! Classify command - runs texts through the cache and prints labels as JSON

use std::io::BufRead;

use clap::Args;
use tracing::info;

use crate::domain::PipelineSettings;
use crate::infrastructure::services::{ClassificationServiceTrait, ClassifyRequest};

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Cache slot (tenant or collective) to classify in
    #[arg(long, default_value = "default")]
    pub slot: String,

    /// Model name; defaults to the configured model
    #[arg(long)]
    pub model: Option<String>,

    /// Language code; defaults to the configured language
    #[arg(long)]
    pub language: Option<String>,

    /// Match entities case sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Keep only these entity types (repeatable)
    #[arg(long = "entity-type")]
    pub entity_types: Vec<String>,

    /// Texts to classify
    pub texts: Vec<String>,
}

impl ClassifyArgs {
    fn settings(&self, config: &crate::config::PipelineConfig) -> PipelineSettings {
        let model = self.model.as_deref().unwrap_or(&config.default_model);
        let language = self.language.as_deref().unwrap_or(&config.default_language);

        PipelineSettings::new(model, language)
            .with_case_sensitive(self.case_sensitive || config.case_sensitive)
            .with_entity_types(self.entity_types.iter().cloned())
    }
}

/// Run the classify command
pub async fn run(args: ClassifyArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let service = crate::create_classification_service(&config);
    let settings = args.settings(&config.pipeline);

    let texts = if args.texts.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()?
    } else {
        args.texts.clone()
    };

    for text in texts {
        let result = service
            .classify(ClassifyRequest {
                slot_key: args.slot.clone(),
                settings: settings.clone(),
                text,
            })
            .await?;

        println!("{}", serde_json::to_string(&result)?);
    }

    let stats = service.cache_stats();
    info!(
        slots = service.cache().len(),
        builds = stats.builds,
        hits = stats.hits,
        "Classification finished"
    );

    Ok(())
}
