//! Pipeline infrastructure - gazetteer-backed pipeline and builder

mod builder;
mod gazetteer;
mod tokenizer;

pub use builder::GazetteerPipelineBuilder;
pub use gazetteer::{Gazetteer, GazetteerPipeline, MIN_PHRASE_CHARS_OPTION};
pub use tokenizer::{tokenize, WordToken};
