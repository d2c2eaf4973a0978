//! Infrastructure services

mod classification_service;

pub use classification_service::{
    ClassificationConfig, ClassificationResult, ClassificationService,
    ClassificationServiceTrait, ClassifyRequest,
};
