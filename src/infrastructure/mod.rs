//! Infrastructure layer - Cache, pipeline and service implementations

pub mod cache;
pub mod logging;
pub mod pipeline;
pub mod services;
