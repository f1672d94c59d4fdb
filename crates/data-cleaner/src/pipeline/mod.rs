//! Pipeline module.
//!
//! This module provides the cleaning executor and the pipeline facade that
//! wires the engine stages together.

mod builder;
mod executor;

pub use builder::{CleaningPipeline, CleaningPipelineBuilder};
pub use executor::CleaningExecutor;
