//! Server crate for the shopping-assistant pipeline.
//!
//! This crate contains the orchestrator that coordinates all units of the
//! question-answering pipeline.

pub mod orchestrator;

pub use orchestrator::{PipelineConfig, PipelineError, QueryOrchestrator, QueryResult};
