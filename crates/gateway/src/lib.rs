//! Client for the external reasoning service.
//!
//! This crate is the system's only route to the external service. It owns:
//! - the pluggable transport (`ReasoningBackend`, with an HTTP implementation)
//! - global rate limiting: a fixed inter-call delay plus a cooldown with
//!   exactly one retry on throttling
//! - batch prompt construction and structured response parsing
//!
//! Like the catalog types, the wire types here (`ReviewInput`,
//! `ReviewAnalysis`) belong to the boundary: callers convert their domain
//! types when crossing it.

pub mod backend;
pub mod gateway;
pub mod parse;

// Re-export the client surface
pub use backend::{BackendError, HttpBackend, ReasoningBackend};
pub use gateway::{GatewayConfig, GatewayError, ReasoningGateway, ReviewInput};
pub use parse::{ReviewAnalysis, SentimentLabel};
