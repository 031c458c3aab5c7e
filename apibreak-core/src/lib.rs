//! Embeddable core library for apibreak.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into a mock API server or other host process.
//!
//! # Port traits
//!
//! I/O is abstracted behind port traits in [`ports`]:
//! - [`ProfileSource`](ports::ProfileSource) loads profile declarations and the route table
//! - [`WritePort`](ports::WritePort) writes report artifacts
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry point
//!
//! [`BreakingEngine`](engine::BreakingEngine) computes the activation once, publishes it
//! atomically, and hands out one [`BreakingHandler`] per request.

pub mod adapters;
pub mod engine;
pub mod ports;
pub mod settings;

pub use engine::{BreakingConfig, BreakingEngine, EngineError, write_activation_artifacts};

// Re-export the request-side types so hosts don't need apibreak-domain directly.
pub use apibreak_domain::{
    BreakingHandler, RecordedResponse, ResponseSink, RouteFailure, RouteOutcome, RouteSuccess,
    run_route,
};
pub use apibreak_types::{ActivationReport, EndpointKey, ToolInfo};
