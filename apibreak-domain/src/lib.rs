//! Domain logic: decide which breaking categories are active, and apply them to requests and
//! responses.
//!
//! This crate owns *what* breaks and *how* a payload changes. It never touches the network or
//! disk; responses leave through the [`ResponseSink`] port.

mod activation;
mod handler;
mod ports;
mod route;
mod walk;

pub use activation::{ActivationPolicy, ActiveBreakingsMap, ActiveSet, DEFAULT_SEED, normal_mode_size};
pub use handler::{BreakingHandler, FinalResponse};
pub use ports::{RecordedResponse, ResponseSink};
pub use route::{RouteFailure, RouteOutcome, RouteSuccess, run_route};
pub use walk::{has_top_level_key, rename_keys};
