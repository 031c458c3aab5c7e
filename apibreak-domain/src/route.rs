//! The fixed request pipeline every simulated endpoint goes through.

use crate::handler::BreakingHandler;
use crate::ports::ResponseSink;
use apibreak_types::ContractViolation;
use serde_json::Value;
use tracing::debug;

/// Successful result of a route's own logic.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSuccess {
    pub data: Value,
    pub status: u16,
}

impl RouteSuccess {
    pub fn ok(data: Value) -> Self {
        Self { data, status: 200 }
    }

    pub fn with_status(data: Value, status: u16) -> Self {
        Self { data, status }
    }
}

/// A route's own failure; written as-is, without breaking transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFailure {
    pub status: u16,
    pub body: Value,
}

impl RouteFailure {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message.into() }),
        }
    }
}

/// What happened to one request.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// The request broke the simulated contract; a 400 was written.
    Violation(ContractViolation),
    /// Route logic failed with this status.
    Failed(u16),
    /// A success response was written with this (possibly substituted) status.
    Sent(u16),
}

/// Run deprecated-field check → rename → required-field check → `logic` → response.
///
/// The first failing step writes its response and stops the pipeline.
pub fn run_route<F>(
    handler: BreakingHandler,
    raw: Value,
    sink: &mut dyn ResponseSink,
    logic: F,
) -> RouteOutcome
where
    F: FnOnce(Value) -> Result<RouteSuccess, RouteFailure>,
{
    if let Some(violation) = handler.check_deprecated_fields(&raw) {
        return reject(sink, violation);
    }

    let body = handler.transform_request(raw);

    if let Some(violation) = handler.check_required_field(&body) {
        return reject(sink, violation);
    }

    match logic(body) {
        Ok(success) => {
            let status = handler.send_response(sink, success.data, success.status);
            RouteOutcome::Sent(status)
        }
        Err(failure) => {
            debug!(status = failure.status, "route logic failed");
            sink.send(failure.status, failure.body);
            RouteOutcome::Failed(failure.status)
        }
    }
}

fn reject(sink: &mut dyn ResponseSink, violation: ContractViolation) -> RouteOutcome {
    sink.send(violation.status(), violation.to_json());
    RouteOutcome::Violation(violation)
}
