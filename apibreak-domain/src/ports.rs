use serde_json::Value;

/// Where a finalized response is written. The route layer provides one per request.
pub trait ResponseSink {
    fn send(&mut self, status: u16, body: Value);
}

/// In-memory `ResponseSink`, for embedding and testing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedResponse {
    pub status: Option<u16>,
    pub body: Option<Value>,
    writes: usize,
}

impl RecordedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_sent(&self) -> bool {
        self.writes > 0
    }

    /// How many times `send` was called. Anything but 0 or 1 is a bug in the caller.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ResponseSink for RecordedResponse {
    fn send(&mut self, status: u16, body: Value) {
        self.status = Some(status);
        self.body = Some(body);
        self.writes += 1;
    }
}
