use serde::{Deserialize, Serialize};

/// Error codes carried by [`ContractViolation`].
pub mod codes {
    pub const UNKNOWN_FIELD: &str = "UNKNOWN_FIELD";
    pub const REQUIRED_FIELD_MISSING: &str = "REQUIRED_FIELD_MISSING";
}

/// Structured 4xx body returned when a request breaks the simulated contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractViolation {
    pub error: String,
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ContractViolation {
    pub fn unknown_field(field: &str) -> Self {
        Self {
            error: format!("Unknown field: {field}"),
            code: codes::UNKNOWN_FIELD.to_string(),
            field: Some(field.to_string()),
        }
    }

    pub fn required_field_missing(field: &str) -> Self {
        Self {
            error: format!("{field} is required"),
            code: codes::REQUIRED_FIELD_MISSING.to_string(),
            field: Some(field.to_string()),
        }
    }

    /// HTTP status used when the violation is written as a response.
    pub fn status(&self) -> u16 {
        400
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self)
    }
}
