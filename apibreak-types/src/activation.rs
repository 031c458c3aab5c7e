use crate::category::Category;
use crate::endpoint::EndpointKey;
use crate::profile::ProfileDiagnostic;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global activation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationMode {
    /// Nothing is active anywhere.
    #[default]
    Disabled,
    /// Roughly half (plus one) of each endpoint's categories.
    Normal,
    /// Every available category on every endpoint.
    All,
}

impl ActivationMode {
    pub fn from_flags(enabled: bool, all_mode: bool) -> Self {
        match (enabled, all_mode) {
            (false, _) => ActivationMode::Disabled,
            (true, true) => ActivationMode::All,
            (true, false) => ActivationMode::Normal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivationMode::Disabled => "disabled",
            ActivationMode::Normal => "normal",
            ActivationMode::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Serialized record of one activation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub mode: ActivationMode,
    pub seed: String,

    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,

    /// Deterministic id of the active map (same map → same id).
    pub snapshot_id: Uuid,

    #[serde(default)]
    pub endpoints: Vec<EndpointActivation>,

    pub summary: ActivationSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointActivation {
    pub key: EndpointKey,

    #[serde(default)]
    pub available: Vec<Category>,

    #[serde(default)]
    pub active: Vec<Category>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ProfileDiagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationSummary {
    pub endpoints_total: u64,
    pub endpoints_active: u64,
    pub categories_available: u64,
    pub categories_active: u64,
    pub diagnostics: u64,
}

impl ActivationSummary {
    pub fn from_entries(entries: &[EndpointActivation]) -> Self {
        Self {
            endpoints_total: entries.len() as u64,
            endpoints_active: entries.iter().filter(|e| !e.active.is_empty()).count() as u64,
            categories_available: entries.iter().map(|e| e.available.len() as u64).sum(),
            categories_active: entries.iter().map(|e| e.active.len() as u64).sum(),
            diagnostics: entries.iter().map(|e| e.diagnostics.len() as u64).sum(),
        }
    }
}
