//! Clap-free settings for building a breaking engine.

use apibreak_domain::{ActivationPolicy, DEFAULT_SEED};
use apibreak_types::ActivationMode;
use camino::Utf8PathBuf;

/// Global breaking-change settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakingSettings {
    /// Master switch. Off means no endpoint breaks, whatever `all_mode` says.
    pub enabled: bool,
    /// Activate every available category instead of the seeded subset.
    pub all_mode: bool,
    /// Seed for the normal-mode selection.
    pub seed: String,

    // Inputs
    pub profiles_dir: Utf8PathBuf,
    pub routes_file: Option<Utf8PathBuf>,
}

impl Default for BreakingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            all_mode: false,
            seed: DEFAULT_SEED.to_string(),
            profiles_dir: Utf8PathBuf::from("profiles"),
            routes_file: None,
        }
    }
}

impl BreakingSettings {
    pub fn mode(&self) -> ActivationMode {
        ActivationMode::from_flags(self.enabled, self.all_mode)
    }

    pub fn policy(&self) -> ActivationPolicy {
        ActivationPolicy::new(self.mode(), self.seed.clone())
    }
}
