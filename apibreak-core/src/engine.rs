//! The embeddable engine: registry plus an atomically published activation snapshot.

use crate::ports::{ProfileSource, WritePort};
use crate::settings::BreakingSettings;
use anyhow::Context;
use apibreak_domain::{ActiveBreakingsMap, ActiveSet, BreakingHandler};
use apibreak_profiles::{ProfileRegistry, RegistryError};
use apibreak_render::render_activation_md;
use apibreak_types::{
    ActivationMode, ActivationReport, ActivationSummary, CATEGORY_TABLE, CategoryInfo,
    EndpointActivation, EndpointKey, EndpointKeyError, ToolInfo,
};
use arc_swap::ArcSwap;
use camino::Utf8Path;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Error type for engine construction. Exit code 2 = bad profiles, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    pub fn is_registry(&self) -> bool {
        matches!(self, EngineError::Registry(_))
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            EngineError::Registry(_) => 2,
            EngineError::Internal(_) => 1,
        }
    }
}

/// Immutable configuration snapshot. A new one is published, never edited.
#[derive(Debug, Clone)]
pub struct BreakingConfig {
    pub enabled: bool,
    pub all_mode: bool,
    pub seed: String,
    pub categories: &'static [CategoryInfo],
    pub active_breakings: Arc<ActiveBreakingsMap>,
}

impl BreakingConfig {
    pub fn mode(&self) -> ActivationMode {
        ActivationMode::from_flags(self.enabled, self.all_mode)
    }

    fn build(settings: &BreakingSettings, registry: &ProfileRegistry) -> Self {
        Self {
            enabled: settings.enabled,
            all_mode: settings.all_mode,
            seed: settings.seed.clone(),
            categories: &CATEGORY_TABLE,
            active_breakings: Arc::new(settings.policy().activate(registry)),
        }
    }
}

pub struct BreakingEngine {
    registry: Arc<ProfileRegistry>,
    snap: ArcSwap<BreakingConfig>,
}

impl BreakingEngine {
    /// Compute the activation once and publish it.
    pub fn new(settings: &BreakingSettings, registry: ProfileRegistry) -> Self {
        let config = BreakingConfig::build(settings, &registry);
        Self {
            registry: Arc::new(registry),
            snap: ArcSwap::from_pointee(config),
        }
    }

    /// Load profiles through `source`, validate them against its route table, and build.
    pub fn from_source(
        settings: &BreakingSettings,
        source: &dyn ProfileSource,
    ) -> Result<Self, EngineError> {
        let files = source.load_profiles()?;
        let registry = ProfileRegistry::from_loaded(&files)?;
        if let Some(routes) = source.load_routes()? {
            registry.validate_routes(&routes)?;
        }
        info!(
            profiles = registry.len(),
            skipped = registry.skipped().len(),
            "loaded endpoint profiles"
        );
        Ok(Self::new(settings, registry))
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// The currently published snapshot.
    pub fn config(&self) -> Arc<BreakingConfig> {
        self.snap.load_full()
    }

    /// Build a handler for one request against the current snapshot.
    ///
    /// Endpoints without a profile get an inert handler.
    pub fn handler_for(&self, key: &EndpointKey) -> BreakingHandler {
        let Some(profile) = self.registry.get(key) else {
            match self.registry.lookalike(key) {
                Some(nearest) => debug!(
                    endpoint = %key,
                    %nearest,
                    "no profile; a profiled template differs only in parameter names"
                ),
                None => debug!(endpoint = %key, "no profile; using inert handler"),
            }
            return BreakingHandler::inert(key.clone());
        };
        let snap = self.snap.load_full();
        let active = snap
            .active_breakings
            .get(key)
            .cloned()
            .unwrap_or_else(ActiveSet::new);
        BreakingHandler::new(profile.clone(), &active)
    }

    /// `handler_for` from a route's method and path, in either `:id` or `{id}` notation.
    pub fn handler_for_route(
        &self,
        method: &str,
        path: &str,
    ) -> Result<BreakingHandler, EndpointKeyError> {
        let key = EndpointKey::parse(method, path)?;
        Ok(self.handler_for(&key))
    }

    /// Recompute the activation from `settings` and swap it in.
    ///
    /// Handlers already built keep the snapshot they were built from.
    pub fn republish(&self, settings: &BreakingSettings) -> Arc<BreakingConfig> {
        let next = Arc::new(BreakingConfig::build(settings, &self.registry));
        self.snap.store(next.clone());
        next
    }

    /// Describe the current snapshot.
    pub fn activation_report(&self, tool: ToolInfo) -> ActivationReport {
        let snap = self.snap.load_full();
        let endpoints: Vec<EndpointActivation> = self
            .registry
            .iter()
            .map(|profile| EndpointActivation {
                key: profile.key.clone(),
                available: profile.available.clone(),
                active: snap
                    .active_breakings
                    .get(&profile.key)
                    .map(|set| set.iter().copied().collect())
                    .unwrap_or_default(),
                diagnostics: profile.diagnostics.clone(),
            })
            .collect();
        let summary = ActivationSummary::from_entries(&endpoints);

        ActivationReport {
            schema: apibreak_types::schema::APIBREAK_ACTIVATION_V1.to_string(),
            tool,
            mode: snap.mode(),
            seed: snap.seed.clone(),
            generated_at: Some(Utc::now().to_rfc3339()),
            snapshot_id: snap.active_breakings.snapshot_id(),
            endpoints,
            summary,
        }
    }
}

/// Write `activation.json` and `activation.md` into `out_dir`.
pub fn write_activation_artifacts(
    report: &ActivationReport,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let json = serde_json::to_string_pretty(report).context("serialize activation report")?;
    writer.write_file(&out_dir.join("activation.json"), json.as_bytes())?;
    writer.write_file(
        &out_dir.join("activation.md"),
        render_activation_md(report).as_bytes(),
    )?;
    Ok(())
}
