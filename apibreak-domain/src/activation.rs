use apibreak_profiles::ProfileRegistry;
use apibreak_types::{ActivationMode, Category, EndpointBreakingProfile, EndpointKey};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_SEED: &str = "apibreak";

pub type ActiveSet = BTreeSet<Category>;

/// Active categories per endpoint, computed once and never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveBreakingsMap {
    entries: BTreeMap<EndpointKey, ActiveSet>,
}

impl ActiveBreakingsMap {
    pub fn from_entries(entries: impl IntoIterator<Item = (EndpointKey, ActiveSet)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, key: &EndpointKey) -> Option<&ActiveSet> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EndpointKey, &ActiveSet)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_active(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Deterministic identity of this map's contents.
    pub fn snapshot_id(&self) -> Uuid {
        const NAMESPACE: Uuid = Uuid::from_bytes([
            0x9a, 0x21, 0x6e, 0x0c, 0x3f, 0x47, 0x4d, 0x1b, 0xa4, 0x58, 0x7e, 0x02, 0xc1, 0x96, 0x3d,
            0x85,
        ]);

        let mut canonical = String::new();
        for (key, active) in &self.entries {
            let cats: Vec<&str> = active.iter().map(|c| c.as_str()).collect();
            canonical.push_str(&format!("{}={}\n", key, cats.join(",")));
        }
        Uuid::new_v5(&NAMESPACE, canonical.as_bytes())
    }
}

/// Size of the active set in normal mode: `floor(n/2) + 1`, never more than `n`.
pub fn normal_mode_size(available: usize) -> usize {
    if available == 0 {
        0
    } else {
        available / 2 + 1
    }
}

/// Startup policy that turns available categories into active ones.
///
/// Normal mode ranks each available category by
/// `sha256("{seed}|{endpoint}|{CATEGORY}")` and keeps the lowest
/// [`normal_mode_size`] of them, so a given seed always yields the same map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationPolicy {
    mode: ActivationMode,
    seed: String,
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        Self::new(ActivationMode::Disabled, DEFAULT_SEED)
    }
}

impl ActivationPolicy {
    pub fn new(mode: ActivationMode, seed: impl Into<String>) -> Self {
        Self {
            mode,
            seed: seed.into(),
        }
    }

    pub fn mode(&self) -> ActivationMode {
        self.mode
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn select(&self, profile: &EndpointBreakingProfile) -> ActiveSet {
        match self.mode {
            ActivationMode::Disabled => ActiveSet::new(),
            ActivationMode::All => profile.available.iter().copied().collect(),
            ActivationMode::Normal => {
                let take = normal_mode_size(profile.available.len());
                let mut ranked: Vec<(String, Category)> = profile
                    .available
                    .iter()
                    .map(|&c| (selection_rank(&self.seed, &profile.key, c), c))
                    .collect();
                ranked.sort();
                ranked.into_iter().take(take).map(|(_, c)| c).collect()
            }
        }
    }

    pub fn activate(&self, registry: &ProfileRegistry) -> ActiveBreakingsMap {
        let map = ActiveBreakingsMap::from_entries(
            registry
                .iter()
                .map(|profile| (profile.key.clone(), self.select(profile))),
        );

        info!(
            mode = self.mode.as_str(),
            endpoints = map.len(),
            active = map.total_active(),
            snapshot = %map.snapshot_id(),
            "computed active breakings"
        );
        map
    }
}

fn selection_rank(seed: &str, key: &EndpointKey, category: Category) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}|{}", seed, key, category.as_str()).as_bytes());
    hex::encode(hasher.finalize())
}
