use crate::load::LoadedProfileFile;
use crate::routes::RouteTable;
use apibreak_types::{EndpointBreakingProfile, EndpointKey, EndpointKeyError, ProfileDecl};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate profile for {key}: declared in {first} and {second}")]
    Duplicate {
        key: EndpointKey,
        first: String,
        second: String,
    },

    #[error("invalid endpoint in {source_name}: {error}")]
    InvalidKey {
        source_name: String,
        #[source]
        error: EndpointKeyError,
    },

    #[error("profiles reference endpoints missing from the route table: {}", .keys.join(", "))]
    UnknownRoutes { keys: Vec<String> },
}

/// Global registry of endpoint profiles, keyed by normalized endpoint identity.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<EndpointKey, Arc<EndpointBreakingProfile>>,
    sources: BTreeMap<EndpointKey, String>,
    skipped: Vec<String>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one declaration. `source` names where it came from, for error messages.
    pub fn insert_decl(&mut self, source: &str, decl: &ProfileDecl) -> Result<(), RegistryError> {
        let profile =
            EndpointBreakingProfile::from_decl(decl).map_err(|error| RegistryError::InvalidKey {
                source_name: source.to_string(),
                error,
            })?;
        self.insert(source, profile)
    }

    /// Register an already-built profile.
    pub fn insert(
        &mut self,
        source: &str,
        profile: EndpointBreakingProfile,
    ) -> Result<(), RegistryError> {
        if let Some(first) = self.sources.get(&profile.key) {
            return Err(RegistryError::Duplicate {
                key: profile.key.clone(),
                first: first.clone(),
                second: source.to_string(),
            });
        }

        for d in &profile.diagnostics {
            warn!(
                endpoint = %profile.key,
                source = source,
                category = d.category.map(|c| c.as_str()).unwrap_or("-"),
                "{}",
                d.message
            );
        }
        debug!(endpoint = %profile.key, available = profile.available.len(), "registered profile");

        self.sources.insert(profile.key.clone(), source.to_string());
        self.profiles.insert(profile.key.clone(), Arc::new(profile));
        Ok(())
    }

    pub fn from_decls<'a>(
        decls: impl IntoIterator<Item = (&'a str, &'a ProfileDecl)>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (source, decl) in decls {
            registry.insert_decl(source, decl)?;
        }
        Ok(registry)
    }

    /// Build from loaded files. Files that failed to load are skipped with a warning;
    /// declaration problems inside good files are not.
    pub fn from_loaded(files: &[LoadedProfileFile]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for file in files {
            match &file.decls {
                Ok(decls) => {
                    for (i, decl) in decls.iter().enumerate() {
                        let source = if decls.len() == 1 {
                            file.path.to_string()
                        } else {
                            format!("{}#{}", file.path, i)
                        };
                        registry.insert_decl(&source, decl)?;
                    }
                }
                Err(e) => {
                    warn!(path = %file.path, error = %e, "skipping unreadable profile file");
                    registry.skipped.push(file.path.to_string());
                }
            }
        }
        Ok(registry)
    }

    /// Every profile key must be a registered route.
    pub fn validate_routes(&self, routes: &RouteTable) -> Result<(), RegistryError> {
        let keys: Vec<String> = self
            .profiles
            .keys()
            .filter(|k| !routes.contains(k))
            .map(ToString::to_string)
            .collect();
        if keys.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::UnknownRoutes { keys })
        }
    }

    pub fn get(&self, key: &EndpointKey) -> Option<&Arc<EndpointBreakingProfile>> {
        self.profiles.get(key)
    }

    /// A profiled key that differs from `key` only in parameter names.
    pub fn lookalike(&self, key: &EndpointKey) -> Option<&EndpointKey> {
        self.profiles
            .keys()
            .find(|k| k.method == key.method && *k != key && k.path.same_shape(&key.path))
    }

    pub fn source_of(&self, key: &EndpointKey) -> Option<&str> {
        self.sources.get(key).map(String::as_str)
    }

    /// Profiles in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EndpointBreakingProfile>> {
        self.profiles.values()
    }

    /// Paths of files skipped because they couldn't be read or parsed.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
