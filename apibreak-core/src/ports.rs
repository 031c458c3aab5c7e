//! Port traits abstracting all I/O away from the engine.

use apibreak_profiles::{LoadedProfileFile, RouteTable};
use camino::Utf8Path;

/// Source of endpoint profile declarations.
pub trait ProfileSource {
    fn load_profiles(&self) -> anyhow::Result<Vec<LoadedProfileFile>>;

    /// Registered routes to validate profiles against. `None` skips validation.
    fn load_routes(&self) -> anyhow::Result<Option<RouteTable>> {
        Ok(None)
    }
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
