//! Default filesystem-backed port implementations.

use crate::ports::{ProfileSource, WritePort};
use anyhow::Context;
use apibreak_profiles::{LoadedProfileFile, RouteTable, parse_route_table};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

/// Loads profiles from `*.json` files in a directory, and optionally a route table file.
#[derive(Debug, Clone)]
pub struct FsProfileSource {
    pub profiles_dir: Utf8PathBuf,
    pub routes_file: Option<Utf8PathBuf>,
}

impl FsProfileSource {
    pub fn new(profiles_dir: Utf8PathBuf) -> Self {
        Self {
            profiles_dir,
            routes_file: None,
        }
    }

    pub fn with_routes(mut self, routes_file: Utf8PathBuf) -> Self {
        self.routes_file = Some(routes_file);
        self
    }
}

impl ProfileSource for FsProfileSource {
    fn load_profiles(&self) -> anyhow::Result<Vec<LoadedProfileFile>> {
        apibreak_profiles::load_profile_files(&self.profiles_dir)
            .with_context(|| format!("load profiles from {}", self.profiles_dir))
    }

    fn load_routes(&self) -> anyhow::Result<Option<RouteTable>> {
        let Some(path) = &self.routes_file else {
            return Ok(None);
        };
        let contents = fs_err::read_to_string(path).with_context(|| format!("read {}", path))?;
        let table =
            parse_route_table(&contents).with_context(|| format!("parse route table {}", path))?;
        debug!(path = %path, routes = table.len(), "loaded route table");
        Ok(Some(table))
    }
}

/// In-memory profile source for embedding and testing.
///
/// Files are sorted by path on construction to match `FsProfileSource`'s ordering.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileSource {
    files: Vec<LoadedProfileFile>,
    routes: Option<RouteTable>,
}

impl InMemoryProfileSource {
    pub fn new(mut files: Vec<LoadedProfileFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            files,
            routes: None,
        }
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }
}

impl ProfileSource for InMemoryProfileSource {
    fn load_profiles(&self) -> anyhow::Result<Vec<LoadedProfileFile>> {
        Ok(self.files.clone())
    }

    fn load_routes(&self) -> anyhow::Result<Option<RouteTable>> {
        Ok(self.routes.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs_err::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs_err::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apibreak_profiles::ProfileLoadError;
    use tempfile::TempDir;

    fn broken(path: &str) -> LoadedProfileFile {
        LoadedProfileFile {
            path: Utf8PathBuf::from(path),
            decls: Err(ProfileLoadError::Json {
                message: "stub".to_string(),
            }),
        }
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir")
    }

    #[test]
    fn in_memory_sorts_by_path() {
        let source = InMemoryProfileSource::new(vec![
            broken("profiles/z.json"),
            broken("profiles/a.json"),
            broken("profiles/m.json"),
        ]);
        let loaded = source.load_profiles().unwrap();
        let paths: Vec<&str> = loaded.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["profiles/a.json", "profiles/m.json", "profiles/z.json"]
        );
        assert!(source.load_routes().unwrap().is_none());
    }

    #[test]
    fn fs_source_reads_profiles_and_routes() {
        let tmp = TempDir::new().unwrap();
        let root = utf8(&tmp);
        let profiles = root.join("profiles");
        std::fs::create_dir_all(&profiles).unwrap();
        std::fs::write(
            profiles.join("orders.json"),
            r#"{ "method": "GET", "path": "/orders", "availableCategories": ["STATUS_CODE"] }"#,
        )
        .unwrap();
        let routes = root.join("routes.txt");
        std::fs::write(&routes, "# routes\nGET /orders\nGET /orders/:id\n").unwrap();

        let source = FsProfileSource::new(profiles).with_routes(routes);
        let loaded = source.load_profiles().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].decls.is_ok());

        let table = source.load_routes().unwrap().expect("route table");
        assert_eq!(table.len(), 2);
        assert!(table.contains(&"GET /orders/{id}".parse().unwrap()));
    }

    #[test]
    fn fs_source_reports_missing_route_file() {
        let tmp = TempDir::new().unwrap();
        let root = utf8(&tmp);
        let source = FsProfileSource::new(root.clone()).with_routes(root.join("nope.txt"));
        let err = source.load_routes().unwrap_err();
        assert!(format!("{err:#}").contains("nope.txt"));
    }

    #[test]
    fn write_port_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let target = utf8(&tmp).join("out/nested/activation.json");
        FsWritePort.write_file(&target, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "{}");
    }
}
