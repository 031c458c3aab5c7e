use anyhow::Context;
use apibreak_types::ProfileDecl;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LoadedProfileFile {
    pub path: Utf8PathBuf,
    pub decls: Result<Vec<ProfileDecl>, ProfileLoadError>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileLoadError {
    #[error("io error: {message}")]
    Io { message: String },

    #[error("json parse error: {message}")]
    Json { message: String },
}

/// A file holds either one declaration or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<ProfileDecl>),
    One(ProfileDecl),
}

pub fn parse_profile_file(contents: &str) -> Result<Vec<ProfileDecl>, ProfileLoadError> {
    match serde_json::from_str::<OneOrMany>(contents) {
        Ok(OneOrMany::Many(decls)) => Ok(decls),
        Ok(OneOrMany::One(decl)) => Ok(vec![decl]),
        Err(e) => Err(ProfileLoadError::Json {
            message: e.to_string(),
        }),
    }
}

/// Scan `<profiles_dir>/*.json`. A missing directory yields no files.
pub fn load_profile_files(profiles_dir: &Utf8Path) -> anyhow::Result<Vec<LoadedProfileFile>> {
    let pattern = profiles_dir.join("*.json");
    let pattern_str = pattern.as_str();

    debug!(pattern = %pattern_str, "scanning for endpoint profiles");

    let mut out = Vec::new();
    for entry in glob(pattern_str).context("glob profiles/*.json")? {
        let path = entry
            .map_err(|e| anyhow::anyhow!("glob error: {e}"))?
            .to_string_lossy()
            .to_string();
        let utf8_path = Utf8PathBuf::from(path);

        let decls = match fs::read_to_string(&utf8_path) {
            Ok(s) => parse_profile_file(&s),
            Err(e) => Err(ProfileLoadError::Io {
                message: e.to_string(),
            }),
        };

        out.push(LoadedProfileFile {
            path: utf8_path,
            decls,
        });
    }

    // Registry duplicate errors name the first source; keep that stable.
    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}
