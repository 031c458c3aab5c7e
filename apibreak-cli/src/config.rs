//! Configuration file loading for apibreak.
//!
//! Discovers and loads `apibreak.toml` from the repository root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use apibreak_core::settings::BreakingSettings;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "apibreak.toml";

/// Top-level configuration from apibreak.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApibreakConfig {
    /// Global activation flags.
    pub breaking: BreakingConfigSection,

    /// Where profile declarations live.
    pub profiles: ProfilesConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreakingConfigSection {
    pub enabled: bool,
    pub all_mode: bool,
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfilesConfig {
    /// Profile directory, relative to the repository root.
    pub dir: Option<Utf8PathBuf>,

    /// Route table file, relative to the repository root.
    pub routes: Option<Utf8PathBuf>,
}

/// Discover the apibreak.toml config file in the repository root.
pub fn discover_config(repo_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = repo_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<ApibreakConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<ApibreakConfig> {
    let config: ApibreakConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from repo root, or return default if not found.
pub fn load_or_default(repo_root: &Utf8Path) -> anyhow::Result<ApibreakConfig> {
    match discover_config(repo_root) {
        Some(path) => load_config(&path),
        None => Ok(ApibreakConfig::default()),
    }
}

/// Values given on the command line or through `APIBREAK_*` variables.
///
/// `None` means "not given"; the config file value (or the default) is used.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub enabled: Option<bool>,
    pub all_mode: Option<bool>,
    pub seed: Option<String>,
    pub profiles_dir: Option<Utf8PathBuf>,
    pub routes_file: Option<Utf8PathBuf>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ApibreakConfig,
}

impl ConfigMerger {
    pub fn new(config: ApibreakConfig) -> Self {
        Self { config }
    }

    /// Resolve settings. Paths from the config file are joined onto `repo_root`;
    /// paths from the CLI are used as given.
    pub fn merge(self, repo_root: &Utf8Path, cli: CliOverrides) -> BreakingSettings {
        let defaults = BreakingSettings::default();
        let file = self.config;

        let profiles_dir = cli.profiles_dir.unwrap_or_else(|| {
            repo_root.join(file.profiles.dir.as_ref().unwrap_or(&defaults.profiles_dir))
        });
        let routes_file = cli
            .routes_file
            .or_else(|| file.profiles.routes.map(|r| repo_root.join(r)));

        BreakingSettings {
            enabled: cli.enabled.unwrap_or(file.breaking.enabled),
            all_mode: cli.all_mode.unwrap_or(file.breaking.all_mode),
            seed: cli.seed.or(file.breaking.seed).unwrap_or(defaults.seed),
            profiles_dir,
            routes_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apibreak_types::ActivationMode;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[breaking]
enabled = true
all_mode = false
seed = "staging-2024"

[profiles]
dir = "api/breaking"
routes = "api/routes.txt"
"#;

        let config = parse_config(contents).unwrap();
        assert!(config.breaking.enabled);
        assert!(!config.breaking.all_mode);
        assert_eq!(config.breaking.seed.as_deref(), Some("staging-2024"));
        assert_eq!(config.profiles.dir.as_deref(), Some(Utf8Path::new("api/breaking")));
        assert_eq!(
            config.profiles.routes.as_deref(),
            Some(Utf8Path::new("api/routes.txt"))
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert!(!config.breaking.enabled);
        assert!(config.breaking.seed.is_none());
        assert!(config.profiles.dir.is_none());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = parse_config("[breaking]\nenable = true\n").unwrap_err();
        assert!(format!("{err:#}").contains("enable"));
    }

    #[test]
    fn test_merge_defaults() {
        let settings = ConfigMerger::new(ApibreakConfig::default())
            .merge(Utf8Path::new("/repo"), CliOverrides::default());
        assert_eq!(settings.mode(), ActivationMode::Disabled);
        assert_eq!(settings.seed, "apibreak");
        assert_eq!(settings.profiles_dir, Utf8PathBuf::from("/repo/profiles"));
        assert!(settings.routes_file.is_none());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = parse_config(
            "[breaking]\nenabled = true\nall_mode = true\nseed = \"file\"\n[profiles]\ndir = \"p\"\n",
        )
        .unwrap();
        let settings = ConfigMerger::new(config).merge(
            Utf8Path::new("/repo"),
            CliOverrides {
                all_mode: Some(false),
                seed: Some("cli".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(settings.mode(), ActivationMode::Normal);
        assert_eq!(settings.seed, "cli");
        assert_eq!(settings.profiles_dir, Utf8PathBuf::from("/repo/p"));
    }

    #[test]
    fn test_cli_can_disable() {
        let config = parse_config("[breaking]\nenabled = true\n").unwrap();
        let settings = ConfigMerger::new(config).merge(
            Utf8Path::new("."),
            CliOverrides {
                enabled: Some(false),
                ..Default::default()
            },
        );
        assert_eq!(settings.mode(), ActivationMode::Disabled);
    }

    #[test]
    fn test_load_or_default_reads_file() {
        let temp = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp.path()).unwrap();
        assert!(load_or_default(root).unwrap().profiles.routes.is_none());

        std::fs::write(
            root.join(CONFIG_FILE_NAME),
            "[profiles]\nroutes = \"routes.txt\"\n",
        )
        .unwrap();
        let config = load_or_default(root).unwrap();
        assert_eq!(
            config.profiles.routes.as_deref(),
            Some(Utf8Path::new("routes.txt"))
        );
    }

    #[test]
    fn test_load_reports_bad_toml_with_path() {
        let temp = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp.path()).unwrap();
        std::fs::write(root.join(CONFIG_FILE_NAME), "[breaking\n").unwrap();
        let err = load_or_default(root).unwrap_err();
        assert!(format!("{err:#}").contains(CONFIG_FILE_NAME));
    }
}
