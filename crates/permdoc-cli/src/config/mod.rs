//! Configuration management.

use anyhow::Result;
use directories::ProjectDirs;
use permdoc::{EngineOptions, PermdocError, Platform, UnixPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "PERMDOC_CONFIG";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Always show explanations (as if --explain was passed).
    #[serde(default)]
    pub explain_by_default: bool,

    /// Superuser bypass; unset means the platform default.
    pub root_bypass: Option<bool>,

    /// Check traversal of the parent directory.
    #[serde(default = "default_true")]
    pub check_parent: bool,

    /// Report files with more than one hard link.
    #[serde(default = "default_true")]
    pub check_hard_links: bool,

    /// Symlink hops followed before reporting a cycle.
    #[serde(default = "default_link_depth")]
    pub max_link_depth: usize,

    /// Platform override (linux, macos, bsd, unix).
    pub platform: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_link_depth() -> usize {
    permdoc::inspect::DEFAULT_MAX_DEPTH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: None,
            explain_by_default: false,
            root_bypass: None,
            check_parent: true,
            check_hard_links: true,
            max_link_depth: default_link_depth(),
            platform: None,
        }
    }
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("dev", "permdoc", "permdoc")
            .ok_or_else(|| PermdocError::Config("could not determine config directory".into()))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from file.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PermdocError::io(path.display().to_string(), e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| PermdocError::Config(format!("{}: {e}", path.display())))?;

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PermdocError::io(parent.display().to_string(), e))?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| PermdocError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| PermdocError::io(path.display().to_string(), e))?;

        Ok(())
    }

    /// Configured platform, or the one this binary was built for.
    pub fn platform(&self) -> Result<Platform> {
        match &self.platform {
            Some(name) => Ok(name.parse()?),
            None => Ok(Platform::detect()),
        }
    }

    /// Access policy for `platform`, honouring the bypass override.
    pub fn policy(&self, platform: Platform) -> UnixPolicy {
        self.root_bypass
            .map_or_else(|| UnixPolicy::for_platform(platform), UnixPolicy::new)
    }

    /// Engine switches resolved once at startup.
    pub fn engine_options(&self) -> Result<EngineOptions> {
        if self.max_link_depth == 0 {
            return Err(PermdocError::Config("max_link_depth must be at least 1".into()).into());
        }
        Ok(EngineOptions {
            check_parent: self.check_parent,
            check_hard_links: self.check_hard_links,
            max_link_depth: self.max_link_depth,
            platform: self.platform()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: Config = toml::from_str("explain_by_default = true\n").unwrap();
        assert!(config.explain_by_default);
        assert!(config.check_parent);
        assert!(config.check_hard_links);
        assert_eq!(config.max_link_depth, 40);
        assert_eq!(config.root_bypass, None);
    }

    #[test]
    fn root_bypass_override_wins() {
        let config = Config {
            root_bypass: Some(false),
            ..Config::default()
        };
        assert!(!config.policy(Platform::Linux).root_bypass());
        assert!(Config::default().policy(Platform::Linux).root_bypass());
        assert!(!Config::default().policy(Platform::OtherUnix).root_bypass());
    }

    #[test]
    fn bad_platform_is_rejected() {
        let config = Config {
            platform: Some("plan9".into()),
            ..Config::default()
        };
        assert!(config.engine_options().is_err());
    }

    #[test]
    fn zero_link_depth_is_a_config_error() {
        let config = Config {
            max_link_depth: 0,
            ..Config::default()
        };
        let err = config.engine_options().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PermdocError>(),
            Some(PermdocError::Config(_))
        ));
    }

    #[test]
    fn load_and_save_failures_are_typed() {
        let dir = tempfile::tempdir().unwrap();

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "check_parent = \"yes\"\n").unwrap();
        let err = Config::load_from(&broken).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PermdocError>(),
            Some(PermdocError::Config(msg)) if msg.contains("broken.toml")
        ));

        // A directory where the file should be cannot be read.
        let err = Config::load_from(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PermdocError>(),
            Some(PermdocError::Io { .. })
        ));

        let saved = dir.path().join("nested").join("config.toml");
        let config = Config {
            check_hard_links: false,
            ..Config::default()
        };
        config.save_to(&saved).unwrap();
        assert_eq!(Config::load_from(&saved).unwrap(), config);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config {
            output_format: Some(OutputFormat::Json),
            platform: Some("bsd".into()),
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), config);
    }
}
