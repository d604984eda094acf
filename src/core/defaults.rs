use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::utils::io;

/// Root configuration structure for rigger.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RiggerConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via rigger.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Defaults {
    #[serde(default)]
    pub repos: ReposConfig,

    #[serde(default)]
    pub vcs: VcsConfig,

    #[serde(default)]
    pub jobs: JobsConfig,
}

/// Repository discovery and fan-out defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReposConfig {
    /// Enumeration root used when no `--root` or `--repo` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Name of the control directory that marks a repository.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Remote names (or glob patterns) skipped by fetch/push/pull unless overridden.
    #[serde(default)]
    pub exclude_remotes: Vec<String>,

    #[serde(default)]
    pub parallel: bool,
}

impl Default for ReposConfig {
    fn default() -> Self {
        Self {
            root: None,
            marker: default_marker(),
            exclude_remotes: Vec::new(),
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VcsConfig {
    #[serde(default = "default_vcs_program")]
    pub program: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            program: default_vcs_program(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct JobsConfig {
    #[serde(default)]
    pub continue_on_failure: bool,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_marker() -> String {
    ".git".to_string()
}

fn default_vcs_program() -> String {
    "git".to_string()
}

impl ReposConfig {
    /// Configured root with `~` and environment variables expanded.
    pub fn expanded_root(&self) -> Option<PathBuf> {
        self.root
            .as_deref()
            .filter(|root| !root.trim().is_empty())
            .map(|root| {
                let expanded = shellexpand::full(root)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| shellexpand::tilde(root).to_string());
                PathBuf::from(expanded)
            })
    }
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If rigger.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full rigger.json config, falling back to defaults on any error.
pub fn load_config() -> RiggerConfig {
    paths::rigger_json()
        .ok()
        .filter(|path| path.exists())
        .and_then(|path| load_config_from(&path).ok())
        .unwrap_or_default()
}

/// Load config from an explicit file.
pub fn load_config_from(path: &Path) -> crate::Result<RiggerConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))
}

/// Save config to rigger.json file (creates if missing).
pub fn save_config(config: &RiggerConfig) -> crate::Result<()> {
    let path = paths::rigger_json()?;
    save_config_to(config, &path)
}

pub fn save_config_to(config: &RiggerConfig, path: &Path) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }

    let content = serde_json::to_string_pretty(config).map_err(|e| {
        crate::Error::internal_json(e.to_string(), Some("serialize rigger.json".to_string()))
    })?;

    io::write_file_atomic(path, &content, "write rigger.json")
}

/// Check if rigger.json file exists
pub fn config_exists() -> bool {
    paths::rigger_json().map(|p| p.exists()).unwrap_or(false)
}

/// Delete rigger.json file (reset to defaults)
pub fn reset_config() -> crate::Result<bool> {
    let path = paths::rigger_json()?;

    if path.exists() {
        fs::remove_file(&path).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("delete {}", path.display())))
        })?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Get the path to rigger.json (for display purposes)
pub fn config_path() -> crate::Result<String> {
    Ok(paths::rigger_json()?.display().to_string())
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_builtin_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rigger.json");
        fs::write(
            &path,
            r#"{ "defaults": { "repos": { "exclude_remotes": ["offline"] } } }"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.defaults.repos.exclude_remotes, vec!["offline"]);
        assert_eq!(config.defaults.repos.marker, ".git");
        assert_eq!(config.defaults.vcs.program, "git");
        assert!(!config.defaults.jobs.continue_on_failure);
    }

    #[test]
    fn invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rigger.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ConfigInvalidJson);
    }

    #[test]
    fn save_then_load_keeps_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("rigger.json");
        let mut config = RiggerConfig::default();
        config.defaults.repos.parallel = true;
        config.defaults.repos.root = Some("~/src".to_string());

        save_config_to(&config, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn blank_root_is_ignored() {
        let repos = ReposConfig {
            root: Some("  ".to_string()),
            ..ReposConfig::default()
        };
        assert!(repos.expanded_root().is_none());
    }
}
