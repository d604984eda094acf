use glob_match::glob_match;
use serde::Serialize;

use crate::defaults::ReposConfig;

pub const XOR_BRANCH: &str = "xor-branch";
pub const EXCLUDE_REMOTE: &str = "exclude-remote";
pub const CURRENT_BRANCH: &str = "current-branch";

/// Filters consulted by visitors. Defaults are unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitOptions {
    /// Keep only this branch; other branches are omitted, not failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xor_branch: Option<String>,
    /// Remote names or glob patterns to skip.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_remotes: Vec<String>,
    /// Keep only each repository's checked-out branch.
    pub current_branch: bool,
    /// Process repositories concurrently.
    pub parallel: bool,
}

impl VisitOptions {
    /// Build options from `key=value` pairs. Unrecognized keys are ignored.
    ///
    /// `exclude-remote` may repeat; `current-branch` is a presence flag.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref().trim().to_ascii_lowercase().replace('_', "-");
            let value = value.into();
            match key.as_str() {
                XOR_BRANCH if !value.trim().is_empty() => {
                    options.xor_branch = Some(value.trim().to_string())
                }
                EXCLUDE_REMOTE => options.exclude_remotes.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(String::from),
                ),
                CURRENT_BRANCH => options.current_branch = true,
                _ => {}
            }
        }
        options
    }

    /// Parse a `key=value` (or bare `key`) CLI option.
    pub fn parse_pair(raw: &str) -> (String, String) {
        match raw.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (raw.to_string(), String::new()),
        }
    }

    /// Fold in configured defaults: excluded remotes and parallelism.
    pub fn with_config(mut self, config: &ReposConfig) -> Self {
        for pattern in &config.exclude_remotes {
            if !self.exclude_remotes.contains(pattern) {
                self.exclude_remotes.push(pattern.clone());
            }
        }
        self.parallel |= config.parallel;
        self
    }

    pub fn excludes_remote(&self, remote: &str) -> bool {
        self.exclude_remotes
            .iter()
            .any(|pattern| pattern == remote || glob_match(pattern, remote))
    }

    /// Whether `branch` survives the branch filters. `current` is the
    /// repository's checked-out branch, if any.
    pub fn selects_branch(&self, branch: &str, current: Option<&str>) -> bool {
        if let Some(only) = &self.xor_branch {
            if only != branch {
                return false;
            }
        }
        if self.current_branch && current != Some(branch) {
            return false;
        }
        true
    }
}
