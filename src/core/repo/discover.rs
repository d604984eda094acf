use std::fs;
use std::path::{Path, PathBuf};

use super::Repository;
use crate::error::{Error, Result};

/// Walk `root` top-down and return every repository whose control directory
/// (`marker`) is found.
///
/// Entries are visited in sorted order, so results are stable. Matched control
/// directories are never descended into and symlinks are not followed, so each
/// control directory is reached by exactly one path. Repository ids are
/// relative to `root`.
pub fn find_repositories(root: &Path, marker: &str) -> Result<Vec<Repository>> {
    if marker.is_empty() || marker.contains(['/', '\\']) {
        return Err(Error::config_invalid_value(
            "repos.marker",
            Some(marker.to_string()),
            "must be a single directory name",
        ));
    }

    if !root.is_dir() {
        return Err(Error::validation_invalid_argument(
            "root",
            format!("Not a directory: {}", root.display()),
            None,
            None,
        ));
    }

    let mut repos = Vec::new();
    walk(root, marker, &mut repos);
    Ok(repos
        .into_iter()
        .map(|repo| repo.relative_to(root))
        .collect())
}

fn walk(dir: &Path, marker: &str, repos: &mut Vec<Repository>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut subdirs: Vec<(String, PathBuf)> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| (entry.file_name().to_string_lossy().to_string(), entry.path()))
        .collect();
    subdirs.sort();

    if let Some((_, control_dir)) = subdirs.iter().find(|(name, _)| name == marker) {
        repos.push(Repository::from_control_dir(control_dir.clone()));
    }

    for (name, path) in &subdirs {
        if name != marker {
            walk(path, marker, repos);
        }
    }
}
