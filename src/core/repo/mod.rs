//! Multi-repository discovery and visiting.

mod discover;
mod fanout;
mod options;
mod visit;

pub use discover::*;
pub use fanout::*;
pub use options::*;
pub use visit::*;

use serde::Serialize;
use std::path::{Path, PathBuf};

/// A discovered repository, identified by its control directory.
///
/// `id` names the repository in reports. It is the work-tree path, relative to
/// the enumeration root for discovered repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub control_dir: PathBuf,
    pub work_tree: PathBuf,
}

impl Repository {
    pub fn from_control_dir(control_dir: impl Into<PathBuf>) -> Self {
        let control_dir = control_dir.into();
        let work_tree = control_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| control_dir.clone());
        let name = work_tree
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| work_tree.display().to_string());

        Self {
            id: work_tree.to_string_lossy().replace('\\', "/"),
            name,
            control_dir,
            work_tree,
        }
    }

    /// Re-key `id` relative to `root`. The root's own repository keeps its name.
    pub fn relative_to(mut self, root: &Path) -> Self {
        if let Ok(relative) = self.work_tree.strip_prefix(root) {
            self.id = if relative.as_os_str().is_empty() {
                self.name.clone()
            } else {
                relative.to_string_lossy().replace('\\', "/")
            };
        }
        self
    }

    /// Accept either a work tree or its control directory.
    pub fn from_path(path: &Path, marker: &str) -> Self {
        if path.file_name().is_some_and(|n| n == marker) {
            Self::from_control_dir(path)
        } else {
            Self::from_control_dir(path.join(marker))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

impl Remote {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
