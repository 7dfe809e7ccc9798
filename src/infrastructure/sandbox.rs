//! # Sandbox
//!
//! Confines caller-supplied filenames to a single root directory.
//! Every file read, write, existence check and execution goes through
//! [`Sandbox::resolve_path`] first.

use std::path::{Component, Path, PathBuf};

use crate::domain::error::ToolError;

/// Symlink hops followed while resolving one path (matches Linux `MAXSYMLINKS`).
const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug)]
pub struct Sandbox {
    root_dir: PathBuf,
}

impl Sandbox {
    /// Wraps `root` without touching the filesystem beyond resolving it.
    /// A root that does not exist is kept in normalized absolute form.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let absolute = std::path::absolute(&root).unwrap_or(root);
        Self {
            root_dir: normalize(&absolute, 0),
        }
    }

    /// Creates the root directory (and parents) if needed, then wraps it.
    pub fn create(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Resolves `filename` relative to the root, following `..` and symlinks.
    /// Fails with `PathEscape` if the result is not the root or a descendant of it.
    pub fn resolve_path(&self, filename: &str) -> Result<PathBuf, ToolError> {
        let resolved = normalize(&self.root_dir.join(filename), 0);
        if resolved.starts_with(&self.root_dir) {
            Ok(resolved)
        } else {
            Err(ToolError::PathEscape(filename.to_string()))
        }
    }
}

/// Canonicalizes the longest existing prefix of `path` and applies the rest
/// lexically, so paths that do not exist yet can still be checked.
fn normalize(path: &Path, hops: usize) -> PathBuf {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(canonical) = std::fs::canonicalize(&resolved) {
                    resolved = canonical;
                } else if let Ok(target) = std::fs::read_link(&resolved) {
                    // Dangling symlink: resolve where it would point.
                    resolved.pop();
                    if hops >= MAX_SYMLINK_HOPS {
                        return PathBuf::from("/");
                    }
                    resolved = normalize(&resolved.join(target), hops + 1);
                }
            }
        }
    }

    resolved
}
