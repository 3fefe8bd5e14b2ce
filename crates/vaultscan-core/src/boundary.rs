//! Vault boundary checks.
//!
//! Every path reached through a symlink, and every rename destination, is
//! checked here before it is opened or created.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Resolve `path` to an absolute, `..`-free form.
///
/// Existing paths go through the filesystem (symlinks followed). For a path
/// that does not exist yet, the deepest existing ancestor is canonicalized and
/// the remaining components are applied lexically on top of it.
pub fn resolve(path: &Path) -> Option<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Some(canonical);
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut pending = Vec::new();
    loop {
        if let Ok(base) = existing.canonicalize() {
            let mut resolved = base;
            for component in pending.iter().rev() {
                match component {
                    Component::ParentDir => {
                        resolved.pop();
                    }
                    Component::Normal(name) => resolved.push(name),
                    _ => {}
                }
            }
            return Some(resolved);
        }
        let component = existing.components().next_back()?;
        pending.push(component);
        existing = existing.parent()?;
    }
}

/// True iff `candidate` is `root` or lies below it by whole components.
///
/// Never errors: anything that cannot be resolved is outside.
pub fn is_within(candidate: &Path, root: &Path) -> bool {
    match (resolve(candidate), resolve(root)) {
        (Some(candidate), Some(root)) => candidate.starts_with(&root),
        _ => false,
    }
}

/// Boundary checks against one canonical vault root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryGuard {
    root: PathBuf,
}

impl BoundaryGuard {
    /// Canonicalize `root`; it must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let canonical = root
            .canonicalize()
            .map_err(|e| Error::invalid_vault(root, e.to_string()))?;
        if !canonical.is_dir() {
            return Err(Error::invalid_vault(root, "not a directory"));
        }
        Ok(Self { root: canonical })
    }

    /// Canonical vault root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `candidate` resolves inside the vault
    pub fn contains(&self, candidate: &Path) -> bool {
        resolve(candidate).is_some_and(|resolved| resolved.starts_with(&self.root))
    }

    /// Resolved form of `candidate`, or `BoundaryEscape`
    pub fn check(&self, candidate: &Path) -> Result<PathBuf> {
        match resolve(candidate) {
            Some(resolved) if resolved.starts_with(&self.root) => Ok(resolved),
            _ => Err(Error::boundary_escape(candidate)),
        }
    }

    /// Vault-relative, `/`-separated form of a path under the root
    pub fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect();
        Some(parts.join("/"))
    }
}
