//! Path normalization and directory tree utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - resolve relative paths against a base directory
//! - `copy_dir_all` - recursive copy of a directory tree
//! - `remove_dir_if_exists` - recursive delete that tolerates a missing path

use anyhow::{Context, Result, anyhow};
use jwalk::{Parallelism, WalkDir};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve `path` against `base` unless it is already absolute, then normalize.
#[inline]
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Whether `path` exists.
///
/// "Not found" is `Ok(false)`; any other error (permissions, I/O) propagates.
pub fn exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("Failed to access {}", path.display())),
    }
}

/// Remove a file or directory tree. Missing paths are not an error.
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to access {}", path.display()));
        }
    };

    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
    .with_context(|| format!("Failed to remove {}", path.display()))
}

/// Recursively copy the contents of `src` into `dest`, creating `dest`.
///
/// Hidden entries are copied too. Symlinks are followed: a link to a file
/// becomes a regular file, a link to a directory becomes a copied directory.
/// A link back into a directory that is still being copied is an error.
/// Returns the number of files copied.
pub fn copy_dir_all(src: &Path, dest: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Err(anyhow!("{} is not a directory", src.display()));
    }
    let root = src
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", src.display()))?;

    let mut active = vec![root.clone()];
    copy_tree(&root, dest, &mut active)
}

/// Copy the canonical directory `src` into `dest`.
///
/// `active` holds the canonical roots of every walk in progress.
fn copy_tree(src: &Path, dest: &Path, active: &mut Vec<PathBuf>) -> Result<usize> {
    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut copied = 0;
    let walker = WalkDir::new(src)
        .skip_hidden(false)
        .sort(true)
        .parallelism(Parallelism::Serial);

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        if entry.depth() == 0 {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(src)?;
        let target = dest.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else if file_type.is_symlink() && path.is_dir() {
            let resolved = path
                .canonicalize()
                .with_context(|| format!("Failed to resolve {}", path.display()))?;
            // The link's parent is inside the current walk, so an ancestor
            // of either is a directory we are still copying.
            let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
            if active.iter().chain([&parent]).any(|dir| dir.starts_with(&resolved)) {
                return Err(anyhow!(
                    "Symlink cycle: {} points to {}",
                    path.display(),
                    resolved.display()
                ));
            }
            active.push(resolved.clone());
            let result = copy_tree(&resolved, &target, active);
            active.pop();
            copied += result?;
        } else {
            copy_file(&path, &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}
