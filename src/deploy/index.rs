//! Index page and `.nojekyll` marker.

use crate::embed::{Template, index::IndexVars};
use anyhow::{Context, Result};
use std::{fs, path::Path};

pub const INDEX_FILE: &str = "index.html";
pub const NOJEKYLL_FILE: &str = ".nojekyll";

/// Top-level entries of `dir` shown on the index, sorted by byte order.
///
/// Hidden names and the index file itself are left out.
pub fn list_entries(dir: &Path) -> Result<Vec<String>> {
    let read = fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut names = Vec::new();
    for entry in read {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || name == INDEX_FILE {
            continue;
        }
        names.push(name);
    }

    names.sort_unstable();
    Ok(names)
}

/// Render `index.html` for the current listing of `dir` and write `.nojekyll`.
///
/// Returns the listed names.
pub fn write_index(
    dir: &Path,
    template: &Template<IndexVars<'static>>,
    title: &str,
) -> Result<Vec<String>> {
    let names = list_entries(dir)?;
    let html = template.render(&IndexVars {
        names: &names,
        title,
    });

    let index = dir.join(INDEX_FILE);
    fs::write(&index, html).with_context(|| format!("Failed to write {}", index.display()))?;

    let marker = dir.join(NOJEKYLL_FILE);
    fs::write(&marker, "").with_context(|| format!("Failed to write {}", marker.display()))?;

    Ok(names)
}
