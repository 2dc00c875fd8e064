//! Version coercion and the "better target" naming policy.
//!
//! Deploying `1.2.0`, `1.2.1` and `v1.2.2` with `--better-target` all land in
//! the `1.2` directory, so patch releases overwrite each other instead of
//! piling up as new top-level entries.

use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

/// First `major[.minor[.patch]]` run in a string, not preceded by a digit.
static COERCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])([0-9]+)(?:\.([0-9]+))?(?:\.([0-9]+))?").unwrap());

/// Coerce a branch/tag name into a semantic version.
///
/// Strict semver (with an optional `v` or `=` prefix) is parsed as-is.
/// Anything else falls back to the first numeric run found in the string,
/// missing minor/patch defaulting to zero. Returns `None` when the string
/// holds no number or a component overflows `u64`.
///
/// # Examples
/// ```ignore
/// coerce("v1.2.3-beta.1") -> Some(1.2.3-beta.1)
/// coerce("release-2.7")   -> Some(2.7.0)
/// coerce("3")             -> Some(3.0.0)
/// coerce("master")        -> None
/// ```
pub fn coerce(input: &str) -> Option<Version> {
    let trimmed = input.trim();
    let strict = trimmed.trim_start_matches(['v', '=']);
    if let Ok(version) = Version::parse(strict) {
        return Some(version);
    }

    let caps = COERCE_RE.captures(trimmed)?;
    let part = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Map a target name to its `major.minor` prefix when it looks like a version.
///
/// Names that don't coerce to a version are returned unchanged.
pub fn better_target(name: &str) -> String {
    match coerce(name) {
        Some(version) => format!("{}.{}", version.major, version.minor),
        None => name.to_string(),
    }
}
