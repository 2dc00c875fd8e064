//! Where a deployment can be seen.

use crate::{embed::index::encode_segment, utils::remote::parse_remote};
use std::path::Path;

/// Describe a finished push.
///
/// Remotes on github.com or gitlab.com map to their Pages URL; anything else
/// is described as `pushed <src> to <remote>:<branch>/<target>`.
pub fn describe(remote: &str, branch: &str, target: &str, src: &Path) -> String {
    match pages_url(remote, target) {
        Some(url) => format!("published at {url}"),
        None => format!(
            "pushed {} to {}:{}/{}",
            src.display(),
            remote,
            branch,
            target
        ),
    }
}

/// Public Pages URL of `target` for a hosted remote.
pub fn pages_url(remote: &str, target: &str) -> Option<String> {
    let repo = parse_remote(remote)?;
    let domain = match repo.host.as_str() {
        "github.com" => "github.io",
        "gitlab.com" => "gitlab.io",
        _ => return None,
    };

    let owner = repo.owner.to_ascii_lowercase();
    let site = format!("{owner}.{domain}");
    let target = encode_segment(target);

    // A repository named after the Pages domain is the owner's root site
    if repo.name.eq_ignore_ascii_case(&site) {
        Some(format!("https://{site}/{target}/"))
    } else {
        Some(format!("https://{site}/{}/{target}/", repo.name))
    }
}
