//! Tag-name parsing
//!
//! Tags carry versions in the form `v1.2.3` or `v1.2.3-rc.4`, possibly
//! embedded in other decorations (`release-v1.2.3`, `v1.2.3-api`). Anything
//! that does not contain the pattern is simply not a version tag.

use crate::domain::version::SemVer;
use regex::Regex;
use std::sync::OnceLock;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"v?(\d+)\.(\d+)\.(\d+)(?:-rc\.(\d+))?").expect("version pattern is valid")
    })
}

/// Extract a version from a tag's local name.
///
/// Returns `None` when the name contains no version pattern or when a
/// numeric group does not fit a `u32`; callers treat such tags as noise, not
/// as errors.
pub fn parse_tag_name(name: &str) -> Option<SemVer> {
    let caps = version_pattern().captures(name)?;

    let major = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let minor = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let patch = caps.get(3)?.as_str().parse::<u32>().ok()?;

    match caps.get(4) {
        Some(rc) => {
            let rc = rc.as_str().parse::<u32>().ok()?;
            Some(SemVer::candidate(major, minor, patch, rc))
        }
        None => Some(SemVer::finalized(major, minor, patch)),
    }
}

/// Whether a tag name carries trailing text after its version match.
///
/// `v1.2.3-api` does (`-api` is a module suffix), `v1.2.3` and `v1.2.3-rc.1`
/// do not. Unparsable names report `false`.
pub fn has_module_suffix(name: &str) -> bool {
    version_pattern()
        .find(name)
        .map(|m| m.end() < name.len())
        .unwrap_or(false)
}

/// Strip the ref path from a fully qualified tag ref, e.g.
/// `refs/tags/v1.2.3` -> `v1.2.3`. Local names pass through unchanged.
pub fn local_name(ref_name: &str) -> &str {
    ref_name
        .strip_prefix("refs/tags/")
        .unwrap_or(ref_name)
}
