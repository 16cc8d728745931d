//! Module change detection
//!
//! Answers "did anything under these paths change since the module's last
//! release?" by diffing the baseline tag's tree against HEAD, names and
//! statuses only. Used to gate optional per-module release work, so a
//! failure here must never fail the build.

use crate::domain::{parse_tag_name, SemVer};
use crate::error::Result;
use crate::git::{Repository, TagRef};
use tracing::{debug, warn};

/// Detects whether watched paths changed since a module's baseline tag.
pub struct ChangeDetector<'a, R: Repository> {
    repo: &'a R,
}

impl<'a, R: Repository> ChangeDetector<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        ChangeDetector { repo }
    }

    /// Infallible form: repository errors degrade to "unchanged" with a
    /// logged warning, since this check only gates optional work.
    pub fn has_changed(&self, module_suffix: Option<&str>, watched_paths: &[String]) -> bool {
        match self.try_has_changed(module_suffix, watched_paths) {
            Ok(changed) => changed,
            Err(e) => {
                warn!(error = %e, "change detection failed, treating module as unchanged");
                false
            }
        }
    }

    /// Whether any path under `watched_paths` differs between the baseline
    /// tag and HEAD.
    ///
    /// The baseline is the highest tag ending in `-<module_suffix>`, falling
    /// back to the highest parsable tag of any name. With no baseline at all
    /// (or no resolvable HEAD) there is nothing to compare against, and the
    /// module counts as changed exactly when there are paths to watch.
    pub fn try_has_changed(
        &self,
        module_suffix: Option<&str>,
        watched_paths: &[String],
    ) -> Result<bool> {
        if watched_paths.is_empty() {
            return Ok(false);
        }

        let baseline = self.find_baseline(module_suffix)?;

        let head = match self.repo.resolve_ref("HEAD")? {
            Some(oid) => oid,
            None => return Ok(true),
        };

        let Some(baseline) = baseline else {
            return Ok(true);
        };
        debug!(baseline = %baseline.name, "comparing against baseline tag");

        let normalized_watch: Vec<String> =
            watched_paths.iter().map(|p| normalize_path(p)).collect();

        let changes = self.repo.diff_paths(Some(baseline.commit()), head)?;
        Ok(changes.iter().any(|change| {
            let path = normalize_path(&change.path);
            normalized_watch
                .iter()
                .any(|watched| path.starts_with(watched.as_str()))
        }))
    }

    /// Highest-version tag for the module, widening to all parsable tags
    /// when the module has never been tagged.
    fn find_baseline(&self, module_suffix: Option<&str>) -> Result<Option<TagRef>> {
        let parsed: Vec<(SemVer, TagRef)> = self
            .repo
            .list_tags()?
            .into_iter()
            .filter_map(|tag| parse_tag_name(&tag.name).map(|version| (version, tag)))
            .collect();

        let considered: Vec<&(SemVer, TagRef)> = match module_suffix {
            Some(suffix) if !suffix.is_empty() => {
                let ending = format!("-{}", suffix);
                let scoped: Vec<_> = parsed
                    .iter()
                    .filter(|(_, tag)| tag.name.ends_with(&ending))
                    .collect();
                if scoped.is_empty() {
                    parsed.iter().collect()
                } else {
                    scoped
                }
            }
            _ => parsed.iter().collect(),
        };

        Ok(considered
            .into_iter()
            .max_by_key(|(version, _)| *version)
            .map(|(_, tag)| tag.clone()))
    }
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_string()
}
