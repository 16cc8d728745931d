//! Current-version resolution
//!
//! Walks the repository's tags to reconstruct the highest version already
//! released on a branch. Lookups here are advisory inputs to a build, so
//! every failure path degrades - to a best-effort tag scan or to
//! [SemVer::Default] - instead of aborting.

use crate::domain::{has_module_suffix, parse_tag_name, ModuleScope, SemVer};
use crate::error::Result;
use crate::git::{Credentials, Repository, TagRef};
use git2::Oid;
use tracing::{debug, warn};

/// Finds the highest previously-released version reachable from a branch.
///
/// Candidate tags are restricted to those merged into the branch so that
/// releases cut on unrelated branches do not leak in. With a module scope,
/// only tags carrying the module's suffix count, falling back to the global
/// history while the module has no release of its own.
pub struct CurrentVersionResolver<'a, R: Repository> {
    repo: &'a R,
    credentials: Option<Credentials>,
}

impl<'a, R: Repository> CurrentVersionResolver<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        CurrentVersionResolver {
            repo,
            credentials: None,
        }
    }

    /// Use the given credentials for opportunistic branch fetches
    pub fn with_credentials(repo: &'a R, credentials: Option<Credentials>) -> Self {
        CurrentVersionResolver { repo, credentials }
    }

    /// Resolve the current version for a branch, optionally module-scoped.
    ///
    /// Never fails: repository-access problems degrade to [SemVer::Default]
    /// with a logged warning.
    pub fn resolve(&self, branch_name: &str, module: Option<&ModuleScope>) -> SemVer {
        match self.try_resolve(branch_name, module) {
            Ok(version) => version,
            Err(e) => {
                warn!(
                    branch = branch_name,
                    error = %e,
                    "current-version resolution failed, using default"
                );
                SemVer::Default
            }
        }
    }

    /// Fallible inner resolution; [Self::resolve] owns the degrade.
    pub fn try_resolve(
        &self,
        branch_name: &str,
        module: Option<&ModuleScope>,
    ) -> Result<SemVer> {
        let branch_commit = match self.resolve_branch(branch_name)? {
            Some(oid) => oid,
            None => {
                warn!(
                    branch = branch_name,
                    "branch unresolved, scanning all tags as best effort"
                );
                return self.scan_all_tags(module);
            }
        };

        let mut merged = Vec::new();
        for tag in self.repo.list_tags()? {
            let Some(version) = parse_tag_name(&tag.name) else {
                continue;
            };
            match self.repo.is_ancestor(tag.commit(), branch_commit) {
                Ok(true) => merged.push((version, tag)),
                Ok(false) => {}
                Err(e) => {
                    debug!(tag = %tag.name, error = %e, "ancestry check failed, skipping tag");
                }
            }
        }

        Ok(pick_version(&merged, module))
    }

    /// Resolve the branch locally, fetching from each configured remote when
    /// it is absent. Per-remote fetch failures are logged and skipped.
    fn resolve_branch(&self, branch_name: &str) -> Result<Option<Oid>> {
        if let Some(oid) = self.repo.resolve_ref(branch_name)? {
            return Ok(Some(oid));
        }

        for remote in self.repo.remote_names()? {
            debug!(remote = %remote, branch = branch_name, "fetching missing branch");
            if let Err(e) = self
                .repo
                .fetch_branch(&remote, branch_name, self.credentials.as_ref())
            {
                warn!(remote = %remote, branch = branch_name, error = %e, "fetch failed");
            }
        }

        self.repo.resolve_ref(branch_name)
    }

    /// Ancestry-blind scan over every tag in the repository.
    fn scan_all_tags(&self, module: Option<&ModuleScope>) -> Result<SemVer> {
        let candidates: Vec<(SemVer, TagRef)> = self
            .repo
            .list_tags()?
            .into_iter()
            .filter_map(|tag| parse_tag_name(&tag.name).map(|version| (version, tag)))
            .collect();

        Ok(pick_version(&candidates, module))
    }
}

/// Apply module scoping and take the maximum version.
///
/// Scoped: suffix-matching tags, widening to the full candidate set while
/// the module has no tag of its own. Unscoped: tags with a trailing module
/// suffix belong to some module's history and are excluded.
fn pick_version(candidates: &[(SemVer, TagRef)], module: Option<&ModuleScope>) -> SemVer {
    let filtered: Vec<&(SemVer, TagRef)> = match module {
        Some(scope) => {
            let scoped: Vec<_> = candidates
                .iter()
                .filter(|(_, tag)| scope.matches_tag(&tag.name))
                .collect();
            if scoped.is_empty() {
                candidates.iter().collect()
            } else {
                scoped
            }
        }
        None => candidates
            .iter()
            .filter(|(_, tag)| !has_module_suffix(&tag.name))
            .collect(),
    };

    filtered
        .into_iter()
        .map(|(version, _)| *version)
        .max()
        .unwrap_or(SemVer::Default)
}

/// Whether a commit already bears a tag.
///
/// Resolves `commit` (HEAD when absent) and compares it against every tag's
/// peeled commit, falling back to the direct target for lightweight tags.
/// Unresolvable ids and repository errors report `false`, never an error.
pub fn is_commit_tagged<R: Repository>(repo: &R, commit: Option<&str>) -> bool {
    let target = match repo.resolve_ref(commit.unwrap_or("HEAD")) {
        Ok(Some(oid)) => oid,
        Ok(None) => return false,
        Err(e) => {
            warn!(error = %e, "tagged-commit check failed, reporting untagged");
            return false;
        }
    };

    match repo.list_tags() {
        Ok(tags) => tags.iter().any(|tag| tag.commit() == target),
        Err(e) => {
            warn!(error = %e, "tag listing failed, reporting untagged");
            false
        }
    }
}
