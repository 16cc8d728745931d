//! Durable version recording
//!
//! Writes a resolved version back to the repository as a tag and pushes it.
//! The only component with an externally visible write; everything else in
//! the engine is read-only.

use crate::domain::{ModuleScope, SemVer};
use crate::error::{GitSemverError, Result};
use crate::git::{Credentials, Repository};
use tracing::warn;

/// Creates and pushes version tags.
pub struct TagWriter<'a, R: Repository> {
    repo: &'a R,
}

impl<'a, R: Repository> TagWriter<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        TagWriter { repo }
    }

    /// Tag name for a version: `v<version>-<suffix>` when module-scoped,
    /// `<prefix>-v<version>` under a branch-prefix override, plain
    /// `v<version>` otherwise.
    pub fn tag_name(
        version: &SemVer,
        module: Option<&ModuleScope>,
        override_branch_prefix: Option<&str>,
    ) -> String {
        match (module, override_branch_prefix) {
            (Some(scope), _) => format!("v{}-{}", version, scope.tag_suffix),
            (None, Some(prefix)) if !prefix.is_empty() => format!("{}-v{}", prefix, version),
            _ => format!("v{}", version),
        }
    }

    /// Tag HEAD with the version and push tags to the remote.
    ///
    /// Refuses with [GitSemverError::TagConflict] while the working tree has
    /// uncommitted changes: a tag must point at a fully committed state. On
    /// push failure the already-created local tag is kept so an operator can
    /// re-push or delete it deliberately; the error names the remote.
    ///
    /// Returns the created tag name.
    pub fn publish(
        &self,
        version: &SemVer,
        module: Option<&ModuleScope>,
        override_branch_prefix: Option<&str>,
        remote: &str,
        credentials: Option<&Credentials>,
    ) -> Result<String> {
        if !self.repo.is_working_tree_clean()? {
            return Err(GitSemverError::tag_conflict(
                "cannot create a tag with uncommitted changes",
            ));
        }

        let head = self
            .repo
            .resolve_ref("HEAD")?
            .ok_or_else(|| GitSemverError::tag("HEAD does not resolve to a commit"))?;

        let name = Self::tag_name(version, module, override_branch_prefix);
        self.repo.create_tag(&name, head)?;

        if let Err(e) = self.repo.push_tags(remote, credentials) {
            warn!(
                tag = %name,
                remote = remote,
                "push failed, tag exists locally but not on the remote"
            );
            return Err(e);
        }

        Ok(name)
    }
}
