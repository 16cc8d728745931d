use crate::domain::local_name;
use crate::error::{GitSemverError, Result};
use crate::git::{ChangeKind, Credentials, PathChange, TagRef};
use git2::{BranchType, Delta, Oid, Repository as Git2Repo};
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Credential chain: supplied username/token first, then the ssh agent,
    /// then libgit2's default.
    fn remote_callbacks(credentials: Option<Credentials>) -> git2::RemoteCallbacks<'static> {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(move |_url, username_from_url, allowed_types| {
            if let Some(creds) = &credentials {
                return git2::Cred::userpass_plaintext(&creds.username, &creds.token);
            }

            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
                {
                    return Ok(cred);
                }
            }

            git2::Cred::default()
        });
        callbacks
    }

    /// Fast-forward the local branch to its remote-tracking counterpart, or
    /// create it when it does not exist yet. Diverged branches are left alone.
    fn update_branch_from_remote(&self, branch: &str, remote: &str) -> Result<()> {
        let tracking_ref = format!("refs/remotes/{}/{}", remote, branch);
        let remote_ref = match self.repo.find_reference(&tracking_ref) {
            Ok(r) => r,
            // Remote branch doesn't exist, nothing to update
            Err(_) => return Ok(()),
        };

        let remote_oid = remote_ref.target().ok_or_else(|| {
            GitSemverError::remote(format!("Reference '{}' has no target", tracking_ref))
        })?;

        let local_branch = match self.repo.find_branch(branch, BranchType::Local) {
            Ok(b) => b,
            Err(_) => {
                // Local branch doesn't exist, create it from the remote head
                let remote_commit = self.repo.find_commit(remote_oid)?;
                self.repo.branch(branch, &remote_commit, false)?;
                return Ok(());
            }
        };

        let local_ref = local_branch.into_reference();
        let local_oid = match local_ref.target() {
            Some(oid) => oid,
            None => return Ok(()),
        };

        if local_oid == remote_oid {
            return Ok(());
        }

        // Only move the local branch when the remote strictly extends it
        if !self.repo.graph_descendant_of(remote_oid, local_oid)? {
            return Ok(());
        }

        let branch_ref_name = format!("refs/heads/{}", branch);
        let mut reference = self.repo.find_reference(&branch_ref_name)?;
        reference.set_target(
            remote_oid,
            &format!("fast-forward from {}/{}", remote, branch),
        )?;

        Ok(())
    }
}

impl super::Repository for Git2Repository {
    fn resolve_ref(&self, name: &str) -> Result<Option<Oid>> {
        match self.repo.revparse_single(name) {
            Ok(object) => {
                let commit = object.peel(git2::ObjectType::Commit).map_err(|e| {
                    GitSemverError::tag(format!("'{}' does not point at a commit: {}", name, e))
                })?;
                Ok(Some(commit.id()))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_tags(&self) -> Result<Vec<TagRef>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = match self.repo.find_reference(&format!("refs/tags/{}", name)) {
                Ok(r) => r,
                Err(e) if e.code() == git2::ErrorCode::NotFound => continue,
                Err(e) => {
                    return Err(GitSemverError::tag(format!(
                        "Cannot read tag '{}': {}",
                        name, e
                    )))
                }
            };

            let target = match reference.target() {
                Some(oid) => oid,
                None => continue,
            };

            // Annotated tags point at a tag object; peeling yields the commit
            let peeled = reference
                .peel_to_commit()
                .ok()
                .map(|c| c.id())
                .filter(|id| *id != target);

            tags.push(TagRef {
                name: local_name(name).to_string(),
                target,
                is_annotated: peeled.is_some(),
                peeled,
            });
        }

        Ok(tags)
    }

    fn is_ancestor(&self, candidate: Oid, of: Oid) -> Result<bool> {
        if candidate == of {
            return Ok(true);
        }
        Ok(self.repo.graph_descendant_of(of, candidate)?)
    }

    fn diff_paths(&self, from: Option<Oid>, to: Oid) -> Result<Vec<PathChange>> {
        let new_tree = self.repo.find_commit(to)?.tree()?;
        let old_tree = match from {
            Some(oid) => Some(self.repo.find_commit(oid)?.tree()?),
            None => None,
        };

        let diff = self
            .repo
            .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), None)?;

        let mut changes = Vec::new();
        for delta in diff.deltas() {
            let kind = match delta.status() {
                Delta::Added => ChangeKind::Added,
                Delta::Modified => ChangeKind::Modified,
                Delta::Deleted => ChangeKind::Deleted,
                Delta::Renamed => ChangeKind::Renamed,
                Delta::Copied => ChangeKind::Copied,
                _ => ChangeKind::Other,
            };

            // Deletions only have an old side
            let file = match delta.status() {
                Delta::Deleted => delta.old_file(),
                _ => delta.new_file(),
            };

            if let Some(path) = file.path() {
                changes.push(PathChange::new(path.to_string_lossy(), kind));
            }
        }

        Ok(changes)
    }

    fn is_working_tree_clean(&self) -> Result<bool> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses.is_empty())
    }

    fn create_tag(&self, name: &str, target: Oid) -> Result<()> {
        let object = self
            .repo
            .find_object(target, None)
            .map_err(|e| GitSemverError::tag(format!("Cannot find object: {}", e)))?;

        self.repo
            .tag_lightweight(name, &object, false)
            .map_err(|e| GitSemverError::tag(format!("Cannot create tag: {}", e)))?;

        Ok(())
    }

    fn push_tags(&self, remote: &str, credentials: Option<&Credentials>) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| GitSemverError::remote(format!("Cannot find remote: {}", e)))?;

        let names = self.repo.tag_names(None)?;
        let refspecs: Vec<String> = names
            .iter()
            .flatten()
            .map(|tag| format!("refs/tags/{}:refs/tags/{}", tag, tag))
            .collect();

        if refspecs.is_empty() {
            return Ok(());
        }
        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();

        let mut callbacks = Self::remote_callbacks(credentials.cloned());
        callbacks.push_update_reference(|refname, status| {
            if let Some(status) = status {
                Err(git2::Error::from_str(&format!(
                    "Push rejected for {}: {}",
                    refname, status
                )))
            } else {
                Ok(())
            }
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        remote
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| GitSemverError::remote(format!("Push failed: {}", e)))?;

        Ok(())
    }

    fn fetch_branch(
        &self,
        remote: &str,
        branch: &str,
        credentials: Option<&Credentials>,
    ) -> Result<()> {
        let remote_name = remote;
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| GitSemverError::remote(format!("Cannot find remote: {}", e)))?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(Self::remote_callbacks(credentials.cloned()));

        let refspec_branch = format!(
            "+refs/heads/{}:refs/remotes/{}/{}",
            branch, remote_name, branch
        );
        let refspecs = &[refspec_branch.as_str(), "+refs/tags/*:refs/tags/*"];

        remote
            .fetch(refspecs, Some(&mut fetch_options), None)
            .map_err(|e| {
                GitSemverError::remote(format!("Fetch from '{}' failed: {}", remote_name, e))
            })?;

        self.update_branch_from_remote(branch, remote_name)
    }

    fn remote_names(&self) -> Result<Vec<String>> {
        let names = self.repo.remotes()?;
        let mut remotes: Vec<String> = names.iter().flatten().map(|s| s.to_string()).collect();

        // "origin" first, the rest alphabetically
        remotes.sort_by(|a, b| {
            if a == "origin" {
                std::cmp::Ordering::Less
            } else if b == "origin" {
                std::cmp::Ordering::Greater
            } else {
                a.cmp(b)
            }
        });

        Ok(remotes)
    }
}

// SAFETY: Git2Repository wraps git2::Repository which is Send + Sync.
// git2 library is thread-safe for read operations via libgit2's thread-safe design.
unsafe impl Sync for Git2Repository {}
