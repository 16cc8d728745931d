use crate::error::{GitSemverError, Result};
use crate::git::{Credentials, PathChange, Repository, TagRef};
use git2::Oid;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Deterministic Oid for tests (the byte repeated across the hash)
pub fn oid(n: u8) -> Oid {
    Oid::from_bytes(&[n; 20]).expect("20 bytes form a valid oid")
}

/// Mock repository for testing without actual git operations.
///
/// Built up with the `set_*`/`add_*` methods, then handed to the engine as a
/// [Repository]. Mutating operations record what they were asked to do so
/// tests can assert on side effects; trait methods take `&self`, hence the
/// interior mutability.
pub struct MockRepository {
    refs: Mutex<HashMap<String, Oid>>,
    tags: Mutex<Vec<TagRef>>,
    ancestry: HashSet<(Oid, Oid)>,
    diffs: Vec<PathChange>,
    clean: bool,
    remotes: Vec<String>,
    fetch_adds: HashMap<String, Oid>,
    created_tags: Mutex<Vec<(String, Oid)>>,
    pushed_remotes: Mutex<Vec<String>>,
    fetched: Mutex<Vec<(String, String)>>,
    fail_push: bool,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            refs: Mutex::new(HashMap::new()),
            tags: Mutex::new(Vec::new()),
            ancestry: HashSet::new(),
            diffs: Vec::new(),
            clean: true,
            remotes: vec!["origin".to_string()],
            fetch_adds: HashMap::new(),
            created_tags: Mutex::new(Vec::new()),
            pushed_remotes: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
            fail_push: false,
        }
    }

    /// Set a resolvable ref ("HEAD", a branch name) to a commit
    pub fn set_ref(&mut self, name: impl Into<String>, target: Oid) {
        self.refs.lock().unwrap().insert(name.into(), target);
    }

    /// Add a lightweight tag pointing at a commit
    pub fn add_tag(&mut self, name: impl Into<String>, target: Oid) {
        self.tags
            .lock()
            .unwrap()
            .push(TagRef::lightweight(name, target));
    }

    /// Add an annotated tag: `target` is the tag object, `peeled` the commit
    pub fn add_annotated_tag(&mut self, name: impl Into<String>, target: Oid, peeled: Oid) {
        self.tags
            .lock()
            .unwrap()
            .push(TagRef::annotated(name, target, peeled));
    }

    /// Record that `ancestor` is merged into `descendant`
    pub fn add_ancestry(&mut self, ancestor: Oid, descendant: Oid) {
        self.ancestry.insert((ancestor, descendant));
    }

    /// Set the diff reported between any two trees
    pub fn set_diff(&mut self, changes: Vec<PathChange>) {
        self.diffs = changes;
    }

    /// Set working tree cleanliness
    pub fn set_clean(&mut self, clean: bool) {
        self.clean = clean;
    }

    /// Replace the configured remotes
    pub fn set_remotes(&mut self, remotes: Vec<String>) {
        self.remotes = remotes;
    }

    /// Make a branch appear (as `name` -> `target`) after a fetch of it
    pub fn add_branch_on_fetch(&mut self, name: impl Into<String>, target: Oid) {
        self.fetch_adds.insert(name.into(), target);
    }

    /// Make push_tags fail with a remote error
    pub fn fail_push(&mut self) {
        self.fail_push = true;
    }

    /// Tags created through the trait, in creation order
    pub fn created_tags(&self) -> Vec<(String, Oid)> {
        self.created_tags.lock().unwrap().clone()
    }

    /// Remotes that received a tag push
    pub fn pushed_remotes(&self) -> Vec<String> {
        self.pushed_remotes.lock().unwrap().clone()
    }

    /// (remote, branch) pairs fetched through the trait
    pub fn fetched(&self) -> Vec<(String, String)> {
        self.fetched.lock().unwrap().clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn resolve_ref(&self, name: &str) -> Result<Option<Oid>> {
        Ok(self.refs.lock().unwrap().get(name).copied())
    }

    fn list_tags(&self) -> Result<Vec<TagRef>> {
        Ok(self.tags.lock().unwrap().clone())
    }

    fn is_ancestor(&self, candidate: Oid, of: Oid) -> Result<bool> {
        Ok(candidate == of || self.ancestry.contains(&(candidate, of)))
    }

    fn diff_paths(&self, _from: Option<Oid>, _to: Oid) -> Result<Vec<PathChange>> {
        Ok(self.diffs.clone())
    }

    fn is_working_tree_clean(&self) -> Result<bool> {
        Ok(self.clean)
    }

    fn create_tag(&self, name: &str, target: Oid) -> Result<()> {
        self.created_tags
            .lock()
            .unwrap()
            .push((name.to_string(), target));
        self.tags
            .lock()
            .unwrap()
            .push(TagRef::lightweight(name, target));
        Ok(())
    }

    fn push_tags(&self, remote: &str, _credentials: Option<&Credentials>) -> Result<()> {
        if self.fail_push {
            return Err(GitSemverError::remote(format!(
                "Push to '{}' failed",
                remote
            )));
        }
        self.pushed_remotes.lock().unwrap().push(remote.to_string());
        Ok(())
    }

    fn fetch_branch(
        &self,
        remote: &str,
        branch: &str,
        _credentials: Option<&Credentials>,
    ) -> Result<()> {
        self.fetched
            .lock()
            .unwrap()
            .push((remote.to_string(), branch.to_string()));

        if let Some(target) = self.fetch_adds.get(branch) {
            self.refs
                .lock()
                .unwrap()
                .insert(branch.to_string(), *target);
        }

        Ok(())
    }

    fn remote_names(&self) -> Result<Vec<String>> {
        Ok(self.remotes.clone())
    }
}
