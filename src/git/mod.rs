//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the repository
//! queries and mutations the version engine needs, allowing for multiple
//! implementations including real Git repositories and mock implementations
//! for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations to enable easy testing and flexibility.
//!
//! ```rust
//! # use git_semver::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
//! if let Some(head) = repo.resolve_ref("main")? {
//!     for tag in repo.list_tags()? {
//!         let merged = repo.is_ancestor(tag.commit(), head)?;
//!         println!("{} merged: {}", tag.name, merged);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// A tag as seen by the version engine.
///
/// `name` is the local name with the `refs/tags/` path stripped. Annotated
/// tags carry the commit they ultimately point to in `peeled`; lightweight
/// tags point at their commit directly via `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    /// Local tag name (e.g. "v1.2.3")
    pub name: String,
    /// Object the tag ref points at (tag object for annotated tags)
    pub target: Oid,
    /// Whether the tag is annotated
    pub is_annotated: bool,
    /// Commit an annotated tag resolves to; `None` for lightweight tags
    pub peeled: Option<Oid>,
}

impl TagRef {
    /// Create a lightweight tag reference
    pub fn lightweight(name: impl Into<String>, target: Oid) -> Self {
        TagRef {
            name: name.into(),
            target,
            is_annotated: false,
            peeled: None,
        }
    }

    /// Create an annotated tag reference
    pub fn annotated(name: impl Into<String>, target: Oid, peeled: Oid) -> Self {
        TagRef {
            name: name.into(),
            target,
            is_annotated: true,
            peeled: Some(peeled),
        }
    }

    /// The commit this tag designates: the peeled commit for annotated tags,
    /// the direct target otherwise.
    pub fn commit(&self) -> Oid {
        self.peeled.unwrap_or(self.target)
    }
}

/// How a path differs between two trees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Other,
}

/// A single entry of a name-and-status diff.
///
/// `path` is already the relevant side for the change kind: the old path for
/// deletions, the new path for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    pub path: String,
    pub kind: ChangeKind,
}

impl PathChange {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        PathChange {
            path: path.into(),
            kind,
        }
    }
}

/// Username/token pair for authenticated remote operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            token: token.into(),
        }
    }
}

/// Common git operation trait for abstraction
///
/// This trait abstracts the repository queries and mutations the version
/// engine performs, allowing for real Git repositories and mock
/// implementations for testing.
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` to allow safe sharing across threads.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to the appropriate
/// [crate::error::GitSemverError] variants. Which failures are fatal is the
/// caller's policy, not the facade's: resolution-side callers degrade,
/// publish-side callers propagate.
pub trait Repository: Send + Sync {
    /// Resolve a ref name ("HEAD", a branch, a commit id) to a commit.
    ///
    /// # Arguments
    /// * `name` - Ref name or revision string
    ///
    /// # Returns
    /// * `Ok(Some(Oid))` - The commit the ref resolves to
    /// * `Ok(None)` - The ref does not exist locally
    /// * `Err` - On repository access errors
    fn resolve_ref(&self, name: &str) -> Result<Option<Oid>>;

    /// Enumerate all tags with their targets and peeled commits.
    ///
    /// Tag names are local (path-stripped). Ordering is unspecified;
    /// callers sort by parsed version where it matters.
    fn list_tags(&self) -> Result<Vec<TagRef>>;

    /// Whether `candidate` is merged into (an ancestor of, or equal to) `of`.
    ///
    /// # Arguments
    /// * `candidate` - Commit being tested for reachability
    /// * `of` - Tip commit whose history is searched
    fn is_ancestor(&self, candidate: Oid, of: Oid) -> Result<bool>;

    /// Name-and-status diff between two commit trees.
    ///
    /// `from = None` diffs against the empty tree, reporting every path in
    /// `to` as added. No content is materialized; only paths and change
    /// kinds are returned.
    fn diff_paths(&self, from: Option<Oid>, to: Oid) -> Result<Vec<PathChange>>;

    /// Whether the working tree is free of added, modified, changed or
    /// removed files. Untracked files do not count.
    fn is_working_tree_clean(&self) -> Result<bool>;

    /// Create a lightweight tag at the given commit.
    ///
    /// # Returns
    /// * `Err` - If the tag already exists or the commit cannot be found
    fn create_tag(&self, name: &str, target: Oid) -> Result<()>;

    /// Push tags (and only tags) to a remote.
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g. "origin")
    /// * `credentials` - Username/token pair; falls back to the ssh agent
    ///   and default credential chain when absent
    fn push_tags(&self, remote: &str, credentials: Option<&Credentials>) -> Result<()>;

    /// Fetch a branch (and all tags) from a remote, fast-forwarding or
    /// creating the matching local branch when possible.
    fn fetch_branch(
        &self,
        remote: &str,
        branch: &str,
        credentials: Option<&Credentials>,
    ) -> Result<()>;

    /// Configured remote names, "origin" first when present.
    fn remote_names(&self) -> Result<Vec<String>>;
}
