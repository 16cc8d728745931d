//! End-to-end tests against real repositories built in temp directories.

use git2::Repository as RawRepository;
use git_semver::changes::ChangeDetector;
use git_semver::decorate::{ContextDecorator, DecorateOptions};
use git_semver::domain::{ModuleScope, SemVer};
use git_semver::error::GitSemverError;
use git_semver::git::Git2Repository;
use git_semver::resolver::{is_commit_tagged, CurrentVersionResolver};
use git_semver::tagger::TagWriter;
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A scratch repository with helpers for building history.
struct TestRepo {
    dir: TempDir,
    repo: RawRepository,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("Could not create temp dir");
        let repo = RawRepository::init(dir.path()).expect("Could not init git repo");

        {
            let mut config = repo.config().expect("Could not get config");
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }

        // first commit lands on "main" regardless of init.defaultBranch
        repo.set_head("refs/heads/main").unwrap();

        TestRepo { dir, repo }
    }

    fn commit(&self, files: &[(&str, &str)], message: &str) -> git2::Oid {
        for (path, content) in files {
            let full = self.dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&full, content).unwrap();
        }

        let mut index = self.repo.index().unwrap();
        for (path, _) in files {
            index.add_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let sig = self.repo.signature().unwrap();

        let parents = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    fn tag(&self, name: &str, target: git2::Oid) {
        let object = self.repo.find_object(target, None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }

    fn annotated_tag(&self, name: &str, target: git2::Oid) {
        let object = self.repo.find_object(target, None).unwrap();
        let sig = self.repo.signature().unwrap();
        self.repo
            .tag(name, &object, &sig, &format!("release {}", name), false)
            .unwrap();
    }

    /// Create the branch at `at` when missing, then move HEAD and the
    /// worktree onto it.
    fn switch_to(&self, branch: &str, at: git2::Oid) {
        if self
            .repo
            .find_branch(branch, git2::BranchType::Local)
            .is_err()
        {
            let commit = self.repo.find_commit(at).unwrap();
            self.repo.branch(branch, &commit, false).unwrap();
        }
        self.repo
            .set_head(&format!("refs/heads/{}", branch))
            .unwrap();

        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_head(Some(&mut checkout)).unwrap();
    }

    fn add_bare_remote(&self, name: &str) -> TempDir {
        let remote_dir = TempDir::new().unwrap();
        RawRepository::init_bare(remote_dir.path()).unwrap();
        self.repo
            .remote(name, remote_dir.path().to_str().unwrap())
            .unwrap();
        remote_dir
    }

    fn engine(&self) -> Git2Repository {
        Git2Repository::open(self.dir.path()).unwrap()
    }
}

#[test]
#[serial]
fn test_resolver_ancestry_and_module_scoping() {
    let test_repo = TestRepo::new();
    let c1 = test_repo.commit(&[("README.md", "hello\n")], "initial commit");
    test_repo.tag("v1.2.3", c1);

    let c2 = test_repo.commit(&[("api/src/lib.rs", "pub fn api() {}\n")], "add api");
    test_repo.tag("v2.0.0-api", c2);

    // an unrelated branch releases its own version
    test_repo.switch_to("side", c1);
    let c_side = test_repo.commit(&[("side.txt", "side work\n")], "side work");
    test_repo.tag("v9.9.9", c_side);
    test_repo.switch_to("main", c2);

    let engine = test_repo.engine();
    let resolver = CurrentVersionResolver::new(&engine);

    // the side branch's release is not merged into main
    assert_eq!(resolver.resolve("main", None), SemVer::finalized(1, 2, 3));

    let scope = ModuleScope::new("api", vec!["api/".to_string()]);
    assert_eq!(
        resolver.resolve("main", Some(&scope)),
        SemVer::finalized(2, 0, 0)
    );

    // on the side branch its own tag wins
    assert_eq!(resolver.resolve("side", None), SemVer::finalized(9, 9, 9));
}

#[test]
#[serial]
fn test_resolver_missing_branch_scans_all_tags() {
    let test_repo = TestRepo::new();
    let c1 = test_repo.commit(&[("README.md", "hello\n")], "initial commit");
    test_repo.tag("v0.4.0", c1);

    let engine = test_repo.engine();
    let resolver = CurrentVersionResolver::new(&engine);

    assert_eq!(
        resolver.resolve("does-not-exist", None),
        SemVer::finalized(0, 4, 0)
    );
}

#[test]
#[serial]
fn test_tagged_commit_check_peels_annotated_tags() {
    let test_repo = TestRepo::new();
    let c1 = test_repo.commit(&[("README.md", "hello\n")], "initial commit");
    test_repo.annotated_tag("v0.1.0", c1);

    let engine = test_repo.engine();
    assert!(is_commit_tagged(&engine, None));

    test_repo.commit(&[("README.md", "more\n")], "more work");
    let engine = test_repo.engine();
    assert!(!is_commit_tagged(&engine, None));
}

#[test]
#[serial]
fn test_change_detection_against_real_diffs() {
    let test_repo = TestRepo::new();
    test_repo.commit(
        &[("README.md", "hello\n"), ("api/src/main.rs", "fn main() {}\n")],
        "initial commit",
    );
    let c1 = test_repo.repo.head().unwrap().target().unwrap();
    test_repo.tag("v0.1.0", c1);

    let c2 = test_repo.commit(&[("api/src/main.rs", "fn main() { run() }\n")], "api change");

    let engine = test_repo.engine();
    let detector = ChangeDetector::new(&engine);
    assert!(detector.has_changed(Some("api"), &["api".to_string()]));

    // module baseline moves to c2; a docs-only commit is not a module change
    test_repo.tag("v0.1.0-api", c2);
    test_repo.commit(&[("docs/NOTE.md", "notes\n")], "docs");

    let engine = test_repo.engine();
    let detector = ChangeDetector::new(&engine);
    assert!(!detector.has_changed(Some("api"), &["api".to_string()]));
}

#[test]
#[serial]
fn test_publish_pushes_to_remote() {
    let test_repo = TestRepo::new();
    test_repo.commit(&[("README.md", "hello\n")], "initial commit");
    let remote_dir = test_repo.add_bare_remote("origin");

    let engine = test_repo.engine();
    let writer = TagWriter::new(&engine);
    let tag = writer
        .publish(&SemVer::finalized(0, 2, 0), None, None, "origin", None)
        .unwrap();
    assert_eq!(tag, "v0.2.0");

    let remote_repo = RawRepository::open_bare(remote_dir.path()).unwrap();
    assert!(remote_repo.find_reference("refs/tags/v0.2.0").is_ok());
}

#[test]
#[serial]
fn test_publish_module_scoped_tag_name() {
    let test_repo = TestRepo::new();
    test_repo.commit(&[("api/lib.rs", "pub fn api() {}\n")], "initial commit");
    let _remote_dir = test_repo.add_bare_remote("origin");

    let engine = test_repo.engine();
    let writer = TagWriter::new(&engine);
    let scope = ModuleScope::new("api", vec!["api/".to_string()]);
    let tag = writer
        .publish(&SemVer::finalized(1, 2, 3), Some(&scope), None, "origin", None)
        .unwrap();
    assert_eq!(tag, "v1.2.3-api");
}

#[test]
#[serial]
fn test_publish_refuses_dirty_tree() {
    let test_repo = TestRepo::new();
    test_repo.commit(&[("README.md", "hello\n")], "initial commit");
    fs::write(test_repo.dir.path().join("README.md"), "uncommitted\n").unwrap();

    let engine = test_repo.engine();
    let writer = TagWriter::new(&engine);
    let result = writer.publish(&SemVer::finalized(0, 2, 0), None, None, "origin", None);

    assert!(matches!(result, Err(GitSemverError::TagConflict(_))));
    let tags = test_repo.repo.tag_names(None).unwrap();
    assert_eq!(tags.len(), 0, "no tag may be created for a dirty tree");
}

#[test]
#[serial]
fn test_untracked_files_do_not_block_publish() {
    let test_repo = TestRepo::new();
    test_repo.commit(&[("README.md", "hello\n")], "initial commit");
    fs::write(test_repo.dir.path().join("scratch.txt"), "untracked\n").unwrap();
    let _remote_dir = test_repo.add_bare_remote("origin");

    let engine = test_repo.engine();
    let writer = TagWriter::new(&engine);
    assert!(writer
        .publish(&SemVer::finalized(0, 2, 0), None, None, "origin", None)
        .is_ok());
}

#[test]
#[serial]
fn test_publish_without_remote_keeps_local_tag() {
    let test_repo = TestRepo::new();
    test_repo.commit(&[("README.md", "hello\n")], "initial commit");

    let engine = test_repo.engine();
    let writer = TagWriter::new(&engine);
    let result = writer.publish(&SemVer::finalized(0, 2, 0), None, None, "origin", None);

    assert!(matches!(result, Err(GitSemverError::Remote(_))));
    // the local tag survives the failed push for the operator to deal with
    assert!(test_repo
        .repo
        .find_reference("refs/tags/v0.2.0")
        .is_ok());
}

#[test]
#[serial]
fn test_decorates_rerun_of_released_commit_bare() {
    let test_repo = TestRepo::new();
    let c1 = test_repo.commit(&[("README.md", "hello\n")], "initial commit");
    test_repo.tag("v0.3.0", c1);

    let engine = test_repo.engine();
    let resolver = CurrentVersionResolver::new(&engine);
    let current = resolver.resolve("main", None);
    assert_eq!(current, SemVer::finalized(0, 3, 0));

    let decorator = ContextDecorator::new(&engine, DecorateOptions::default());
    assert_eq!(decorator.decorate(&current, "main", None, None), "0.3.0");
}

#[test]
#[serial]
fn test_decorates_feature_branch_as_beta() {
    let test_repo = TestRepo::new();
    let c1 = test_repo.commit(&[("README.md", "hello\n")], "initial commit");
    test_repo.tag("v0.3.0", c1);
    test_repo.switch_to("feature/login", c1);

    let engine = test_repo.engine();
    let resolver = CurrentVersionResolver::new(&engine);
    let current = resolver.resolve("feature/login", None);

    let decorator = ContextDecorator::new(&engine, DecorateOptions::default());
    let rendered = decorator.decorate(&current, "feature/login", None, None);
    let suffix = rendered.strip_prefix("0.3.0-beta.").unwrap();
    assert!(suffix.chars().all(|c| c.is_ascii_digit()));
}
