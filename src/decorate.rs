//! Branch-context version decoration
//!
//! Renders the version string a non-release build should carry, based on
//! what kind of branch is being built, whether the tree is clean, and
//! whether HEAD is already a released commit. Read-only: nothing here
//! creates tags.

use crate::domain::{default_beta_prefixes, parse_tag_name, BranchKind, ModuleScope, SemVer};
use crate::git::Repository;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// How beta build identifiers are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BetaStrategy {
    /// Truncated epoch-millisecond suffix
    #[default]
    Timestamp,
    /// One plus the highest beta number already tagged for the version
    Sequential,
}

/// Decoration settings, normally taken from configuration
#[derive(Debug, Clone)]
pub struct DecorateOptions {
    pub base_branch: String,
    pub beta_prefixes: Vec<String>,
    pub beta_strategy: BetaStrategy,
}

impl Default for DecorateOptions {
    fn default() -> Self {
        DecorateOptions {
            base_branch: "main".to_string(),
            beta_prefixes: default_beta_prefixes(),
            beta_strategy: BetaStrategy::default(),
        }
    }
}

/// Classifies the working context and renders decorated version strings.
pub struct ContextDecorator<'a, R: Repository> {
    repo: &'a R,
    options: DecorateOptions,
}

impl<'a, R: Repository> ContextDecorator<'a, R> {
    pub fn new(repo: &'a R, options: DecorateOptions) -> Self {
        ContextDecorator { repo, options }
    }

    /// Render the version string for the current build context.
    ///
    /// - base branch, HEAD already tagged with `version`: the bare version
    ///   (a re-run of a released commit)
    /// - base branch otherwise: `X.Y.Z-<ts>`
    /// - release branch: bare version when clean, `X.Y.(Z+1)-hotfix.<ts>`
    ///   when the tree carries uncommitted work
    /// - beta branch: `X.Y.Z-beta.<id>` per the configured strategy
    /// - anything else: `X.Y.Z-alpha.<ts>`
    ///
    /// `head_commit` overrides which commit the already-tagged check looks
    /// at; it defaults to HEAD.
    pub fn decorate(
        &self,
        version: &SemVer,
        branch_name: &str,
        module: Option<&ModuleScope>,
        head_commit: Option<&str>,
    ) -> String {
        let kind = BranchKind::classify(
            branch_name,
            &self.options.base_branch,
            &self.options.beta_prefixes,
        );
        let ts = timestamp_suffix();

        match kind {
            BranchKind::Main => {
                if self.head_bears_version(version, head_commit) {
                    version.to_string()
                } else {
                    format!(
                        "{}.{}.{}-{}",
                        version.major(),
                        version.minor(),
                        version.patch(),
                        ts
                    )
                }
            }
            BranchKind::Release => {
                if self.working_tree_clean() {
                    version.to_string()
                } else {
                    format!(
                        "{}.{}.{}-hotfix.{}",
                        version.major(),
                        version.minor(),
                        version.patch() + 1,
                        ts
                    )
                }
            }
            BranchKind::Beta => {
                let id = match self.options.beta_strategy {
                    BetaStrategy::Timestamp => ts,
                    BetaStrategy::Sequential => {
                        self.next_beta_sequence(version, module).to_string()
                    }
                };
                format!(
                    "{}.{}.{}-beta.{}",
                    version.major(),
                    version.minor(),
                    version.patch(),
                    id
                )
            }
            BranchKind::Default => format!(
                "{}.{}.{}-alpha.{}",
                version.major(),
                version.minor(),
                version.patch(),
                ts
            ),
        }
    }

    /// Whether the commit under inspection already carries a tag parsing to
    /// exactly `version`. Errors degrade to `false`.
    fn head_bears_version(&self, version: &SemVer, head_commit: Option<&str>) -> bool {
        let target = match self.repo.resolve_ref(head_commit.unwrap_or("HEAD")) {
            Ok(Some(oid)) => oid,
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "cannot resolve commit for tagged check");
                return false;
            }
        };

        match self.repo.list_tags() {
            Ok(tags) => tags
                .iter()
                .any(|tag| tag.commit() == target && parse_tag_name(&tag.name) == Some(*version)),
            Err(e) => {
                warn!(error = %e, "cannot list tags for tagged check");
                false
            }
        }
    }

    fn working_tree_clean(&self) -> bool {
        self.repo.is_working_tree_clean().unwrap_or_else(|e| {
            warn!(error = %e, "status query failed, assuming clean tree");
            true
        })
    }

    /// Next sequential beta number for `(major, minor, patch)` within the
    /// module scope: one plus the highest existing, starting at 1.
    fn next_beta_sequence(&self, version: &SemVer, module: Option<&ModuleScope>) -> u32 {
        let pattern = match module {
            Some(scope) => format!(
                r"^v?{}\.{}\.{}-beta\.(\d+)-{}$",
                version.major(),
                version.minor(),
                version.patch(),
                regex::escape(&scope.tag_suffix)
            ),
            None => format!(
                r"^v?{}\.{}\.{}-beta\.(\d+)$",
                version.major(),
                version.minor(),
                version.patch()
            ),
        };
        let Ok(re) = Regex::new(&pattern) else {
            return 1;
        };

        match self.repo.list_tags() {
            Ok(tags) => tags
                .iter()
                .filter_map(|tag| {
                    re.captures(&tag.name)
                        .and_then(|caps| caps.get(1))
                        .and_then(|m| m.as_str().parse::<u32>().ok())
                })
                .max()
                .map_or(1, |highest| highest + 1),
            Err(e) => {
                warn!(error = %e, "cannot list tags for beta sequence, starting at 1");
                1
            }
        }
    }
}

/// Low-order digits of the current epoch-millisecond count.
///
/// Best-effort uniqueness for informational version strings: truncation
/// keeps the suffix short but two builds inside the same instant can still
/// collide. Not a release identifier.
fn timestamp_suffix() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let rendered = millis.to_string();

    if rendered.len() > 7 {
        rendered[7..].to_string()
    } else {
        rendered
    }
}
