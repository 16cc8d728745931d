/// Branch name prefixes treated as beta builds when nothing is configured
pub const DEFAULT_BETA_PREFIXES: [&str; 4] = ["feature/", "feat/", "bugfix/", "fix/"];

/// Classification of the branch a build is running on.
///
/// Recomputed per call from the branch name; nothing is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    /// Exact match of the configured base branch
    Main,
    /// `release/`-prefixed branch
    Release,
    /// Branch matching one of the configured beta prefixes
    Beta,
    /// Anything else
    Default,
}

impl BranchKind {
    /// Classify a branch name against the base branch and beta prefixes.
    pub fn classify(name: &str, base_branch: &str, beta_prefixes: &[String]) -> Self {
        if name == base_branch {
            BranchKind::Main
        } else if name.starts_with("release/") {
            BranchKind::Release
        } else if beta_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            BranchKind::Beta
        } else {
            BranchKind::Default
        }
    }
}

/// Default beta prefixes as owned strings, for configuration defaults.
pub fn default_beta_prefixes() -> Vec<String> {
    DEFAULT_BETA_PREFIXES.iter().map(|p| p.to_string()).collect()
}
