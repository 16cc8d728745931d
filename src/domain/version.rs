use crate::error::{GitSemverError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version as reconstructed from repository tags.
///
/// `Final` is a canonical release, `ReleaseCandidate` a numbered pre-release
/// of its eventual final, and `Default` the sentinel for a repository that
/// has never released. `Default` renders and compares as `0.0.0` but stays a
/// distinct variant so callers can tell "no release yet" from a real 0.0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemVer {
    Final {
        major: u32,
        minor: u32,
        patch: u32,
    },
    ReleaseCandidate {
        major: u32,
        minor: u32,
        patch: u32,
        rc: u32,
    },
    Default,
}

impl SemVer {
    /// Create a final release version
    pub fn finalized(major: u32, minor: u32, patch: u32) -> Self {
        SemVer::Final {
            major,
            minor,
            patch,
        }
    }

    /// Create a release candidate version
    pub fn candidate(major: u32, minor: u32, patch: u32, rc: u32) -> Self {
        SemVer::ReleaseCandidate {
            major,
            minor,
            patch,
            rc,
        }
    }

    pub fn major(&self) -> u32 {
        match self {
            SemVer::Final { major, .. } | SemVer::ReleaseCandidate { major, .. } => *major,
            SemVer::Default => 0,
        }
    }

    pub fn minor(&self) -> u32 {
        match self {
            SemVer::Final { minor, .. } | SemVer::ReleaseCandidate { minor, .. } => *minor,
            SemVer::Default => 0,
        }
    }

    pub fn patch(&self) -> u32 {
        match self {
            SemVer::Final { patch, .. } | SemVer::ReleaseCandidate { patch, .. } => *patch,
            SemVer::Default => 0,
        }
    }

    /// Ordering rank of the variant within one (major, minor, patch) triple.
    ///
    /// A final release outranks every candidate for the same triple, higher
    /// candidate numbers outrank lower ones, and the `Default` sentinel sits
    /// below everything.
    fn rank(&self) -> u64 {
        match self {
            SemVer::Default => 0,
            SemVer::ReleaseCandidate { rc, .. } => u64::from(*rc) + 1,
            SemVer::Final { .. } => u64::MAX,
        }
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major(), self.minor(), self.patch(), self.rank()).cmp(&(
            other.major(),
            other.minor(),
            other.patch(),
            other.rank(),
        ))
    }
}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemVer::Final {
                major,
                minor,
                patch,
            } => write!(f, "{}.{}.{}", major, minor, patch),
            SemVer::ReleaseCandidate {
                major,
                minor,
                patch,
                rc,
            } => write!(f, "{}.{}.{}-rc.{}", major, minor, patch, rc),
            SemVer::Default => write!(f, "0.0.0"),
        }
    }
}

/// Requested version increment level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpLevel {
    Major,
    Minor,
    Patch,
    ReleaseCandidate,
}

impl FromStr for BumpLevel {
    type Err = GitSemverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "major" => Ok(BumpLevel::Major),
            "minor" => Ok(BumpLevel::Minor),
            "patch" => Ok(BumpLevel::Patch),
            "rc" | "release-candidate" => Ok(BumpLevel::ReleaseCandidate),
            other => Err(GitSemverError::version(format!(
                "Unknown bump level: '{}' - expected major, minor, patch or rc",
                other
            ))),
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpLevel::Major => write!(f, "major"),
            BumpLevel::Minor => write!(f, "minor"),
            BumpLevel::Patch => write!(f, "patch"),
            BumpLevel::ReleaseCandidate => write!(f, "rc"),
        }
    }
}
