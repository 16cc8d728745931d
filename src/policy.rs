//! Next-version computation
//!
//! A pure transition function from the current version, a requested bump
//! level and a finalize flag to the next version. Total: every input has a
//! defined output, and nothing here touches the repository.

use crate::domain::{BumpLevel, SemVer};

/// Compute the version that follows `current` for the requested bump.
///
/// Patch, minor and major bumps reset the lower components to zero and,
/// unless finalized, produce the first release candidate of the bumped
/// version. A release-candidate bump increments the candidate counter, or
/// promotes the candidate to its final when `is_final` is set. A candidate's
/// own coordinates already name the release it is a candidate *for*, so
/// finalizing a candidate never moves them.
pub fn next_version(current: SemVer, level: BumpLevel, is_final: bool) -> SemVer {
    match level {
        BumpLevel::ReleaseCandidate => match current {
            SemVer::ReleaseCandidate {
                major,
                minor,
                patch,
                rc,
            } => {
                if is_final {
                    SemVer::finalized(major, minor, patch)
                } else {
                    SemVer::candidate(major, minor, patch, rc + 1)
                }
            }
            SemVer::Final {
                major,
                minor,
                patch,
            } => {
                if is_final {
                    // finalizing a final release is the identity
                    current
                } else {
                    SemVer::candidate(major, minor, patch + 1, 1)
                }
            }
            SemVer::Default => SemVer::candidate(0, 0, 0, 1),
        },
        BumpLevel::Patch => match current {
            SemVer::Final {
                major,
                minor,
                patch,
            } => {
                if is_final {
                    SemVer::finalized(major, minor, patch + 1)
                } else {
                    SemVer::candidate(major, minor, patch + 1, 1)
                }
            }
            SemVer::ReleaseCandidate {
                major,
                minor,
                patch,
                ..
            } => {
                if is_final {
                    SemVer::finalized(major, minor, patch)
                } else {
                    SemVer::candidate(major, minor, patch + 1, 1)
                }
            }
            SemVer::Default => SemVer::finalized(0, 0, 1),
        },
        BumpLevel::Minor => match current {
            SemVer::Final { major, minor, .. } => {
                if is_final {
                    SemVer::finalized(major, minor + 1, 0)
                } else {
                    SemVer::candidate(major, minor + 1, 0, 1)
                }
            }
            SemVer::ReleaseCandidate { major, minor, .. } => {
                if is_final {
                    SemVer::finalized(major, minor, 0)
                } else {
                    SemVer::candidate(major, minor + 1, 0, 1)
                }
            }
            SemVer::Default => SemVer::finalized(0, 1, 0),
        },
        BumpLevel::Major => match current {
            SemVer::Final { major, .. } => {
                if is_final {
                    SemVer::finalized(major + 1, 0, 0)
                } else {
                    SemVer::candidate(major + 1, 0, 0, 1)
                }
            }
            SemVer::ReleaseCandidate { major, .. } => {
                if is_final {
                    SemVer::finalized(major + 1, 0, 0)
                } else {
                    SemVer::candidate(major + 1, 0, 0, 1)
                }
            }
            SemVer::Default => SemVer::finalized(1, 0, 0),
        },
    }
}
