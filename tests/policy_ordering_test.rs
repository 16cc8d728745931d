//! Black-box properties of the version model and the bump policy.

use git_semver::domain::{parse_tag_name, BumpLevel, SemVer};
use git_semver::policy::next_version;

#[test]
fn test_candidates_sort_below_their_final() {
    for n in [1u32, 2, 10, 100] {
        assert!(SemVer::candidate(1, 2, 3, n) < SemVer::finalized(1, 2, 3));
        assert!(SemVer::candidate(1, 2, 3, n) < SemVer::candidate(1, 2, 3, n + 1));
    }
}

#[test]
fn test_default_sorts_below_everything() {
    assert!(SemVer::Default < SemVer::candidate(0, 0, 0, 1));
    assert!(SemVer::Default < SemVer::finalized(0, 0, 0));
}

#[test]
fn test_first_releases_from_default() {
    assert_eq!(
        next_version(SemVer::Default, BumpLevel::Patch, true),
        SemVer::finalized(0, 0, 1)
    );
    assert_eq!(
        next_version(SemVer::Default, BumpLevel::Major, true),
        SemVer::finalized(1, 0, 0)
    );
}

#[test]
fn test_candidate_increment_and_promotion() {
    assert_eq!(
        next_version(
            SemVer::candidate(1, 2, 3, 4),
            BumpLevel::ReleaseCandidate,
            false
        ),
        SemVer::candidate(1, 2, 3, 5)
    );
    assert_eq!(
        next_version(
            SemVer::candidate(1, 0, 0, 1),
            BumpLevel::ReleaseCandidate,
            true
        ),
        SemVer::finalized(1, 0, 0)
    );
}

#[test]
fn test_final_bumps_reset_lower_components() {
    assert_eq!(
        next_version(SemVer::finalized(1, 2, 3), BumpLevel::Minor, true),
        SemVer::finalized(1, 3, 0)
    );
    assert_eq!(
        next_version(SemVer::finalized(1, 2, 3), BumpLevel::Major, true),
        SemVer::finalized(2, 0, 0)
    );
}

#[test]
fn test_rendering_roundtrips_through_the_parser() {
    let versions = [
        SemVer::finalized(0, 0, 1),
        SemVer::finalized(12, 0, 7),
        SemVer::candidate(0, 1, 0, 1),
        SemVer::candidate(3, 2, 1, 44),
    ];
    for version in versions {
        let rendered = version.to_string();
        assert_eq!(parse_tag_name(&rendered), Some(version));
        assert_eq!(parse_tag_name(&rendered).unwrap().to_string(), rendered);
    }
}

#[test]
fn test_successive_bumps_walk_a_plausible_history() {
    // 0.0.0 -> 0.1.0 -> 0.1.1-rc.1 -> 0.1.1-rc.2 -> 0.1.1 -> 1.0.0
    let v1 = next_version(SemVer::Default, BumpLevel::Minor, true);
    assert_eq!(v1, SemVer::finalized(0, 1, 0));

    let v2 = next_version(v1, BumpLevel::Patch, false);
    assert_eq!(v2, SemVer::candidate(0, 1, 1, 1));

    let v3 = next_version(v2, BumpLevel::ReleaseCandidate, false);
    assert_eq!(v3, SemVer::candidate(0, 1, 1, 2));

    let v4 = next_version(v3, BumpLevel::ReleaseCandidate, true);
    assert_eq!(v4, SemVer::finalized(0, 1, 1));

    let v5 = next_version(v4, BumpLevel::Major, true);
    assert_eq!(v5, SemVer::finalized(1, 0, 0));
}
