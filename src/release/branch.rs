//! Pull request branch checks and release version extraction.

use std::sync::LazyLock;

use regex_lite::Regex;
use semver::Version;

/// Base branches a release pull request may target.
pub const TRUNK_BRANCHES: [&str; 2] = ["main", "master"];

/// Prefix of release branch names.
pub const RELEASE_BRANCH_PREFIX: &str = "release/";

static RELEASE_BRANCH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^release/(\d+\.\d+(?:\.\d+)?)(-\w*\.\d+)?").expect("branch pattern is valid")
});

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// True for a pull request from a release branch into a trunk branch.
pub fn is_release_pull_request(base: &str, head: &str) -> bool {
    TRUNK_BRANCHES.contains(&base) && head.starts_with(RELEASE_BRANCH_PREFIX)
}

/// Extract the release version from a branch like `release/1.7` or `release/2.5.3-rc.1`.
///
/// Two-component versions get a `.0` patch. Returns `None` when the branch is
/// not a release branch or the version is not valid semver.
pub fn version_from_branch(branch: &str) -> Option<Version> {
    let caps = RELEASE_BRANCH_PATTERN.captures(branch)?;

    let core = &caps[1];
    let pre = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    let version = if core.matches('.').count() == 1 {
        format!("{}.0{}", core, pre)
    } else {
        format!("{}{}", core, pre)
    };

    Version::parse(&version).ok()
}

/// Pull request number from a merge ref name such as `78/merge`.
pub fn pr_number_from_ref(ref_name: &str) -> Option<u64> {
    DIGITS.find(ref_name)?.as_str().parse().ok()
}
