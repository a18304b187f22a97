//! Release eligibility check.

use crate::config::CiEnvironment;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Optional leading `v`, then a dot-separated numeric version.
static RELEASE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d)+(\.\d+)*$")
        .unwrap_or_else(|e| panic!("FATAL: release tag pattern failed to compile: {e}"))
});

/// Why a run does not publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Not running on CI
    MissingBuildId,
    /// Secrets are withheld for this build
    SecureVarsUnavailable,
    /// Branch or tag is not a version
    NotAReleaseTag {
        /// Branch name as seen by CI (empty when unset)
        branch: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingBuildId => f.write_str("TRAVIS_BUILD_ID is not set"),
            SkipReason::SecureVarsUnavailable => {
                f.write_str("secure environment variables are unavailable")
            }
            SkipReason::NotAReleaseTag { branch } => {
                write!(f, "'{}' is not a release tag", branch)
            }
        }
    }
}

/// Outcome of the gate check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Package and publish under this tag
    Eligible {
        /// Release tag, e.g. `v2.1.0`
        tag: String,
    },
    /// Stop after the smoke test
    Skip(SkipReason),
}

impl GateDecision {
    /// Whether packaging and publishing should run
    pub fn is_eligible(&self) -> bool {
        matches!(self, GateDecision::Eligible { .. })
    }
}

/// Whether a branch or tag name looks like a release version
pub fn is_release_tag(name: &str) -> bool {
    RELEASE_TAG.is_match(name)
}

/// Decide whether this run publishes a release.
///
/// Checks run in order and the first failure is reported.
pub fn evaluate(env: &CiEnvironment) -> GateDecision {
    if env.build_id.is_none() {
        return GateDecision::Skip(SkipReason::MissingBuildId);
    }

    if env.secure_env_vars.as_deref() == Some("false") {
        return GateDecision::Skip(SkipReason::SecureVarsUnavailable);
    }

    let branch = env.branch.clone().unwrap_or_default();
    if !is_release_tag(&branch) {
        return GateDecision::Skip(SkipReason::NotAReleaseTag { branch });
    }

    GateDecision::Eligible { tag: branch }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(build_id: Option<&str>, secure: Option<&str>, branch: Option<&str>) -> CiEnvironment {
        CiEnvironment {
            build_id: build_id.map(str::to_string),
            secure_env_vars: secure.map(str::to_string),
            branch: branch.map(str::to_string),
            github_token: None,
        }
    }

    #[test]
    fn test_release_tag_pattern() {
        for tag in ["v1.2.3", "1.0", "v10.20.30", "7", "v0.9"] {
            assert!(is_release_tag(tag), "{tag} should be a release tag");
        }
        for name in ["main", "master", "release-1.0", "v1.2.3-beta", "", "v", "1.", "1.0\nx"] {
            assert!(!is_release_tag(name), "{name:?} should not be a release tag");
        }
    }

    #[test]
    fn test_eligible_tag_build() {
        let decision = evaluate(&env(Some("123"), Some("true"), Some("v2.1.0")));
        assert_eq!(
            decision,
            GateDecision::Eligible {
                tag: "v2.1.0".to_string()
            }
        );
        assert!(decision.is_eligible());
    }

    #[test]
    fn test_secure_vars_false_always_skips() {
        for branch in [Some("v2.1.0"), Some("master"), None] {
            let decision = evaluate(&env(Some("123"), Some("false"), branch));
            assert_eq!(decision, GateDecision::Skip(SkipReason::SecureVarsUnavailable));
        }
    }

    #[test]
    fn test_secure_vars_only_literal_false_blocks() {
        // Unset or any other spelling still counts as available.
        assert!(evaluate(&env(Some("1"), None, Some("1.0"))).is_eligible());
        assert!(evaluate(&env(Some("1"), Some("FALSE"), Some("1.0"))).is_eligible());
    }

    #[test]
    fn test_missing_build_id_checked_first() {
        let decision = evaluate(&env(None, Some("false"), Some("master")));
        assert_eq!(decision, GateDecision::Skip(SkipReason::MissingBuildId));
    }

    #[test]
    fn test_branch_only_environment_skips() {
        let decision = evaluate(&env(None, None, Some("master")));
        assert!(!decision.is_eligible());
    }

    #[test]
    fn test_unset_branch_is_not_a_tag() {
        let decision = evaluate(&env(Some("123"), Some("true"), None));
        assert_eq!(
            decision,
            GateDecision::Skip(SkipReason::NotAReleaseTag {
                branch: String::new()
            })
        );
    }
}
