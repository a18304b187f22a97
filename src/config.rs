//! Release configuration and CI environment snapshot.
//!
//! Both structs are built once at startup and passed by reference into every
//! pipeline stage, so nothing downstream reads ambient process state.

use crate::error::{CliError, ReleaseError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// Default release host API
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default repository receiving releases
pub const DEFAULT_REPOSITORY: &str = "wizzomafizzo/starcheat";

/// Default location of the Qt deployment tool on the CI image
pub const DEFAULT_MACDEPLOYQT: &str = "/usr/local/opt/qt5/bin/macdeployqt";

/// Build tool output directory, relative to the project
pub const BUILD_DIR: &str = "build";

/// Environment variable names read from the CI platform
pub mod vars {
    /// Numeric build identifier, present only on CI
    pub const BUILD_ID: &str = "TRAVIS_BUILD_ID";
    /// `"false"` when secrets are withheld (e.g. pull requests from forks)
    pub const SECURE_ENV_VARS: &str = "TRAVIS_SECURE_ENV_VARS";
    /// Branch name, or tag name for tag builds
    pub const BRANCH: &str = "TRAVIS_BRANCH";
    /// Release host access token
    pub const GITHUB_KEY: &str = "GITHUB_KEY";
}

/// Immutable snapshot of the CI variables the pipeline consumes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnvironment {
    /// `TRAVIS_BUILD_ID`
    pub build_id: Option<String>,
    /// `TRAVIS_SECURE_ENV_VARS`
    pub secure_env_vars: Option<String>,
    /// `TRAVIS_BRANCH`
    pub branch: Option<String>,
    /// `GITHUB_KEY`
    pub github_token: Option<String>,
}

impl CiEnvironment {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a snapshot from arbitrary name/value pairs
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            build_id: map.remove(vars::BUILD_ID),
            secure_env_vars: map.remove(vars::SECURE_ENV_VARS),
            branch: map.remove(vars::BRANCH),
            github_token: map.remove(vars::GITHUB_KEY),
        }
    }
}

/// Release repository as `owner/name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Account or organization
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl FromStr for Repository {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            ReleaseError::Cli(CliError::InvalidArguments {
                reason: format!("repository must be OWNER/NAME, got '{}'", s),
            })
        };

        let (owner, name) = s.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Configuration for release operations
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Project checkout containing `build.py` and `mac/setup.py`
    pub project_dir: PathBuf,
    /// Repository receiving the release
    pub repository: Repository,
    /// Release host API base URL
    pub api_url: Url,
    /// Path to `macdeployqt`
    pub macdeployqt: PathBuf,
}

impl ReleaseConfig {
    /// Create a configuration with validated repository and API URL
    pub fn new(
        project_dir: impl Into<PathBuf>,
        repository: &str,
        api_url: &str,
        macdeployqt: impl Into<PathBuf>,
    ) -> Result<Self> {
        let api_url = Url::parse(api_url).map_err(|e| {
            ReleaseError::Cli(CliError::InvalidArguments {
                reason: format!("invalid API URL '{}': {}", api_url, e),
            })
        })?;

        Ok(Self {
            project_dir: project_dir.into(),
            repository: repository.parse()?,
            api_url,
            macdeployqt: macdeployqt.into(),
        })
    }

    /// Directory the build tool writes into; all later stages run here
    pub fn build_dir(&self) -> PathBuf {
        self.project_dir.join(BUILD_DIR)
    }

    /// Location of the py2app setup script before relocation
    pub fn setup_script(&self) -> PathBuf {
        self.project_dir.join("mac").join("setup.py")
    }

    /// Bundle produced by py2app, relative to the build directory
    pub fn dist_bundle(&self) -> &'static Path {
        Path::new("dist/starcheat.app")
    }

    /// Canonical bundle name, relative to the build directory
    pub fn bundle_name(&self) -> &'static str {
        "StarCheat.app"
    }

    /// Archive file name, relative to the build directory
    pub fn archive_name(&self) -> &'static str {
        "starcheat.tar.gz"
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            repository: Repository {
                owner: "wizzomafizzo".to_string(),
                name: "starcheat".to_string(),
            },
            api_url: Url::parse(DEFAULT_API_URL).unwrap_or_else(|e| {
                panic!("FATAL: default API URL failed to parse: {e}")
            }),
            macdeployqt: PathBuf::from(DEFAULT_MACDEPLOYQT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_picks_known_names() {
        let env = CiEnvironment::from_vars([
            ("TRAVIS_BUILD_ID", "123"),
            ("TRAVIS_BRANCH", "v2.1.0"),
            ("HOME", "/Users/travis"),
        ]);
        assert_eq!(env.build_id.as_deref(), Some("123"));
        assert_eq!(env.branch.as_deref(), Some("v2.1.0"));
        assert_eq!(env.secure_env_vars, None);
        assert_eq!(env.github_token, None);
    }

    #[test]
    fn test_repository_parsing() {
        let repo: Repository = "wizzomafizzo/starcheat".parse().unwrap();
        assert_eq!(repo.owner, "wizzomafizzo");
        assert_eq!(repo.name, "starcheat");
        assert_eq!(repo.to_string(), "wizzomafizzo/starcheat");

        assert!("starcheat".parse::<Repository>().is_err());
        assert!("/starcheat".parse::<Repository>().is_err());
        assert!("a/b/c".parse::<Repository>().is_err());
    }

    #[test]
    fn test_config_rejects_bad_api_url() {
        let result = ReleaseConfig::new(".", DEFAULT_REPOSITORY, "not a url", DEFAULT_MACDEPLOYQT);
        assert!(matches!(result, Err(ReleaseError::Cli(_))));
    }

    #[test]
    fn test_default_paths() {
        let config = ReleaseConfig::default();
        assert_eq!(config.build_dir(), PathBuf::from("./build"));
        assert_eq!(config.setup_script(), PathBuf::from("./mac/setup.py"));
        assert_eq!(config.api_url.as_str(), "https://api.github.com/");
    }
}
