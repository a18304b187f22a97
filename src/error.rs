//! Error types for starcheat_release operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for starcheat_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all starcheat_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// External command errors
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Bundle packaging errors
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Release publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// File system operation failed on a known path.
    ///
    /// Created by the [`FsContext`] trait's `fs_context` method.
    #[error("{context} {path}: {source}")]
    Fs {
        /// Context describing the operation (e.g., "moving bundle")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// External command errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// Program could not be located on PATH or relative to the working directory
    #[error("Command '{program}' not found: {reason}")]
    NotFound {
        /// Program name as requested
        program: String,
        /// Reason reported by the lookup
        reason: String,
    },

    /// Process could not be spawned
    #[error("Failed to launch '{command}': {reason}")]
    LaunchFailed {
        /// Full command line
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// Process ran but exited unsuccessfully
    #[error("Command execution failed: {command} (exit code {})", ExitCode(*exit_code))]
    ExecutionFailed {
        /// Full command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
    },
}

/// Bundle packaging errors
#[derive(Error, Debug)]
pub enum PackageError {
    /// The bundling tool reported success but produced no bundle
    #[error("Packaging tool exited successfully but no bundle was found at {path}")]
    MissingBundle {
        /// Expected bundle location
        path: PathBuf,
    },

    /// The py2app setup script is not where the pipeline expects it
    #[error("Setup script not found at {path}")]
    MissingSetupScript {
        /// Expected script location
        path: PathBuf,
    },
}

/// Phase of the publish stage, used to attribute request failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPhase {
    /// Compressing the bundle
    Archive,
    /// Creating the release record
    CreateRelease,
    /// Reading the upload URL from the release record
    ExtractUrl,
    /// Uploading the archive as a release asset
    Upload,
}

impl fmt::Display for PublishPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishPhase::Archive => "archive",
            PublishPhase::CreateRelease => "create release",
            PublishPhase::ExtractUrl => "extract upload url",
            PublishPhase::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// Release publishing errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// No release-host token in the environment
    #[error("GITHUB_KEY is not set; cannot authenticate with the release host")]
    MissingToken,

    /// Transport-level failure talking to the release host
    #[error("Request failed during {phase}: {reason}")]
    RequestFailed {
        /// Phase that issued the request
        phase: PublishPhase,
        /// Reason for the error
        reason: String,
    },

    /// Release response carried no upload URL
    #[error(
        "Skipping uploading build because tag is already in use or the release was rejected \
         (HTTP {status}{})",
        message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    MissingUploadUrl {
        /// HTTP status of the create-release response
        status: u16,
        /// Message field from the host's error body, if any
        message: Option<String>,
    },

    /// Upload URL could not be parsed
    #[error("Invalid upload URL '{url}': {reason}")]
    InvalidUploadUrl {
        /// URL as extracted
        url: String,
        /// Parse failure
        reason: String,
    },

    /// Release host refused the asset upload
    #[error("Asset upload rejected (HTTP {status}): {body}")]
    UploadRejected {
        /// HTTP status of the upload response
        status: u16,
        /// Raw response body
        body: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

struct ExitCode(Option<i32>);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "{code}"),
            None => f.write_str("none, terminated by signal"),
        }
    }
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Command(CommandError::NotFound { program, .. }) => {
                let mut suggestions =
                    vec![format!("Install '{}' on the CI host or add it to PATH", program)];
                if program.ends_with("macdeployqt") {
                    suggestions.push("Pass --macdeployqt if Qt is installed elsewhere".to_string());
                }
                suggestions
            }
            ReleaseError::Package(PackageError::MissingSetupScript { .. }) => vec![
                "Ensure mac/setup.py is committed next to the build directory".to_string(),
            ],
            ReleaseError::Publish(PublishError::MissingToken) => vec![
                "Add GITHUB_KEY as a secure environment variable in the CI settings".to_string(),
            ],
            ReleaseError::Publish(PublishError::MissingUploadUrl { .. }) => vec![
                "Check whether a release for this tag already exists".to_string(),
                "Delete the existing release or push a new tag".to_string(),
                "Verify GITHUB_KEY has permission to create releases".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

/// Attach an operation and path to I/O failures.
pub trait FsContext<T> {
    /// Wrap the error as [`ReleaseError::Fs`].
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> FsContext<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| ReleaseError::Fs {
            context,
            path: path.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_failed_reports_exit_code() {
        let err = CommandError::ExecutionFailed {
            command: "python3 build.py -v".to_string(),
            exit_code: Some(2),
        };
        assert_eq!(
            err.to_string(),
            "Command execution failed: python3 build.py -v (exit code 2)"
        );

        let err = CommandError::ExecutionFailed {
            command: "./starcheat.py -v".to_string(),
            exit_code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_missing_upload_url_includes_host_message() {
        let err = PublishError::MissingUploadUrl {
            status: 422,
            message: Some("Validation Failed".to_string()),
        };
        let text = err.to_string();
        assert!(text.starts_with("Skipping uploading build because tag is already in use"));
        assert!(text.contains("HTTP 422: Validation Failed"));
    }

    #[test]
    fn test_fs_context_wraps_path() {
        let io: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        let err = io.fs_context("moving bundle", "dist/starcheat.app").unwrap_err();
        assert_eq!(err.to_string(), "moving bundle dist/starcheat.app: gone");
    }
}
