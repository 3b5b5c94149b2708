//! Top-level error types for nxtscape_packager.
//!
//! This module wraps packaging errors and CLI errors with actionable
//! messages and recovery suggestions.

use crate::packager;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type for the command line tool
#[derive(Error, Debug)]
pub enum PackagerError {
    /// Packaging or signing errors
    #[error("Packaging error: {0}")]
    Packager(#[from] packager::Error),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),
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

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Config file could not be loaded
    #[error("Failed to load config file {}: {reason}", .path.display())]
    ConfigLoad {
        /// Path of the config file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

impl PackagerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PackagerError::Packager(inner) => packager_suggestions(inner),
            PackagerError::Cli(CliError::MissingArgument { argument }) => vec![
                format!("Pass --{} on the command line", argument.replace('_', "-")),
                format!("Or set `{}` in the [context] table of --config", argument),
            ],
            PackagerError::Cli(CliError::InvalidArguments { .. }) => vec![
                "Run with --help to see the accepted values".to_string(),
            ],
            PackagerError::Cli(CliError::ConfigLoad { path, .. }) => vec![
                format!("Check that {} exists and is valid TOML", path.display()),
                "Only a [context] table with known keys is accepted".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable by the operator without code changes
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PackagerError::Packager(inner) if inner.is_unsupported())
    }
}

fn packager_suggestions(error: &packager::Error) -> Vec<String> {
    use packager::Error;

    match error {
        Error::Context(_, inner) => packager_suggestions(inner),
        Error::MissingArtifact { what, .. } if what == "mini_installer.exe" => vec![
            "Build the installer first: autoninja -C <out_dir> mini_installer".to_string(),
            "Check that --out-dir matches the GN output directory".to_string(),
        ],
        Error::MissingArtifact { what, .. } if what == "PFX certificate" => vec![
            "Point PFX_PATH at an existing .pfx file".to_string(),
            "Or unset PFX_PATH to sign from the certificate store".to_string(),
        ],
        Error::BuildOutputMissing { .. } => vec![
            "Inspect the build log above for errors".to_string(),
            "Verify the out directory contains a valid args.gn".to_string(),
        ],
        Error::NoBinariesToSign { .. } => vec![
            "Build chrome and mini_installer before signing".to_string(),
        ],
        Error::ToolNotFound { tool, .. } if tool.starts_with("CodeSignTool") => vec![
            "Set CODESIGNTOOL_PATH in .env file".to_string(),
            "Download CodeSignTool from SSL.com".to_string(),
        ],
        Error::ToolNotFound { .. } => vec![
            "Install the Windows SDK (signing tools)".to_string(),
            "Or set SIGNTOOL_PATH to signtool.exe".to_string(),
        ],
        Error::MissingConfiguration(msg) if msg.ends_with("is required") => vec![
            "Pass the value on the command line or in the [context] table of --config"
                .to_string(),
        ],
        Error::MissingConfiguration(_) | Error::InvalidOtp => vec![
            "Set ESIGNER_USERNAME, ESIGNER_PASSWORD and ESIGNER_TOTP_SECRET in .env".to_string(),
            "The TOTP secret is in the SSL.com dashboard under eSigner settings".to_string(),
        ],
        Error::CommandStatus { .. } | Error::CommandFailed { .. } => vec![
            "Run with --verbose or RUST_LOG=debug to see the full command".to_string(),
        ],
        Error::Unsupported(_) => vec![
            "Use the `package` command to build the installer packages".to_string(),
        ],
        _ => vec!["Check the error message above for specific details".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_installer_suggests_build() {
        let err = PackagerError::from(packager::Error::MissingArtifact {
            what: "mini_installer.exe".into(),
            path: PathBuf::from("out/Default_x64/mini_installer.exe"),
        });
        let suggestions = err.recovery_suggestions();
        assert!(suggestions[0].contains("autoninja"));
    }

    #[test]
    fn test_suggestions_see_through_context() {
        let inner = packager::Error::ToolNotFound {
            tool: "signtool.exe".into(),
            hint: "Please install Windows SDK".into(),
        };
        let err = PackagerError::from(packager::Error::Context(
            "signing binaries".into(),
            Box::new(inner),
        ));
        assert!(err.recovery_suggestions()[0].contains("Windows SDK"));
    }

    #[test]
    fn test_unsupported_is_not_recoverable() {
        let err = PackagerError::from(packager::Error::Unsupported("FILES.cfg packaging".into()));
        assert!(!err.is_recoverable());
        assert!(PackagerError::from(packager::Error::InvalidOtp).is_recoverable());

        let wrapped = packager::Error::Context(
            "packaging from FILES.cfg".into(),
            Box::new(packager::Error::Unsupported("FILES.cfg packaging".into())),
        );
        assert!(!PackagerError::from(wrapped).is_recoverable());
    }
}
