//! Error types for packaging and signing operations.
//!
//! Provides the failure taxonomy of the packaging pipeline with contextual
//! error chaining and filesystem-specific errors.
//!
//! # Taxonomy
//!
//! - **Missing artifact**: [`Error::MissingArtifact`], [`Error::BuildOutputMissing`],
//!   [`Error::NoBinariesToSign`]
//! - **External tool failure**: [`Error::CommandFailed`], [`Error::CommandStatus`],
//!   [`Error::ToolNotFound`]
//! - **Missing configuration**: [`Error::MissingConfiguration`], [`Error::InvalidOtp`]
//! - **Unsupported operation**: [`Error::Unsupported`]
//!
//! # Example
//!
//! ```no_run
//! use nxtscape_packager::packager::{Context, ErrorExt, Result};
//! use std::path::Path;
//!
//! fn read_args(path: &Path) -> Result<String> {
//!     let contents = std::fs::read_to_string(path).fs_context("reading args.gn", path)?;
//!     Ok(contents)
//! }
//!
//! fn first_line(path: &Path) -> Result<String> {
//!     let contents = read_args(path).context("loading build arguments")?;
//!     Ok(contents.lines().next().context("args.gn is empty")?.to_string())
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::PathBuf,
};
use thiserror::Error as DeriveError;

/// Errors returned by the packager.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// Context describing the operation (e.g., "copying installer")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// A required input file does not exist.
    #[error("{what} not found at: {}", .path.display())]
    MissingArtifact {
        /// Human-readable name of the artifact
        what: String,
        /// Path where the artifact was expected
        path: PathBuf,
    },

    /// The build command returned success but did not produce its output.
    #[error("build completed but {} was not produced", .path.display())]
    BuildOutputMissing {
        /// Path of the expected build output
        path: PathBuf,
    },

    /// None of the candidate binaries exist in the build output directory.
    #[error("no binaries found to sign in {}", .dir.display())]
    NoBinariesToSign {
        /// Directory that was searched
        dir: PathBuf,
    },

    /// Child process could not be spawned.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Child process exited unsuccessfully.
    #[error("command {command} exited with {}", describe_exit(.code))]
    CommandStatus {
        /// Command that failed
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
    },

    /// An external tool could not be located.
    #[error("{tool} not found: {hint}")]
    ToolNotFound {
        /// Tool name (e.g. "signtool.exe")
        tool: String,
        /// How to make the tool available
        hint: String,
    },

    /// Required credentials or settings are absent.
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    /// A one-time password entered interactively was malformed.
    #[error("invalid OTP code, must be 6 digits")]
    InvalidOtp,

    /// The operation is recognised but intentionally not implemented.
    #[error("{0} is not implemented")]
    Unsupported(String),

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// ZIP archive creation error.
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Config file parsing error.
    #[error("{0}")]
    TomlError(#[from] toml::de::Error),

    /// URL parsing error.
    #[error("{0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid glob pattern (SDK discovery).
    #[error("{0}")]
    GlobPattern(#[from] glob::PatternError),

    /// Unsupported CPU architecture.
    #[error("unsupported architecture: {0}")]
    ArchError(String),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "a signal".to_string(),
    }
}

impl Error {
    /// Returns true if the error means an input file was missing.
    pub fn is_missing_artifact(&self) -> bool {
        match self {
            Error::MissingArtifact { .. }
            | Error::BuildOutputMissing { .. }
            | Error::NoBinariesToSign { .. } => true,
            Error::Context(_, inner) => inner.is_missing_artifact(),
            _ => false,
        }
    }

    /// Returns true if the error is the explicit "not implemented" signal.
    pub fn is_unsupported(&self) -> bool {
        match self {
            Error::Unsupported(_) => true,
            Error::Context(_, inner) => inner.is_unsupported(),
            _ => false,
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with the packager's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying installer".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::packager::error::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::packager::error::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::packager::error::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_classification() {
        let err: Result<()> = Err(Error::Unsupported("FILES.cfg packaging".into()));
        let err = err.context("creating package").unwrap_err();
        assert!(err.is_unsupported());
        assert!(!err.is_missing_artifact());
        assert_eq!(
            err.to_string(),
            "creating package: FILES.cfg packaging is not implemented"
        );
    }

    #[test]
    fn test_command_status_display() {
        let err = Error::CommandStatus {
            command: "signtool verify".into(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "command signtool verify exited with code 1");

        let err = Error::CommandStatus {
            command: "autoninja".into(),
            code: None,
        };
        assert_eq!(err.to_string(), "command autoninja exited with a signal");
    }

    #[test]
    fn test_fs_context() {
        let io: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = io.fs_context("reading args.gn", "/out/args.gn").unwrap_err();
        assert_eq!(err.to_string(), "reading args.gn /out/args.gn: gone");
    }
}
