//! # Nxtscape Packager
//!
//! Windows release packaging and code signing for the Nxtscape browser.
//!
//! Given a finished Chromium build, this crate makes sure the
//! `mini_installer` target is built, copies the installer to a versioned
//! name, wraps it in a zip archive, and signs the Windows binaries through
//! SSL.com eSigner, a PFX certificate or the Windows certificate store.
//!
//! ## Usage
//!
//! ```bash
//! nxtscape_packager --config release.toml package
//! nxtscape_packager --config release.toml sign --certificate "Nxtscape Inc"
//! nxtscape_packager --config release.toml release --sign
//! nxtscape_packager --chromium-src C:/src/chromium/src --out-dir out/Default_x64 target-cpu
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod packager;

// Re-export main types for public API
pub use cli::Args;
pub use error::{CliError, PackagerError, Result};
pub use packager::{
    Arch, BuildContext, BuildContextBuilder, PackageReport, PackagedArtifact, ReleaseReport,
    SignOutcome, SigningConfig,
};
