//! Windows release packaging for the Nxtscape browser.
//!
//! Turns a finished Chromium build into distributable release artifacts:
//!
//! 1. **Build**: make sure `mini_installer.exe` exists, running
//!    `autoninja -C <out_dir> mini_installer` if it does not
//! 2. **Package**: copy the installer to a versioned name and wrap it in a zip
//! 3. **Sign**: optionally sign `chrome.exe` and `mini_installer.exe` with
//!    eSigner, a PFX file or the Windows certificate store
//!
//! # Output
//!
//! | File | Name |
//! |------|------|
//! | Installer | `{app}_{chromium_version}_{arch}_installer.exe` |
//! | Archive | `{app}_{chromium_version}_{arch}_installer.zip` |
//! | Archive entry | `{app}_{nxtscape_version}_{arch}_installer.exe` |
//!
//! # Example
//!
//! ```no_run
//! use nxtscape_packager::packager::{self, BuildContextBuilder, SigningConfig};
//!
//! # async fn example() -> nxtscape_packager::packager::Result<()> {
//! let ctx = BuildContextBuilder::new()
//!     .chromium_src("C:/src/chromium/src")
//!     .out_dir("out/Default_x64")
//!     .app_base_name("Nxtscape")
//!     .chromium_version("137.0.7151.69")
//!     .build()?;
//!
//! let signing = SigningConfig::from_env()?;
//! let report = packager::release(&ctx, Some(&signing), None).await?;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod arch;
pub mod build;
mod context;
pub mod error;
pub mod package;
pub mod sign;
pub(crate) mod utils;

pub use arch::Arch;
pub use build::{WorkingDirGuard, ensure_mini_installer};
pub use context::{
    BROWSER_EXE, BuildContext, BuildContextBuilder, ContextConfig, MINI_INSTALLER,
    MINI_INSTALLER_TARGET, default_build_tool,
};
pub use error::{Context, Error, ErrorExt, Result};
pub use package::{
    PackageReport, create_files_cfg_package, create_installer, create_installer_zip, package,
    package_universal,
};
pub use sign::{
    SignOutcome, SignReport, SigningBackend, SigningConfig, SigningMethod, sign_binaries,
};

use std::path::PathBuf;

/// A file produced by packaging.
///
/// # Fields
///
/// - `path`: location of the file in the distribution directory
/// - `size`: size in bytes
/// - `checksum`: hex-encoded SHA-256 of the file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackagedArtifact {
    /// Path of the produced file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// SHA-256 checksum (hex)
    pub checksum: String,
}

/// Outcome of [`release`].
#[derive(Debug)]
pub struct ReleaseReport {
    /// Packaging results
    pub package: PackageReport,
    /// Signing results; `None` when signing was not requested or was not
    /// reached because packaging failed
    pub signing: Option<SignOutcome>,
}

impl ReleaseReport {
    /// True when packaging succeeded and signing, if it ran, succeeded.
    pub fn is_success(&self) -> bool {
        self.package.is_success() && self.signing.as_ref().is_none_or(SignOutcome::is_success)
    }
}

/// Packages the build and, when `signing` is given, signs its binaries.
///
/// Signing only runs after both packaging operations succeeded.
///
/// # Errors
///
/// Build failures and signing preconditions (see [`sign_binaries`]) are
/// returned as `Err`, wrapped in `Context`; per-operation failures are in the
/// report.
pub async fn release(
    ctx: &BuildContext,
    signing: Option<&SigningConfig>,
    certificate_name: Option<&str>,
) -> Result<ReleaseReport> {
    log::info!(
        "Releasing {} {} ({})",
        ctx.app_base_name(),
        ctx.chromium_version(),
        ctx.architecture()
    );

    let package = package::package(ctx).await?;
    for artifact in package.artifacts() {
        log::info!(
            "  {} ({} bytes, sha256 {})",
            artifact.path.display(),
            artifact.size,
            artifact.checksum
        );
    }

    let signing = match signing {
        Some(_) if !package.is_success() => {
            log::error!("Packaging failed, not signing");
            None
        }
        Some(config) => Some(
            sign_binaries(ctx, config, certificate_name)
                .await
                .context("signing release binaries")?,
        ),
        None => None,
    };

    Ok(ReleaseReport { package, signing })
}
