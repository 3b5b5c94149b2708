//! Installer packaging.
//!
//! Copies the built installer into the distribution directory under a
//! version- and architecture-stamped name, and wraps it in a zip archive.
//!
//! # Output
//!
//! For `app = "Nxtscape"`, `version = "1.2.3"`, `arch = x64`:
//! - `dist/Nxtscape_1.2.3_x64_installer.exe`
//! - `dist/Nxtscape_1.2.3_x64_installer.zip`

use crate::packager::{
    PackagedArtifact,
    build::ensure_mini_installer,
    context::BuildContext,
    error::{Context, Error, ErrorExt, Result},
    utils::fs::{copy_file, sha256_file, whole_megabytes, write_single_entry_zip},
};
use std::path::{Path, PathBuf};

/// Outcome of [`package`]: both operations are always attempted.
#[derive(Debug)]
pub struct PackageReport {
    /// Result of the installer copy.
    pub installer: Result<PackagedArtifact>,
    /// Result of the zip archive creation.
    pub archive: Result<PackagedArtifact>,
}

impl PackageReport {
    /// True only if both the installer and the archive were produced.
    pub fn is_success(&self) -> bool {
        self.installer.is_ok() && self.archive.is_ok()
    }

    /// Artifacts that were produced.
    pub fn artifacts(&self) -> impl Iterator<Item = &PackagedArtifact> {
        self.installer.iter().chain(self.archive.iter())
    }

    /// Errors of the operations that failed.
    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        self.installer
            .as_ref()
            .err()
            .into_iter()
            .chain(self.archive.as_ref().err())
    }
}

/// Creates the Windows packages: installer copy and installer zip.
///
/// Builds `mini_installer` first if needed; a build failure is returned as
/// `Err`. The two packaging operations are independent: one failing does not
/// prevent the other, and both outcomes are reported.
pub async fn package(ctx: &BuildContext) -> Result<PackageReport> {
    log::info!("📦 Creating Windows packages...");

    ensure_mini_installer(ctx)
        .await
        .inspect_err(|e| log::error!("Failed to build mini_installer: {}", e))
        .context("building mini_installer")?;

    let installer = create_installer(ctx).await;
    match &installer {
        Ok(_) => log::info!("✓ Installer created successfully"),
        Err(e) => log::error!("Failed to create installer: {}", e),
    }

    let archive = create_installer_zip(ctx).await;
    match &archive {
        Ok(_) => log::info!("✓ Installer ZIP created successfully"),
        Err(e) => log::error!("Failed to create installer ZIP: {}", e),
    }

    Ok(PackageReport { installer, archive })
}

/// Copies `mini_installer.exe` to `{app}_{version}_{arch}_installer.exe`.
///
/// # Errors
///
/// * `MissingArtifact` - the installer has not been built
/// * `Fs` - the output directory or copy could not be written
pub async fn create_installer(ctx: &BuildContext) -> Result<PackagedArtifact> {
    log::info!("🔧 Creating Windows installer...");

    let source = require_installer(ctx)?;
    let destination = ctx.dist_dir().join(ctx.installer_name());

    copy_file(&source, &destination).await?;
    log::info!("✓ Installer created: {}", ctx.installer_name());

    describe_artifact(destination).await
}

/// Writes `{app}_{version}_{arch}_installer.zip` containing the installer.
///
/// The entry inside the archive is named with the nxtscape version (see
/// [`BuildContext::archive_entry_name`]).
///
/// # Errors
///
/// * `MissingArtifact` - the installer has not been built
/// * `Fs` / `ZipError` - the archive could not be written
pub async fn create_installer_zip(ctx: &BuildContext) -> Result<PackagedArtifact> {
    log::info!("📦 Creating installer ZIP package...");

    let source = require_installer(ctx)?;
    let archive = ctx.dist_dir().join(ctx.archive_name());

    let size = write_single_entry_zip(&source, &archive, &ctx.archive_entry_name()).await?;
    log::info!("Added installer to ZIP ({} MB)", whole_megabytes(size));
    log::info!("✓ Installer ZIP created: {}", ctx.archive_name());

    describe_artifact(archive).await
}

/// Multi-architecture packaging.
///
/// Windows has no universal binary format, so this reports success without
/// producing anything. Build one package per architecture instead.
pub fn package_universal(contexts: &[BuildContext]) -> Result<()> {
    log::warn!("Universal binaries are not supported on Windows");
    log::info!(
        "Consider creating separate packages for each architecture ({} context(s) given)",
        contexts.len()
    );
    Ok(())
}

/// Packaging driven by Chromium's `FILES.cfg` manifest.
///
/// Checks the manifest exists, then always returns `Unsupported`.
///
/// # Errors
///
/// * `MissingArtifact` - `FILES.cfg` is absent
/// * `Unsupported` - otherwise
pub fn create_files_cfg_package(ctx: &BuildContext) -> Result<PackagedArtifact> {
    log::info!("📦 Creating FILES.cfg-based package...");

    let files_cfg = ctx.files_cfg_path();
    if !files_cfg.exists() {
        return Err(Error::MissingArtifact {
            what: "FILES.cfg".into(),
            path: files_cfg,
        });
    }

    log::warn!("FILES.cfg packaging not yet implemented");
    Err(Error::Unsupported("FILES.cfg packaging".into()))
}

fn require_installer(ctx: &BuildContext) -> Result<PathBuf> {
    let source = ctx.mini_installer_path();
    if !source.exists() {
        log::warn!("mini_installer.exe not found at: {}", source.display());
        log::info!("{}", ctx.build_hint());
        return Err(Error::MissingArtifact {
            what: "mini_installer.exe".into(),
            path: source,
        });
    }
    Ok(source)
}

async fn describe_artifact(path: PathBuf) -> Result<PackagedArtifact> {
    let size = artifact_size(&path).await?;
    let checksum = sha256_file(&path).await?;
    log::debug!("{} sha256={}", path.display(), checksum);
    Ok(PackagedArtifact {
        path,
        size,
        checksum,
    })
}

async fn artifact_size(path: &Path) -> Result<u64> {
    Ok(tokio::fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?
        .len())
}
