//! Installer build step.
//!
//! Guarantees `mini_installer.exe` exists in the build output directory,
//! invoking the build command from the Chromium source tree when it does not.

use crate::packager::{
    context::{BuildContext, MINI_INSTALLER_TARGET},
    error::{Error, ErrorExt, Result},
    utils::process::{describe, run_command},
};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// RAII guard for the process working directory.
///
/// Switches to a directory on creation and switches back when dropped,
/// including on early return, error or panic.
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    /// Changes the working directory to `dir`, remembering the current one.
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous = std::env::current_dir().fs_context("reading working directory", ".")?;
        std::env::set_current_dir(dir).fs_context("changing working directory to", dir)?;
        log::debug!("Entered {}", dir.display());
        Ok(Self { previous })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        // Drop must never panic
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            log::warn!(
                "Failed to restore working directory to {}: {}",
                self.previous.display(),
                e
            );
        }
    }
}

/// Ensures the installer binary exists, building it if necessary.
///
/// When the installer is already present it is returned without rebuilding.
/// Otherwise runs `<build_tool> -C <out_dir> mini_installer` with the Chromium
/// source directory as working directory, then checks the file again.
///
/// # Errors
///
/// * `CommandFailed` / `CommandStatus` - the build command failed
/// * `BuildOutputMissing` - the command succeeded but produced no installer
pub async fn ensure_mini_installer(ctx: &BuildContext) -> Result<PathBuf> {
    log::info!("🔨 Checking mini_installer build...");

    let installer = ctx.mini_installer_path();
    if installer.exists() {
        log::info!("mini_installer.exe already exists");
        return Ok(installer);
    }

    log::info!("Building mini_installer target...");

    let mut command = Command::new(ctx.build_tool());
    command.arg("-C").arg(ctx.out_dir()).arg(MINI_INSTALLER_TARGET);
    let label = describe(&command);

    {
        let _cwd = WorkingDirGuard::enter(ctx.chromium_src())?;
        run_command(&mut command, &label).await?;
    }

    if !installer.exists() {
        log::error!("mini_installer build completed but file not found");
        return Err(Error::BuildOutputMissing { path: installer });
    }

    log::info!("✓ mini_installer built successfully");
    Ok(installer)
}
