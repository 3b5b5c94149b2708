//! signtool.exe discovery and invocation.
//!
//! Used by both the certificate-store backend (`/n <certificate>`) and the
//! PFX backend (`/f <file.pfx>`). Every signature is timestamped and uses
//! SHA-256 for both the file digest and the timestamp digest.

use super::{SignReport, config::SigningConfig};
use crate::packager::{
    error::{Error, Result},
    utils::process::{describe, run_command},
};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Windows SDK `bin` directories searched when signtool is not on PATH.
pub const SDK_BIN_ROOTS: &[&str] = &[
    "C:/Program Files (x86)/Windows Kits/10/bin",
    "C:/Program Files/Windows Kits/10/bin",
];

/// Locates signtool.exe.
///
/// Search order:
/// 1. `signtool_path` from the config, which must exist
/// 2. `signtool` on PATH
/// 3. `<sdk>/<version>/x64/signtool.exe` under [`SDK_BIN_ROOTS`]
pub fn locate_signtool(config: &SigningConfig) -> Result<PathBuf> {
    if let Some(path) = &config.signtool_path {
        if path.is_file() {
            log::debug!("Using signtool from SIGNTOOL_PATH: {}", path.display());
            return Ok(path.clone());
        }
        return Err(Error::ToolNotFound {
            tool: "signtool.exe".into(),
            hint: format!("SIGNTOOL_PATH points to {} which does not exist", path.display()),
        });
    }

    if let Ok(path) = which::which("signtool") {
        log::debug!("Found signtool at: {}", path.display());
        return Ok(path);
    }

    let roots: Vec<PathBuf> = SDK_BIN_ROOTS.iter().map(PathBuf::from).collect();
    if let Some(path) = find_in_sdk_roots(&roots)? {
        log::debug!("Found signtool in Windows SDK: {}", path.display());
        return Ok(path);
    }

    Err(Error::ToolNotFound {
        tool: "signtool.exe".into(),
        hint: "Please install Windows SDK".into(),
    })
}

/// Finds the first `*/x64/signtool.exe` under the given SDK `bin` roots.
pub fn find_in_sdk_roots(roots: &[PathBuf]) -> Result<Option<PathBuf>> {
    for root in roots.iter().filter(|r| r.is_dir()) {
        let pattern = format!(
            "{}/*/x64/signtool.exe",
            glob::Pattern::escape(&root.to_string_lossy())
        );

        let found = glob::glob(&pattern)?
            .filter_map(|entry| entry.ok())
            .find(|path| path.is_file());

        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

/// `signtool sign /n <certificate> /tr <url> /td sha256 /fd sha256 <file>`
pub fn certificate_store_command(
    signtool: &Path,
    certificate_name: &str,
    timestamp_url: &str,
    binary: &Path,
) -> Command {
    let mut command = Command::new(signtool);
    command
        .arg("sign")
        .args(["/n", certificate_name])
        .args(["/tr", timestamp_url])
        .args(["/td", "sha256"])
        .args(["/fd", "sha256"])
        .arg(binary);
    command
}

/// `signtool sign /f <pfx> [/p <password>] /tr <url> /td sha256 /fd sha256 <file>`
pub fn pfx_command(
    signtool: &Path,
    pfx_path: &Path,
    pfx_password: Option<&str>,
    timestamp_url: &str,
    binary: &Path,
) -> Command {
    let mut command = Command::new(signtool);
    command.arg("sign").arg("/f").arg(pfx_path);
    if let Some(password) = pfx_password {
        command.args(["/p", password]);
    }
    command
        .args(["/tr", timestamp_url])
        .args(["/td", "sha256"])
        .args(["/fd", "sha256"])
        .arg(binary);
    command
}

/// `signtool verify /pa <file>`
pub fn verify_command(signtool: &Path, binary: &Path) -> Command {
    let mut command = Command::new(signtool);
    command.args(["verify", "/pa"]).arg(binary);
    command
}

/// Signs binaries with a certificate from the Windows certificate store.
///
/// Each binary is signed and then verified; a failure at either step marks
/// that binary failed and the remaining binaries are still processed.
///
/// # Errors
///
/// Returns `ToolNotFound` if signtool cannot be located.
pub async fn sign_with_certificate_store(
    binaries: &[PathBuf],
    certificate_name: &str,
    config: &SigningConfig,
) -> Result<SignReport> {
    log::info!("Using certificate from store: {}", certificate_name);

    let signtool = locate_signtool(config)?;
    let mut report = SignReport::new("certificate-store");

    for binary in binaries {
        let name = file_name(binary);
        log::info!("Signing {}...", name);

        let mut sign =
            certificate_store_command(&signtool, certificate_name, &config.timestamp_url, binary);
        let label = describe(&sign);
        let outcome = match run_command(&mut sign, &label).await {
            Ok(()) => {
                log::info!("✓ {} signed successfully", name);
                verify(&signtool, binary).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => report.record_signed(binary),
            Err(e) => {
                log::error!("Failed to sign {}: {}", name, e);
                report.record_failed(binary, e);
            }
        }
    }

    Ok(report)
}

/// Signs one binary with a local PFX certificate file.
///
/// The PFX password is passed to signtool but never logged.
pub async fn sign_with_local_pfx(
    signtool: &Path,
    binary: &Path,
    pfx_path: &Path,
    pfx_password: Option<&str>,
    timestamp_url: &str,
) -> Result<()> {
    let name = file_name(binary);
    log::info!("Signing {} with PFX certificate...", name);

    let mut command = pfx_command(signtool, pfx_path, pfx_password, timestamp_url, binary);
    let label = format!("{} sign /f {} {}", signtool.display(), pfx_path.display(), binary.display());
    run_command(&mut command, &label).await?;

    log::info!("✓ {} signed successfully with PFX certificate", name);
    Ok(())
}

async fn verify(signtool: &Path, binary: &Path) -> Result<()> {
    let mut command = verify_command(signtool, binary);
    let label = describe(&command);
    run_command(&mut command, &label).await?;
    log::info!("✓ {} signature verified successfully", file_name(binary));
    Ok(())
}

pub(super) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
