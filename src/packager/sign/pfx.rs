//! Local PFX certificate backend.

use super::{
    SignReport,
    config::SigningConfig,
    signtool::{file_name, locate_signtool, sign_with_local_pfx},
};
use crate::packager::error::{Error, Result};
use std::path::PathBuf;

/// Signs every binary with the PFX file named by `PFX_PATH`.
///
/// # Errors
///
/// * `MissingConfiguration` - no PFX path is configured
/// * `MissingArtifact` - the PFX file does not exist
/// * `ToolNotFound` - signtool cannot be located
pub async fn sign_with_pfx(binaries: &[PathBuf], config: &SigningConfig) -> Result<SignReport> {
    let pfx_path = config
        .pfx_path
        .as_deref()
        .ok_or_else(|| Error::MissingConfiguration("PFX_PATH is not set".into()))?;

    if !pfx_path.is_file() {
        log::error!("PFX certificate not found at: {}", pfx_path.display());
        return Err(Error::MissingArtifact {
            what: "PFX certificate".into(),
            path: pfx_path.to_path_buf(),
        });
    }

    log::info!("Using PFX certificate: {}", pfx_path.display());
    let signtool = locate_signtool(config)?;

    let mut report = SignReport::new("pfx");
    for binary in binaries {
        match sign_with_local_pfx(
            &signtool,
            binary,
            pfx_path,
            config.pfx_password.as_deref(),
            &config.timestamp_url,
        )
        .await
        {
            Ok(()) => report.record_signed(binary),
            Err(e) => {
                log::error!("Failed to sign {} with PFX certificate: {}", file_name(binary), e);
                report.record_failed(binary, e);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_pfx_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SigningConfig {
            pfx_path: Some(dir.path().join("release.pfx")),
            ..Default::default()
        };

        let err = sign_with_pfx(&[dir.path().join("chrome.exe")], &config)
            .await
            .expect_err("pfx missing");
        assert!(err.is_missing_artifact());
    }

    #[tokio::test]
    async fn test_unset_pfx_path() {
        let err = sign_with_pfx(&[], &SigningConfig::default())
            .await
            .expect_err("no pfx");
        assert!(matches!(err, Error::MissingConfiguration(_)));
    }
}
