//! Code signing for Windows binaries.
//!
//! Signs `chrome.exe` and `mini_installer.exe` in the build output directory
//! through one of three backends:
//!
//! - **eSigner**: SSL.com cloud signing via `CodeSignTool`
//! - **PFX**: a local certificate file via `signtool /f`
//! - **Certificate store**: a named certificate via `signtool /n`
//!
//! The backend is chosen by [`SigningBackend::select`] from a
//! [`SigningConfig`]; with no backend configured signing is skipped.

pub mod config;
pub mod esigner;
pub mod pfx;
pub mod signtool;

pub use config::{DEFAULT_TIMESTAMP_URL, EsignerSettings, SigningConfig, SigningMethod};

use crate::packager::{
    context::{BROWSER_EXE, BuildContext, MINI_INSTALLER},
    error::{Error, Result},
};
use std::path::{Path, PathBuf};

/// Signing backend selected for a run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SigningBackend {
    /// SSL.com eSigner via CodeSignTool
    Esigner,
    /// signtool with a local PFX file
    Pfx,
    /// signtool with a named certificate from the Windows certificate store
    CertificateStore(String),
}

impl SigningBackend {
    /// Picks the backend for `config`.
    ///
    /// Precedence: eSigner (method `esigner` or a username is set), then a
    /// PFX path, then a certificate name. `None` means nothing is configured.
    pub fn select(config: &SigningConfig, certificate_name: Option<&str>) -> Option<Self> {
        if config.method == SigningMethod::Esigner || config.esigner.username.is_some() {
            return Some(SigningBackend::Esigner);
        }
        if config.pfx_path.is_some() {
            return Some(SigningBackend::Pfx);
        }
        certificate_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| SigningBackend::CertificateStore(name.to_string()))
    }

    /// Short backend name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            SigningBackend::Esigner => "esigner",
            SigningBackend::Pfx => "pfx",
            SigningBackend::CertificateStore(_) => "certificate-store",
        }
    }

    /// Signs every binary, attempting all of them.
    ///
    /// Backend preconditions (tool, credentials) fail the whole call;
    /// per-binary failures are collected in the report.
    pub async fn sign(&self, binaries: &[PathBuf], config: &SigningConfig) -> Result<SignReport> {
        match self {
            SigningBackend::Esigner => esigner::sign_with_esigner(binaries, &config.esigner).await,
            SigningBackend::Pfx => pfx::sign_with_pfx(binaries, config).await,
            SigningBackend::CertificateStore(name) => {
                signtool::sign_with_certificate_store(binaries, name, config).await
            }
        }
    }
}

/// Per-binary results of one signing run.
#[derive(Debug)]
pub struct SignReport {
    backend: &'static str,
    /// Binaries signed successfully
    pub signed: Vec<PathBuf>,
    /// Binaries that failed, with the reason
    pub failed: Vec<(PathBuf, Error)>,
}

impl SignReport {
    pub(crate) fn new(backend: &'static str) -> Self {
        Self {
            backend,
            signed: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub(crate) fn record_signed(&mut self, binary: &Path) {
        self.signed.push(binary.to_path_buf());
    }

    pub(crate) fn record_failed(&mut self, binary: &Path, error: Error) {
        self.failed.push((binary.to_path_buf(), error));
    }

    /// Backend that produced this report.
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Number of binaries the backend attempted.
    pub fn attempted(&self) -> usize {
        self.signed.len() + self.failed.len()
    }

    /// True when no binary failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of [`sign_binaries`].
#[derive(Debug)]
pub enum SignOutcome {
    /// No backend was configured; nothing was attempted.
    Skipped,
    /// A backend ran.
    Signed(SignReport),
}

impl SignOutcome {
    /// Skipping counts as success.
    pub fn is_success(&self) -> bool {
        match self {
            SignOutcome::Skipped => true,
            SignOutcome::Signed(report) => report.is_success(),
        }
    }

    /// The backend report, if a backend ran.
    pub fn report(&self) -> Option<&SignReport> {
        match self {
            SignOutcome::Skipped => None,
            SignOutcome::Signed(report) => Some(report),
        }
    }
}

/// Binaries considered for signing, in signing order.
pub fn candidate_binaries(ctx: &BuildContext) -> [PathBuf; 2] {
    let dir = ctx.build_output_dir();
    [dir.join(BROWSER_EXE), dir.join(MINI_INSTALLER)]
}

/// Candidates that exist on disk.
///
/// # Errors
///
/// Returns `NoBinariesToSign` if none exist.
pub fn existing_binaries(ctx: &BuildContext) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for binary in candidate_binaries(ctx) {
        if binary.exists() {
            log::info!("Found binary to sign: {}", signtool::file_name(&binary));
            found.push(binary);
        } else {
            log::warn!("Binary not found: {}", binary.display());
        }
    }

    if found.is_empty() {
        log::error!("No binaries found to sign");
        return Err(Error::NoBinariesToSign {
            dir: ctx.build_output_dir(),
        });
    }
    Ok(found)
}

/// Signs the Windows binaries of a build.
///
/// Returns [`SignOutcome::Skipped`] when no backend is configured and no
/// certificate name is given.
///
/// # Errors
///
/// * `NoBinariesToSign` - neither binary exists
/// * backend precondition errors, see [`SigningBackend::sign`]
pub async fn sign_binaries(
    ctx: &BuildContext,
    config: &SigningConfig,
    certificate_name: Option<&str>,
) -> Result<SignOutcome> {
    log::info!("🔏 Signing Windows binaries...");
    log::debug!("Signing configuration: {:?}", config);

    let binaries = existing_binaries(ctx)?;

    let Some(backend) = SigningBackend::select(config, certificate_name) else {
        log::warn!("No certificate specified, skipping signing");
        return Ok(SignOutcome::Skipped);
    };

    log::debug!("Selected signing backend: {}", backend.name());
    let report = backend.sign(&binaries, config).await?;

    if report.is_success() {
        log::info!("✓ Signed {} binaries", report.signed.len());
    } else {
        log::error!(
            "{} of {} binaries failed to sign",
            report.failed.len(),
            report.attempted()
        );
    }
    Ok(SignOutcome::Signed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::{Arch, BuildContextBuilder};

    fn context(root: &Path) -> BuildContext {
        BuildContextBuilder::new()
            .chromium_src(root)
            .out_dir("out/Default_x64")
            .architecture(Arch::X64)
            .app_base_name("Nxtscape")
            .chromium_version("1.2.3")
            .dist_dir(root.join("dist"))
            .build()
            .expect("context")
    }

    #[test]
    fn test_select_esigner_by_method() {
        let config = SigningConfig {
            method: SigningMethod::Esigner,
            pfx_path: Some("cert.pfx".into()),
            ..Default::default()
        };
        assert_eq!(
            SigningBackend::select(&config, Some("Cert")),
            Some(SigningBackend::Esigner)
        );
    }

    #[test]
    fn test_select_esigner_by_username() {
        let config = SigningConfig {
            esigner: EsignerSettings {
                username: Some("release@example.com".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            SigningBackend::select(&config, None),
            Some(SigningBackend::Esigner)
        );
    }

    #[test]
    fn test_esigner_username_overrides_signing_method() {
        for method in ["signtool", "azure"] {
            let config = SigningConfig::from_lookup(|name| match name {
                config::vars::SIGNING_METHOD => Some(method.to_string()),
                config::vars::ESIGNER_USERNAME => Some("release@example.com".to_string()),
                config::vars::PFX_PATH => Some("cert.pfx".to_string()),
                _ => None,
            })
            .expect("config");
            assert_eq!(config.method, SigningMethod::Signtool);
            assert_eq!(
                SigningBackend::select(&config, Some("Nxtscape Inc")),
                Some(SigningBackend::Esigner)
            );
        }
    }

    #[test]
    fn test_select_pfx_over_certificate() {
        let config = SigningConfig {
            pfx_path: Some("cert.pfx".into()),
            ..Default::default()
        };
        assert_eq!(
            SigningBackend::select(&config, Some("Cert")),
            Some(SigningBackend::Pfx)
        );
    }

    #[test]
    fn test_select_certificate_store_or_nothing() {
        let config = SigningConfig::default();
        assert_eq!(
            SigningBackend::select(&config, Some("Nxtscape Inc")),
            Some(SigningBackend::CertificateStore("Nxtscape Inc".into()))
        );
        assert_eq!(SigningBackend::select(&config, None), None);
        assert_eq!(SigningBackend::select(&config, Some("  ")), None);
    }

    #[tokio::test]
    async fn test_no_binaries_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(dir.path());
        let err = sign_binaries(&ctx, &SigningConfig::default(), Some("Cert"))
            .await
            .expect_err("nothing to sign");
        assert!(matches!(err, Error::NoBinariesToSign { .. }));
    }

    #[tokio::test]
    async fn test_skipped_without_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(dir.path());
        std::fs::create_dir_all(ctx.build_output_dir()).expect("mkdir");
        std::fs::write(ctx.browser_exe_path(), b"MZ").expect("write");

        let outcome = sign_binaries(&ctx, &SigningConfig::default(), None)
            .await
            .expect("skipped");
        assert!(matches!(outcome, SignOutcome::Skipped));
        assert!(outcome.is_success());
        assert!(outcome.report().is_none());
    }

    #[test]
    fn test_existing_binaries_partial() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(dir.path());
        std::fs::create_dir_all(ctx.build_output_dir()).expect("mkdir");
        std::fs::write(ctx.mini_installer_path(), b"MZ").expect("write");

        let found = existing_binaries(&ctx).expect("found");
        assert_eq!(found, vec![ctx.mini_installer_path()]);
    }

    #[test]
    fn test_report_success() {
        let mut report = SignReport::new("pfx");
        report.record_signed(Path::new("chrome.exe"));
        assert!(report.is_success());
        report.record_failed(Path::new("mini_installer.exe"), Error::InvalidOtp);
        assert!(!report.is_success());
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.backend(), "pfx");
    }
}
