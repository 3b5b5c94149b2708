//! Sign command implementation.
//!
//! Signs chrome.exe and mini_installer.exe with the backend selected from the
//! signing environment.

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::packager::{Context, SignOutcome, SigningConfig, sign_binaries};

/// Execute sign command
pub(super) async fn execute_sign(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Sign { certificate } = &args.command else {
        unreachable!("execute_sign called with non-Sign command");
    };

    let ctx = args.build_context()?;
    let signing = SigningConfig::from_env()?;

    config.section("Signing");
    let outcome = sign_binaries(&ctx, &signing, certificate.as_deref())
        .await
        .with_context(|| format!("signing binaries in {}", ctx.build_output_dir().display()))?;
    print_sign_outcome(&outcome, config);

    Ok(if outcome.is_success() { 0 } else { 1 })
}

/// Prints signed and failed binaries.
pub(super) fn print_sign_outcome(outcome: &SignOutcome, config: &RuntimeConfig) {
    let Some(report) = outcome.report() else {
        config.warning_println("No signing backend configured, binaries left unsigned");
        return;
    };

    config.verbose_println(&format!("Backend: {}", report.backend()));
    for binary in &report.signed {
        config.success_println(&format!("Signed {}", binary.display()));
    }
    for (binary, error) in &report.failed {
        config.error_println(&format!("Failed to sign {}: {}", binary.display(), error));
    }
}
