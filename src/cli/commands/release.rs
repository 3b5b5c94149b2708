//! Release command implementation.
//!
//! Runs packaging and, with `--sign`, signing in one invocation.

use super::{package::print_package_report, sign::print_sign_outcome};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::packager::{self, SigningConfig};

/// Execute release command
pub(super) async fn execute_release(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Release { sign, certificate } = &args.command else {
        unreachable!("execute_release called with non-Release command");
    };

    let ctx = args.build_context()?;
    let signing = if *sign {
        Some(SigningConfig::from_env()?)
    } else {
        None
    };

    config.section(&format!(
        "Release {} {} ({})",
        ctx.app_base_name(),
        ctx.chromium_version(),
        ctx.architecture()
    ));

    let report = packager::release(&ctx, signing.as_ref(), certificate.as_deref()).await?;

    print_package_report(&report.package, config);
    match &report.signing {
        Some(outcome) => print_sign_outcome(outcome, config),
        None if *sign => config.warning_println("Signing skipped because packaging failed"),
        None => config.verbose_println("Signing not requested"),
    }

    Ok(if report.is_success() { 0 } else { 1 })
}
