//! Package command implementation.
//!
//! Builds mini_installer if needed, then writes the versioned installer and
//! its zip archive into the distribution directory.

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::packager::{self, PackageReport};

/// Execute package command
pub(super) async fn execute_package(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let ctx = args.build_context()?;

    config.section("Packaging");
    config.verbose_println(&format!("Build output: {}", ctx.build_output_dir().display()));
    config.verbose_println(&format!("Distribution: {}", ctx.dist_dir().display()));

    let report = packager::package(&ctx).await?;
    print_package_report(&report, config);

    Ok(if report.is_success() { 0 } else { 1 })
}

/// Prints produced artifacts and failed operations.
pub(super) fn print_package_report(report: &PackageReport, config: &RuntimeConfig) {
    for artifact in report.artifacts() {
        let _ = config.output().artifact(artifact);
    }
    for error in report.errors() {
        config.error_println(&format!("Packaging step failed: {}", error));
    }
}
