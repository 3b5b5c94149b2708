//! Auxiliary commands: target-cpu, files-cfg and universal.

use crate::cli::{Args, RuntimeConfig};
use crate::error::{CliError, Result};
use crate::packager::{self, Arch, Context};

/// Print the target CPU from args.gn.
///
/// Writes the bare architecture to stdout even in quiet mode so scripts can
/// capture it.
pub(super) fn execute_target_cpu(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let context = args.context_config()?;
    let chromium_src = context.chromium_src.ok_or_else(|| missing("chromium_src"))?;
    let out_dir = context.out_dir.ok_or_else(|| missing("out_dir"))?;

    let build_output_dir = chromium_src.join(out_dir);
    config.verbose_println(&format!("Reading {}", build_output_dir.join("args.gn").display()));
    println!("{}", Arch::from_args_gn(&build_output_dir));
    Ok(0)
}

fn missing(argument: &str) -> CliError {
    CliError::MissingArgument {
        argument: argument.to_string(),
    }
}

/// Package from FILES.cfg.
pub(super) fn execute_files_cfg(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let ctx = args.build_context()?;
    config.verbose_println(&format!("Manifest: {}", ctx.files_cfg_path().display()));

    let artifact =
        packager::create_files_cfg_package(&ctx).context("packaging from FILES.cfg")?;
    let _ = config.output().artifact(&artifact);
    Ok(0)
}

/// Universal package: reports success without producing anything.
pub(super) fn execute_universal(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let contexts: Vec<_> = match args.build_context() {
        Ok(ctx) => vec![ctx],
        Err(e) => {
            config.verbose_println(&format!("No build context: {}", e));
            Vec::new()
        }
    };

    packager::package_universal(&contexts)?;
    config.warning_println("Universal binaries are not supported on Windows");
    config.println("Create a separate package for each architecture instead");
    Ok(0)
}
