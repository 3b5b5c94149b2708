//! Command execution functions.
//!
//! Each command returns an exit code; failures are reported here with
//! recovery suggestions and mapped to exit code 1.

mod info;
mod package;
mod release;
mod sign;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use info::{execute_files_cfg, execute_target_cpu, execute_universal};
use package::execute_package;
use release::execute_release;
use sign::execute_sign;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    // Reported by main, which never runs quiet
    args.validate()?;

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Package => execute_package(&args, &config).await,
        Command::Sign { .. } => execute_sign(&args, &config).await,
        Command::Release { .. } => execute_release(&args, &config).await,
        Command::TargetCpu => execute_target_cpu(&args, &config),
        Command::FilesCfg => execute_files_cfg(&args, &config),
        Command::Universal => execute_universal(&args, &config),
    };

    match result {
        Ok(0) => {
            config.success_println(&format!(
                "Command '{}' completed successfully",
                args.command.name()
            ));
            Ok(0)
        }
        Ok(exit_code) => {
            config.error_println(&format!(
                "Command '{}' completed with failures",
                args.command.name()
            ));
            Ok(exit_code)
        }
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
