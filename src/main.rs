//! Nxtscape Packager - Windows release packaging and code signing.
//!
//! This binary builds, packages and signs the Windows installer of the
//! Nxtscape browser.

use nxtscape_packager::cli;
use nxtscape_packager::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Signing credentials usually live in .env next to the build scripts;
    // variables already set in the environment take precedence
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
    }

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Create output manager for error display (never quiet for fatal errors)
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}
