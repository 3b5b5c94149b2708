//! External process execution.
//!
//! Every tool the packager drives (build command, signtool, CodeSignTool) is
//! run through [`run_command`], which turns spawn errors and non-zero exits
//! into [`Error`] values instead of panicking.

use crate::packager::error::{Error, Result};
use tokio::process::Command;

/// Renders a command as `program arg arg ...` for log and error messages.
///
/// Do not use this for commands carrying credentials; pass a redacted label
/// to [`run_command`] instead.
pub fn describe(command: &Command) -> String {
    let std_command = command.as_std();
    std::iter::once(std_command.get_program())
        .chain(std_command.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs a command to completion with inherited stdio.
///
/// `label` identifies the command in logs and errors.
///
/// # Errors
///
/// * `CommandFailed` - the process could not be spawned
/// * `CommandStatus` - the process exited unsuccessfully
pub async fn run_command(command: &mut Command, label: &str) -> Result<()> {
    log::debug!("Running: {}", label);

    let status = command.status().await.map_err(|error| Error::CommandFailed {
        command: label.to_string(),
        error,
    })?;

    if !status.success() {
        return Err(Error::CommandStatus {
            command: label.to_string(),
            code: status.code(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let mut command = Command::new("signtool.exe");
        command.args(["verify", "/pa", "chrome.exe"]);
        assert_eq!(describe(&command), "signtool.exe verify /pa chrome.exe");
    }

    #[tokio::test]
    async fn test_missing_program_is_command_failed() {
        let mut command = Command::new("definitely-not-a-real-build-tool-4821");
        let err = run_command(&mut command, "definitely-not-a-real-build-tool-4821")
            .await
            .expect_err("spawn must fail");
        assert!(matches!(err, Error::CommandFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_command_status() {
        let mut command = Command::new("sh");
        command.args(["-c", "exit 3"]);
        let err = run_command(&mut command, "sh -c exit 3")
            .await
            .expect_err("exit 3 must fail");
        assert!(matches!(err, Error::CommandStatus { code: Some(3), .. }));
    }
}
