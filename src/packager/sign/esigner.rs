//! SSL.com eSigner backend.
//!
//! Drives `CodeSignTool` with account credentials and a TOTP secret. The
//! tool signs in place (`-override`) and the timestamp server is configured
//! on the SSL.com side.

use super::{SignReport, config::EsignerSettings, signtool::file_name};
use crate::packager::{
    error::{Error, Result},
    utils::process::run_command,
};
use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};
use tokio::process::Command;

/// Install location used on the release build machines.
pub const DEFAULT_CODESIGNTOOL_PATH: &str =
    "C:/src/BrowserOS/CodeSignTool-v1.3.2-windows/CodeSignTool.bat";

/// Fallback looked up relative to the working directory.
pub const LOCAL_CODESIGNTOOL_PATH: &str = "CodeSignTool.bat";

const OTP_LEN: usize = 6;

/// Credentials resolved for a signing run.
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
    totp_secret: &'a str,
    credential_id: Option<&'a str>,
}

/// Locates CodeSignTool.
///
/// An explicit path is used as given; otherwise the release machine
/// location, then `CodeSignTool.bat` in the working directory.
pub fn locate_codesigntool(settings: &EsignerSettings) -> Result<PathBuf> {
    let candidate = match &settings.codesigntool_path {
        Some(path) => {
            log::info!("Using CodeSignTool from env: {}", path.display());
            path.clone()
        }
        None => {
            let default = PathBuf::from(DEFAULT_CODESIGNTOOL_PATH);
            if default.exists() {
                default
            } else {
                PathBuf::from(LOCAL_CODESIGNTOOL_PATH)
            }
        }
    };

    if !candidate.exists() {
        log::error!("CodeSignTool.bat not found at: {}", candidate.display());
        return Err(Error::ToolNotFound {
            tool: "CodeSignTool.bat".into(),
            hint: format!(
                "not found at {}; set CODESIGNTOOL_PATH in .env file or download from SSL.com",
                candidate.display()
            ),
        });
    }
    Ok(candidate)
}

/// Checks that `code` is exactly six ASCII digits.
pub fn validate_otp(code: &str) -> Result<()> {
    if code.len() == OTP_LEN && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::InvalidOtp)
    }
}

/// Reads one line from `reader` and validates it as a one-time code.
pub fn read_otp_code<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let code = line.trim_end_matches(['\r', '\n']).to_string();
    validate_otp(&code)?;
    Ok(code)
}

async fn prompt_otp_code() -> Result<String> {
    tokio::task::spawn_blocking(|| {
        let mut stderr = io::stderr();
        write!(stderr, "Enter your 6-digit OTP code from authenticator app: ")?;
        stderr.flush()?;
        read_otp_code(io::stdin().lock())
    })
    .await
    .map_err(|e| Error::GenericError(format!("OTP prompt task panicked: {}", e)))?
}

fn resolve_credentials(settings: &EsignerSettings) -> Result<Credentials<'_>> {
    let Some(totp_secret) = settings.totp_secret.as_deref() else {
        log::error!("Missing ESIGNER_TOTP_SECRET environment variable");
        return Err(Error::MissingConfiguration(
            "ESIGNER_TOTP_SECRET is not set; either set it or set ESIGNER_USE_OTP=true \
             to enter an OTP code manually"
                .into(),
        ));
    };

    match (settings.username.as_deref(), settings.password.as_deref()) {
        (Some(username), Some(password)) => Ok(Credentials {
            username,
            password,
            totp_secret,
            credential_id: settings.credential_id.as_deref(),
        }),
        _ => {
            log::error!("Missing required eSigner environment variables");
            Err(Error::MissingConfiguration(
                "eSigner requires ESIGNER_USERNAME=your-email, ESIGNER_PASSWORD=your-password, \
                 ESIGNER_TOTP_SECRET=your-totp-secret (or ESIGNER_USE_OTP=true) and optionally \
                 ESIGNER_CREDENTIAL_ID=your-credential-id"
                    .into(),
            ))
        }
    }
}

fn codesigntool_command(tool: &Path, credentials: &Credentials<'_>, binary: &Path) -> Command {
    let output_dir = binary.parent().unwrap_or_else(|| Path::new("."));

    let mut command = Command::new(tool);
    command
        .arg("sign")
        .args(["-username", credentials.username])
        .args(["-password", credentials.password])
        .arg("-input_file_path")
        .arg(binary)
        .arg("-output_dir_path")
        .arg(output_dir)
        .arg("-override")
        .args(["-totp_secret", credentials.totp_secret]);
    if let Some(id) = credentials.credential_id {
        command.args(["-credential_id", id]);
    }
    command
}

fn redacted_label(tool: &Path, credentials: &Credentials<'_>, binary: &Path) -> String {
    let output_dir = binary.parent().unwrap_or_else(|| Path::new("."));
    let mut label = format!(
        "{} sign -username {} -password *** -input_file_path {} -output_dir_path {} \
         -override -totp_secret ***",
        tool.display(),
        credentials.username,
        binary.display(),
        output_dir.display()
    );
    if let Some(id) = credentials.credential_id {
        label.push_str(" -credential_id ");
        label.push_str(id);
    }
    label
}

/// Signs binaries with CodeSignTool.
///
/// Preconditions are checked in order: tool present, OTP mode, TOTP
/// secret, username and password. Interactive OTP codes cannot be passed to
/// CodeSignTool, so OTP mode validates the entered code and then fails.
///
/// # Errors
///
/// * `ToolNotFound` - CodeSignTool is missing
/// * `InvalidOtp` - the entered code is not six digits
/// * `MissingConfiguration` - OTP mode, or credentials are absent
pub async fn sign_with_esigner(
    binaries: &[PathBuf],
    settings: &EsignerSettings,
) -> Result<SignReport> {
    log::info!("Using SSL.com CodeSignTool for signing...");

    let tool = locate_codesigntool(settings)?;

    if settings.use_otp {
        let _code = prompt_otp_code().await.inspect_err(|_| {
            log::error!("Invalid OTP code. Must be 6 digits.");
        })?;
        log::warn!("Note: CodeSignTool requires TOTP secret, not OTP code");
        return Err(Error::MissingConfiguration(
            "CodeSignTool cannot use an interactive OTP code; set ESIGNER_TOTP_SECRET \
             (found in the SSL.com dashboard under eSigner settings)"
                .into(),
        ));
    }

    let credentials = resolve_credentials(settings)?;

    let mut report = SignReport::new("esigner");
    for binary in binaries {
        let name = file_name(binary);
        log::info!("Signing {} with CodeSignTool...", name);

        let mut command = codesigntool_command(&tool, &credentials, binary);
        let label = redacted_label(&tool, &credentials, binary);
        match run_command(&mut command, &label).await {
            Ok(()) => {
                log::info!("✓ {} signed successfully with CodeSignTool", name);
                report.record_signed(binary);
            }
            Err(e) => {
                log::error!("Failed to sign {} with CodeSignTool: {}", name, e);
                report.record_failed(binary, e);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn settings() -> EsignerSettings {
        EsignerSettings {
            username: Some("release@example.com".into()),
            password: Some("hunter2".into()),
            totp_secret: Some("JBSWY3DPEHPK3PXP".into()),
            ..Default::default()
        }
    }

    fn args(command: &Command) -> Vec<String> {
        command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_validate_otp() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("1234567").is_err());
        assert!(validate_otp("12a456").is_err());
        assert!(validate_otp("").is_err());
    }

    #[test]
    fn test_read_otp_code_strips_newline() {
        assert_eq!(read_otp_code(Cursor::new("042517\r\n")).expect("otp"), "042517");
        assert!(matches!(
            read_otp_code(Cursor::new(" 42517\n")),
            Err(Error::InvalidOtp)
        ));
    }

    #[test]
    fn test_command_line() {
        let settings = EsignerSettings {
            credential_id: Some("cred-1".into()),
            ..settings()
        };
        let credentials = resolve_credentials(&settings).expect("credentials");
        let binary = Path::new("out/Default_x64/chrome.exe");
        let command = codesigntool_command(Path::new("CodeSignTool.bat"), &credentials, binary);

        assert_eq!(
            args(&command),
            [
                "sign",
                "-username",
                "release@example.com",
                "-password",
                "hunter2",
                "-input_file_path",
                "out/Default_x64/chrome.exe",
                "-output_dir_path",
                "out/Default_x64",
                "-override",
                "-totp_secret",
                "JBSWY3DPEHPK3PXP",
                "-credential_id",
                "cred-1",
            ]
        );
    }

    #[test]
    fn test_label_hides_secrets() {
        let settings = EsignerSettings {
            credential_id: Some("cred-1".into()),
            ..settings()
        };
        let credentials = resolve_credentials(&settings).expect("credentials");
        let label = redacted_label(
            Path::new("CodeSignTool.bat"),
            &credentials,
            Path::new("out/Default_x64/chrome.exe"),
        );
        assert_eq!(
            label,
            "CodeSignTool.bat sign -username release@example.com -password *** \
             -input_file_path out/Default_x64/chrome.exe -output_dir_path out/Default_x64 \
             -override -totp_secret *** -credential_id cred-1"
        );
        assert!(label.contains("release@example.com"));
        assert!(!label.contains("hunter2"));
        assert!(!label.contains("JBSWY3DPEHPK3PXP"));
    }

    #[test]
    fn test_totp_secret_checked_before_account() {
        let settings = EsignerSettings::default();
        let err = resolve_credentials(&settings).err().expect("missing");
        assert!(err.to_string().contains("ESIGNER_TOTP_SECRET"));

        let settings = EsignerSettings {
            password: None,
            ..settings_with_totp()
        };
        let err = resolve_credentials(&settings).err().expect("missing");
        assert!(err.to_string().contains("ESIGNER_PASSWORD"));
    }

    fn settings_with_totp() -> EsignerSettings {
        EsignerSettings {
            totp_secret: Some("secret".into()),
            username: Some("user".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_explicit_tool() {
        let settings = EsignerSettings {
            codesigntool_path: Some(PathBuf::from("/nowhere/CodeSignTool.bat")),
            ..settings()
        };
        assert!(matches!(
            locate_codesigntool(&settings),
            Err(Error::ToolNotFound { .. })
        ));
    }
}
