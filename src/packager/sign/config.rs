//! Signing configuration.
//!
//! All signing inputs live in [`SigningConfig`]. The process environment is
//! read in exactly one place, [`SigningConfig::from_env`]; everything
//! downstream takes the struct, so tests never touch real environment
//! variables.

use crate::packager::error::Result;
use std::{fmt, path::PathBuf};

/// Default RFC 3161 timestamp server (SSL.com).
pub const DEFAULT_TIMESTAMP_URL: &str = "http://ts.ssl.com";

/// Environment variable names read by [`SigningConfig::from_env`].
pub mod vars {
    /// `esigner` selects the eSigner backend; anything else means signtool.
    pub const SIGNING_METHOD: &str = "SIGNING_METHOD";
    /// eSigner account user name. Its presence alone selects eSigner.
    pub const ESIGNER_USERNAME: &str = "ESIGNER_USERNAME";
    /// eSigner account password.
    pub const ESIGNER_PASSWORD: &str = "ESIGNER_PASSWORD";
    /// eSigner TOTP shared secret.
    pub const ESIGNER_TOTP_SECRET: &str = "ESIGNER_TOTP_SECRET";
    /// eSigner credential id (optional).
    pub const ESIGNER_CREDENTIAL_ID: &str = "ESIGNER_CREDENTIAL_ID";
    /// `true` to enter a one-time code interactively.
    pub const ESIGNER_USE_OTP: &str = "ESIGNER_USE_OTP";
    /// Path to `CodeSignTool.bat`.
    pub const CODESIGNTOOL_PATH: &str = "CODESIGNTOOL_PATH";
    /// Path to a PFX certificate. Selects the PFX backend.
    pub const PFX_PATH: &str = "PFX_PATH";
    /// Password of the PFX certificate (optional).
    pub const PFX_PASSWORD: &str = "PFX_PASSWORD";
    /// Path to `signtool.exe`, bypassing discovery.
    pub const SIGNTOOL_PATH: &str = "SIGNTOOL_PATH";
    /// Timestamp server override.
    pub const SIGNING_TIMESTAMP_URL: &str = "SIGNING_TIMESTAMP_URL";
}

/// Requested signing method.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SigningMethod {
    /// signtool, with a PFX file or the certificate store
    #[default]
    Signtool,
    /// SSL.com eSigner via CodeSignTool
    Esigner,
}

impl SigningMethod {
    /// Parses `SIGNING_METHOD`; case-insensitive, unknown values mean signtool.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "esigner" => SigningMethod::Esigner,
            "signtool" | "" => SigningMethod::Signtool,
            other => {
                log::debug!("Unknown SIGNING_METHOD '{}', using signtool", other);
                SigningMethod::Signtool
            }
        }
    }
}

/// SSL.com eSigner account settings.
#[derive(Clone, Default)]
pub struct EsignerSettings {
    /// Account user name (email)
    pub username: Option<String>,
    /// Account password
    pub password: Option<String>,
    /// TOTP shared secret
    pub totp_secret: Option<String>,
    /// Credential id, when the account holds several certificates
    pub credential_id: Option<String>,
    /// Prompt for a one-time code instead of using the TOTP secret
    pub use_otp: bool,
    /// Explicit CodeSignTool location
    pub codesigntool_path: Option<PathBuf>,
}

/// Complete signing configuration.
#[derive(Clone)]
pub struct SigningConfig {
    /// Requested method
    pub method: SigningMethod,
    /// eSigner settings
    pub esigner: EsignerSettings,
    /// PFX certificate path
    pub pfx_path: Option<PathBuf>,
    /// PFX certificate password
    pub pfx_password: Option<String>,
    /// Explicit signtool location
    pub signtool_path: Option<PathBuf>,
    /// Timestamp server URL
    pub timestamp_url: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            method: SigningMethod::default(),
            esigner: EsignerSettings::default(),
            pfx_path: None,
            pfx_password: None,
            signtool_path: None,
            timestamp_url: DEFAULT_TIMESTAMP_URL.to_string(),
        }
    }
}

impl SigningConfig {
    /// Reads the signing configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `UrlParse` if `SIGNING_TIMESTAMP_URL` is not a valid URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timestamp_url = match get(vars::SIGNING_TIMESTAMP_URL) {
            Some(raw) => url::Url::parse(raw.trim())?.to_string(),
            None => DEFAULT_TIMESTAMP_URL.to_string(),
        };

        Ok(Self {
            method: get(vars::SIGNING_METHOD)
                .map(|m| SigningMethod::parse(&m))
                .unwrap_or_default(),
            esigner: EsignerSettings {
                username: get(vars::ESIGNER_USERNAME),
                password: get(vars::ESIGNER_PASSWORD),
                totp_secret: get(vars::ESIGNER_TOTP_SECRET),
                credential_id: get(vars::ESIGNER_CREDENTIAL_ID),
                use_otp: get(vars::ESIGNER_USE_OTP)
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
                codesigntool_path: get(vars::CODESIGNTOOL_PATH).map(PathBuf::from),
            },
            pfx_path: get(vars::PFX_PATH).map(PathBuf::from),
            pfx_password: get(vars::PFX_PASSWORD),
            signtool_path: get(vars::SIGNTOOL_PATH).map(PathBuf::from),
            timestamp_url,
        })
    }
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() { "<set>" } else { "<unset>" }
}

impl fmt::Debug for EsignerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EsignerSettings")
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("totp_secret", &redact(&self.totp_secret))
            .field("credential_id", &self.credential_id)
            .field("use_otp", &self.use_otp)
            .field("codesigntool_path", &self.codesigntool_path)
            .finish()
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("method", &self.method)
            .field("esigner", &self.esigner)
            .field("pfx_path", &self.pfx_path)
            .field("pfx_password", &redact(&self.pfx_password))
            .field("signtool_path", &self.signtool_path)
            .field("timestamp_url", &self.timestamp_url)
            .finish()
    }
}
