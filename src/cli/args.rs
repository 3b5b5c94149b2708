//! Command line argument parsing and validation.
//!
//! Build context flags are global so they can be given before or after the
//! subcommand. Values from `--config` are used for anything not passed on the
//! command line.

use crate::error::{CliError, Result};
use crate::packager::{Arch, BuildContext, BuildContextBuilder, ContextConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Windows release packager for the Nxtscape browser
#[derive(Parser, Debug)]
#[command(
    name = "nxtscape_packager",
    version,
    disable_version_flag = true,
    about = "Package and sign Windows releases of the Nxtscape browser",
    long_about = "Build mini_installer, package it as a versioned installer and zip, and sign
the Windows binaries with eSigner, a PFX file or the certificate store.

Usage:
  nxtscape_packager --chromium-src C:/src/chromium/src --out-dir out/Default_x64 \\
      --app-name Nxtscape --version 137.0.7151.69 package
  nxtscape_packager --config release.toml release --sign --certificate \"Nxtscape Inc\"

Signing credentials are read from the environment or a .env file."
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Chromium `src` directory
    #[arg(long, global = true, value_name = "DIR")]
    pub chromium_src: Option<PathBuf>,

    /// GN output directory relative to the source directory
    #[arg(long, global = true, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Target architecture (x64, x86, arm64); inferred from args.gn if omitted
    #[arg(long, global = true, value_name = "ARCH")]
    pub arch: Option<Arch>,

    /// Product name used as the file name prefix
    #[arg(long = "app-name", global = true, value_name = "NAME")]
    pub app_name: Option<String>,

    /// Version stamped into the installer and archive names
    #[arg(long = "version", global = true, value_name = "VERSION")]
    pub chromium_version: Option<String>,

    /// Version stamped into the installer name inside the archive
    #[arg(long, global = true, value_name = "VERSION")]
    pub nxtscape_version: Option<String>,

    /// Output directory for packages (default: dist/<version>)
    #[arg(long, global = true, value_name = "DIR")]
    pub dist_dir: Option<PathBuf>,

    /// Build command used to produce mini_installer
    #[arg(long, global = true, value_name = "PATH")]
    pub build_tool: Option<PathBuf>,

    /// TOML file with a [context] table
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress normal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show detailed output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build mini_installer if needed and create the installer and zip
    Package,

    /// Sign chrome.exe and mini_installer.exe
    Sign {
        /// Certificate name in the Windows certificate store
        #[arg(long, value_name = "NAME")]
        certificate: Option<String>,
    },

    /// Package, then optionally sign
    Release {
        /// Sign the binaries after packaging
        #[arg(long)]
        sign: bool,

        /// Certificate name in the Windows certificate store
        #[arg(long, value_name = "NAME", requires = "sign")]
        certificate: Option<String>,
    },

    /// Print the target CPU recorded in args.gn
    TargetCpu,

    /// Package from Chromium's FILES.cfg manifest (not implemented)
    FilesCfg,

    /// Universal multi-architecture package (no-op on Windows)
    Universal,
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Package => "package",
            Command::Sign { .. } => "sign",
            Command::Release { .. } => "release",
            Command::TargetCpu => "target-cpu",
            Command::FilesCfg => "files-cfg",
            Command::Universal => "universal",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    ///
    /// # Errors
    ///
    /// Returns `InvalidArguments` for an empty `--version` or an `--app-name`
    /// containing path separators.
    pub fn validate(&self) -> Result<()> {
        if let Some(version) = &self.chromium_version
            && version.trim().is_empty()
        {
            return Err(invalid("--version must not be empty".to_string()));
        }
        if let Some(name) = &self.app_name
            && name.contains(['/', '\\'])
        {
            return Err(invalid(format!(
                "--app-name '{}' must not contain path separators",
                name
            )));
        }
        Ok(())
    }

    /// Merges `--config` with the command line flags; flags win.
    pub fn context_config(&self) -> Result<ContextConfig> {
        let mut config = match &self.config {
            Some(path) => ContextConfig::load(path).map_err(|e| CliError::ConfigLoad {
                path: path.clone(),
                reason: e.to_string(),
            })?,
            None => ContextConfig::default(),
        };

        override_with(&mut config.chromium_src, &self.chromium_src);
        override_with(&mut config.out_dir, &self.out_dir);
        override_with(&mut config.architecture, &self.arch);
        override_with(&mut config.app_base_name, &self.app_name);
        override_with(&mut config.chromium_version, &self.chromium_version);
        override_with(&mut config.nxtscape_version, &self.nxtscape_version);
        override_with(&mut config.dist_dir, &self.dist_dir);
        override_with(&mut config.build_tool, &self.build_tool);
        Ok(config)
    }

    /// Resolves the build context for this invocation.
    ///
    /// # Errors
    ///
    /// Returns `MissingArgument` naming the first required value that was
    /// given neither on the command line nor in the config file.
    pub fn build_context(&self) -> Result<BuildContext> {
        let config = self.context_config()?;

        let missing = [
            ("chromium_src", config.chromium_src.is_none()),
            ("out_dir", config.out_dir.is_none()),
            ("app_name", config.app_base_name.is_none()),
            ("version", config.chromium_version.is_none()),
        ]
        .into_iter()
        .find_map(|(name, absent)| absent.then_some(name));

        if let Some(argument) = missing {
            return Err(CliError::MissingArgument {
                argument: argument.to_string(),
            }
            .into());
        }

        Ok(BuildContextBuilder::from_config(config).build()?)
    }
}

fn invalid(reason: String) -> crate::error::PackagerError {
    CliError::InvalidArguments { reason }.into()
}

fn override_with<T: Clone>(slot: &mut Option<T>, flag: &Option<T>) {
    if let Some(value) = flag {
        *slot = Some(value.clone());
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}
