//! Build context: the immutable description of one release build.
//!
//! A [`BuildContext`] names the Chromium source tree, the GN output
//! directory, the target architecture and the version strings stamped into
//! output names. It is constructed once via [`BuildContextBuilder`] (optionally
//! seeded from a TOML file) and only read afterwards.

use super::Arch;
use crate::packager::error::{Error, ErrorExt, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// File name of the installer target produced by the build.
pub const MINI_INSTALLER: &str = "mini_installer.exe";

/// Ninja target that produces [`MINI_INSTALLER`].
pub const MINI_INSTALLER_TARGET: &str = "mini_installer";

/// File name of the main browser executable.
pub const BROWSER_EXE: &str = "chrome.exe";

/// Default build command for the current host.
pub fn default_build_tool() -> &'static str {
    if cfg!(windows) {
        "autoninja.bat"
    } else {
        "autoninja"
    }
}

/// Immutable configuration for one packaging run.
///
/// # Examples
///
/// ```no_run
/// use nxtscape_packager::packager::{Arch, BuildContextBuilder};
///
/// # fn example() -> nxtscape_packager::packager::Result<()> {
/// let ctx = BuildContextBuilder::new()
///     .chromium_src("C:/src/chromium/src")
///     .out_dir("out/Default_x64")
///     .architecture(Arch::X64)
///     .app_base_name("Nxtscape")
///     .chromium_version("1.2.3")
///     .build()?;
///
/// assert_eq!(ctx.installer_name(), "Nxtscape_1.2.3_x64_installer.exe");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BuildContext {
    /// Absolute path to the Chromium `src` directory.
    chromium_src: PathBuf,

    /// GN output directory relative to `chromium_src` (e.g. `out/Default_x64`).
    out_dir: PathBuf,

    /// Target architecture.
    architecture: Arch,

    /// Product name used as the file name prefix.
    app_base_name: String,

    /// Version stamped into the outer package file names.
    chromium_version: String,

    /// Version stamped into the installer entry inside the zip archive.
    nxtscape_version: String,

    /// Absolute distribution directory receiving the packages.
    dist_dir: PathBuf,

    /// Command used to build the installer target.
    build_tool: PathBuf,
}

impl BuildContext {
    /// Returns the Chromium source directory.
    pub fn chromium_src(&self) -> &Path {
        &self.chromium_src
    }

    /// Returns the GN output directory, relative to the source directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Returns the target architecture.
    pub fn architecture(&self) -> Arch {
        self.architecture
    }

    /// Returns the application base name.
    pub fn app_base_name(&self) -> &str {
        &self.app_base_name
    }

    /// Returns the version used for outer package names.
    pub fn chromium_version(&self) -> &str {
        &self.chromium_version
    }

    /// Returns the version used for the zip entry name.
    pub fn nxtscape_version(&self) -> &str {
        &self.nxtscape_version
    }

    /// Returns the distribution directory.
    pub fn dist_dir(&self) -> &Path {
        &self.dist_dir
    }

    /// Returns the build command.
    pub fn build_tool(&self) -> &Path {
        &self.build_tool
    }

    /// Absolute build output directory (`chromium_src/out_dir`).
    pub fn build_output_dir(&self) -> PathBuf {
        self.chromium_src.join(&self.out_dir)
    }

    /// Path of the built installer.
    pub fn mini_installer_path(&self) -> PathBuf {
        self.build_output_dir().join(MINI_INSTALLER)
    }

    /// Path of the built browser executable.
    pub fn browser_exe_path(&self) -> PathBuf {
        self.build_output_dir().join(BROWSER_EXE)
    }

    /// Path of Chromium's Windows packaging manifest.
    pub fn files_cfg_path(&self) -> PathBuf {
        self.chromium_src
            .join("chrome")
            .join("tools")
            .join("build")
            .join("win")
            .join("FILES.cfg")
    }

    /// `{app}_{chromium_version}_{arch}_installer.exe`
    pub fn installer_name(&self) -> String {
        format!(
            "{}_{}_{}_installer.exe",
            self.app_base_name, self.chromium_version, self.architecture
        )
    }

    /// `{app}_{chromium_version}_{arch}_installer.zip`
    pub fn archive_name(&self) -> String {
        format!(
            "{}_{}_{}_installer.zip",
            self.app_base_name, self.chromium_version, self.architecture
        )
    }

    /// Name of the installer inside the zip archive.
    ///
    /// Uses `nxtscape_version` rather than `chromium_version`; the two may
    /// differ.
    pub fn archive_entry_name(&self) -> String {
        format!(
            "{}_{}_{}_installer.exe",
            self.app_base_name, self.nxtscape_version, self.architecture
        )
    }

    /// Command line hint for building the installer by hand.
    pub fn build_hint(&self) -> String {
        format!(
            "To build the installer, run: {} -C {} {}",
            default_build_tool(),
            self.out_dir.display(),
            MINI_INSTALLER_TARGET
        )
    }
}

/// `[context]` table of a packaging config file.
///
/// ```toml
/// [context]
/// chromium_src = "C:/src/chromium/src"
/// out_dir = "out/Default_x64"
/// architecture = "x64"
/// app_base_name = "Nxtscape"
/// chromium_version = "137.0.7151.69"
/// nxtscape_version = "0.9.0"
/// dist_dir = "dist/137.0.7151.69"
/// ```
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Chromium `src` directory
    pub chromium_src: Option<PathBuf>,
    /// GN output directory relative to `chromium_src`
    pub out_dir: Option<PathBuf>,
    /// Target architecture
    pub architecture: Option<Arch>,
    /// Product name prefix
    pub app_base_name: Option<String>,
    /// Outer package version
    pub chromium_version: Option<String>,
    /// Zip entry version
    pub nxtscape_version: Option<String>,
    /// Distribution directory
    pub dist_dir: Option<PathBuf>,
    /// Build command override
    pub build_tool: Option<PathBuf>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ConfigFile {
    #[serde(default)]
    context: ContextConfig,
}

impl ContextConfig {
    /// Loads the `[context]` table from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).fs_context("reading config file", path)?;
        Self::parse(&contents)
    }

    /// Parses the `[context]` table from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.context)
    }
}

/// Builder for [`BuildContext`].
#[derive(Clone, Debug, Default)]
pub struct BuildContextBuilder {
    config: ContextConfig,
}

impl BuildContextBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Seeds the builder from a config file table.
    pub fn from_config(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Sets the Chromium source directory. Required.
    pub fn chromium_src<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.chromium_src = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the GN output directory relative to the source directory. Required.
    pub fn out_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.out_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the target architecture.
    ///
    /// Default: inferred from `args.gn` in the build output directory.
    pub fn architecture(mut self, arch: Arch) -> Self {
        self.config.architecture = Some(arch);
        self
    }

    /// Sets the product name prefix. Required.
    pub fn app_base_name(mut self, name: impl Into<String>) -> Self {
        self.config.app_base_name = Some(name.into());
        self
    }

    /// Sets the outer package version. Required.
    pub fn chromium_version(mut self, version: impl Into<String>) -> Self {
        self.config.chromium_version = Some(version.into());
        self
    }

    /// Sets the zip entry version.
    ///
    /// Default: same as the chromium version.
    pub fn nxtscape_version(mut self, version: impl Into<String>) -> Self {
        self.config.nxtscape_version = Some(version.into());
        self
    }

    /// Sets the distribution directory.
    ///
    /// Default: `dist/<chromium_version>` under the current directory.
    pub fn dist_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.dist_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the build command.
    ///
    /// Default: `autoninja.bat` on Windows, `autoninja` elsewhere.
    pub fn build_tool<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.build_tool = Some(path.as_ref().to_path_buf());
        self
    }

    /// Builds the context.
    ///
    /// Relative `chromium_src` and `dist_dir` are resolved against the current
    /// directory here, so later working-directory changes do not move them.
    /// The same holds for a `build_tool` given as a path; a bare command name
    /// is left for `PATH` lookup.
    ///
    /// # Errors
    ///
    /// Returns `MissingConfiguration` if `chromium_src`, `out_dir`,
    /// `app_base_name` or `chromium_version` is unset or empty.
    pub fn build(self) -> Result<BuildContext> {
        let ContextConfig {
            chromium_src,
            out_dir,
            architecture,
            app_base_name,
            chromium_version,
            nxtscape_version,
            dist_dir,
            build_tool,
        } = self.config;

        let chromium_src = absolutize(&required_path(chromium_src, "chromium_src")?)?;
        let out_dir = required_path(out_dir, "out_dir")?;
        let app_base_name = required(app_base_name, "app_base_name")?;
        let chromium_version = required(chromium_version, "chromium_version")?;
        let nxtscape_version = nxtscape_version
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| chromium_version.clone());

        let architecture = match architecture {
            Some(arch) => arch,
            None => {
                let arch = Arch::from_args_gn(&chromium_src.join(&out_dir));
                log::debug!("Inferred target architecture {} from args.gn", arch);
                arch
            }
        };

        let dist_dir = match dist_dir {
            Some(dir) => absolutize(&dir)?,
            None => absolutize(&Path::new("dist").join(&chromium_version))?,
        };

        let build_tool = match build_tool {
            Some(tool) if tool.components().count() > 1 => absolutize(&tool)?,
            Some(tool) => tool,
            None => PathBuf::from(default_build_tool()),
        };

        Ok(BuildContext {
            chromium_src,
            out_dir,
            architecture,
            app_base_name,
            chromium_version,
            nxtscape_version,
            dist_dir,
            build_tool,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::MissingConfiguration(format!("{name} is required")))
}

fn required_path(value: Option<PathBuf>, name: &str) -> Result<PathBuf> {
    value
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| Error::MissingConfiguration(format!("{name} is required")))
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .fs_context("resolving path", path)?
        .into_owned())
}
