//! Target CPU architecture types and utilities.

use crate::packager::error::{Error, Result};
use std::{fmt, path::Path, str::FromStr};

/// CPU architecture of a Windows browser build.
///
/// The architecture is stamped into every output file name, e.g.
/// `Nxtscape_1.2.3_x64_installer.exe`.
///
/// # Examples
///
/// ```no_run
/// use nxtscape_packager::packager::Arch;
///
/// let arch: Arch = "arm64".parse()?;
/// assert_eq!(arch.to_string(), "arm64");
/// # Ok::<(), nxtscape_packager::packager::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit)
    #[default]
    X64,
    /// x86 (32-bit)
    X86,
    /// ARM64 (64-bit)
    Arm64,
}

impl Arch {
    /// All architectures in the order they are probed in `args.gn`.
    pub const ALL: [Arch; 3] = [Arch::X64, Arch::X86, Arch::Arm64];

    /// Returns the GN `target_cpu` spelling of this architecture.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::X86 => "x86",
            Arch::Arm64 => "arm64",
        }
    }

    /// Infers the target architecture from the build directory's `args.gn`.
    ///
    /// Returns the first of `x64`, `x86`, `arm64` whose `target_cpu="<cpu>"`
    /// literal appears in the file. Falls back to [`Arch::X64`] when the file
    /// is absent, unreadable, or names none of them.
    pub fn from_args_gn(build_output_dir: &Path) -> Arch {
        let args_gn_path = build_output_dir.join("args.gn");

        let contents = match std::fs::read_to_string(&args_gn_path) {
            Ok(contents) => contents,
            Err(e) => {
                log::debug!(
                    "Could not read {} ({}), assuming x64",
                    args_gn_path.display(),
                    e
                );
                return Arch::default();
            }
        };

        Self::ALL
            .into_iter()
            .find(|cpu| contents.contains(&format!("target_cpu=\"{}\"", cpu.as_str())))
            .unwrap_or_default()
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Ok(Arch::X64),
            "x86" | "i686" => Ok(Arch::X86),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            other => Err(Error::ArchError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("x64".parse::<Arch>().ok(), Some(Arch::X64));
        assert_eq!("AMD64".parse::<Arch>().ok(), Some(Arch::X64));
        assert_eq!("x86".parse::<Arch>().ok(), Some(Arch::X86));
        assert_eq!("aarch64".parse::<Arch>().ok(), Some(Arch::Arm64));
        assert!("mips".parse::<Arch>().is_err());
    }

    #[test]
    fn test_args_gn_missing_defaults_to_x64() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(Arch::from_args_gn(dir.path()), Arch::X64);
    }

    #[test]
    fn test_args_gn_target_cpu() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("args.gn"),
            "is_debug=false\ntarget_cpu=\"arm64\"\nis_official_build=true\n",
        )
        .expect("write args.gn");
        assert_eq!(Arch::from_args_gn(dir.path()), Arch::Arm64);
    }

    #[test]
    fn test_args_gn_spaced_assignment_is_not_matched() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("args.gn"), "target_cpu = \"x86\"\n")
            .expect("write args.gn");
        assert_eq!(Arch::from_args_gn(dir.path()), Arch::X64);
    }
}
