//! Command line tests for the nxtscape_packager binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn packager(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nxtscape_packager").expect("binary");
    // Keep signing variables and .env files of the host out of the tests
    cmd.env_clear().current_dir(workdir);
    cmd
}

fn context_args(root: &Path) -> Vec<String> {
    vec![
        "--chromium-src".into(),
        root.join("src").display().to_string(),
        "--out-dir".into(),
        "out/Default_x64".into(),
        "--app-name".into(),
        "Nxtscape".into(),
        "--version".into(),
        "1.2.3".into(),
        "--dist-dir".into(),
        root.join("dist").display().to_string(),
    ]
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().expect("tempdir");
    packager(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("package"))
        .stdout(predicate::str::contains("sign"))
        .stdout(predicate::str::contains("target-cpu"));
}

#[test]
fn target_cpu_reads_args_gn() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("src").join("out").join("Default_arm64");
    std::fs::create_dir_all(&out).expect("mkdir");
    std::fs::write(out.join("args.gn"), "is_debug = false\ntarget_cpu=\"arm64\"\n").expect("write");

    packager(dir.path())
        .args(["--quiet", "--chromium-src", "src", "--out-dir", "out/Default_arm64"])
        .arg("target-cpu")
        .assert()
        .success()
        .stdout("arm64\n");
}

#[test]
fn target_cpu_defaults_to_x64() {
    let dir = tempfile::tempdir().expect("tempdir");
    packager(dir.path())
        .args(["-q", "target-cpu", "--chromium-src", "src", "--out-dir", "out/Missing"])
        .assert()
        .success()
        .stdout("x64\n");
}

#[test]
fn package_without_context_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    packager(dir.path())
        .arg("package")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required argument: chromium_src"));
}

#[test]
fn package_with_prebuilt_installer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("src").join("out").join("Default_x64");
    std::fs::create_dir_all(&out).expect("mkdir");
    std::fs::write(out.join("mini_installer.exe"), b"MZ installer").expect("write");

    packager(dir.path())
        .args(context_args(dir.path()))
        .args(["--arch", "x64", "package"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nxtscape_1.2.3_x64_installer.zip"));

    let dist = dir.path().join("dist");
    assert!(dist.join("Nxtscape_1.2.3_x64_installer.exe").is_file());
    assert!(dist.join("Nxtscape_1.2.3_x64_installer.zip").is_file());
}

#[test]
fn config_file_supplies_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("src").join("out").join("Release");
    std::fs::create_dir_all(&out).expect("mkdir");
    std::fs::write(out.join("mini_installer.exe"), b"MZ").expect("write");
    std::fs::write(out.join("args.gn"), "target_cpu=\"x86\"\n").expect("write args.gn");
    std::fs::write(
        dir.path().join("release.toml"),
        "[context]\nchromium_src = \"src\"\nout_dir = \"out/Release\"\n\
         app_base_name = \"Nxtscape\"\nchromium_version = \"2.0.0\"\n",
    )
    .expect("write config");

    packager(dir.path())
        .args(["--config", "release.toml", "package"])
        .assert()
        .success();

    assert!(
        dir.path()
            .join("dist")
            .join("2.0.0")
            .join("Nxtscape_2.0.0_x86_installer.exe")
            .is_file()
    );
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("bad.toml"), "[context]\nflavour = \"beta\"\n").expect("write");

    packager(dir.path())
        .args(["--config", "bad.toml", "package"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn files_cfg_without_manifest_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    packager(dir.path())
        .args(context_args(dir.path()))
        .arg("files-cfg")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("FILES.cfg not found"));
}

#[test]
fn files_cfg_with_manifest_is_not_implemented() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manifest_dir = dir
        .path()
        .join("src")
        .join("chrome")
        .join("tools")
        .join("build")
        .join("win");
    std::fs::create_dir_all(&manifest_dir).expect("mkdir");
    std::fs::write(manifest_dir.join("FILES.cfg"), "FILES = []\n").expect("write");

    packager(dir.path())
        .args(context_args(dir.path()))
        .arg("files-cfg")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not implemented"));
}

#[test]
fn universal_is_a_successful_no_op() {
    let dir = tempfile::tempdir().expect("tempdir");
    packager(dir.path())
        .arg("universal")
        .assert()
        .success()
        .stdout(predicate::str::contains("not supported on Windows"));
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn sign_without_binaries_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    packager(dir.path())
        .args(context_args(dir.path()))
        .args(["sign", "--certificate", "Nxtscape Inc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("signing binaries in"))
        .stderr(predicate::str::contains("no binaries found to sign"));
}

#[test]
fn sign_without_backend_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("src").join("out").join("Default_x64");
    std::fs::create_dir_all(&out).expect("mkdir");
    std::fs::write(out.join("chrome.exe"), b"MZ").expect("write");

    packager(dir.path())
        .args(context_args(dir.path()))
        .arg("sign")
        .assert()
        .success()
        .stdout(predicate::str::contains("left unsigned"));
}

#[test]
fn path_separator_in_app_name_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    packager(dir.path())
        .args(["--app-name", "builds/Nxtscape", "package"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid arguments"))
        .stderr(predicate::str::contains("must not contain path separators"));
}

#[cfg(unix)]
#[test]
fn relative_build_tool_resolves_from_invocation_dir() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("src").join("out").join("Default_x64"))
        .expect("mkdir out");
    let tools = dir.path().join("tools");
    std::fs::create_dir_all(&tools).expect("mkdir tools");
    let tool = tools.join("autoninja");
    // PATH is cleared, so only shell builtins are available
    std::fs::write(&tool, "#!/bin/sh\nprintf 'MZ built' > \"$2/mini_installer.exe\"\n")
        .expect("write tool");
    std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).expect("chmod");

    packager(dir.path())
        .args(context_args(dir.path()))
        .args(["--arch", "x64", "--build-tool", "tools/autoninja", "package"])
        .assert()
        .success();

    let dist = dir.path().join("dist");
    assert_eq!(
        std::fs::read(dist.join("Nxtscape_1.2.3_x64_installer.exe")).expect("installer"),
        b"MZ built"
    );
    assert!(dist.join("Nxtscape_1.2.3_x64_installer.zip").is_file());
}

fn esigner_otp_setup(root: &Path) {
    let out = root.join("src").join("out").join("Default_x64");
    std::fs::create_dir_all(&out).expect("mkdir");
    std::fs::write(out.join("chrome.exe"), b"MZ").expect("write chrome");
    std::fs::write(root.join("CodeSignTool.bat"), b"@echo off\n").expect("write tool");
}

#[test]
fn esigner_otp_mode_requires_totp_secret() {
    let dir = tempfile::tempdir().expect("tempdir");
    esigner_otp_setup(dir.path());

    packager(dir.path())
        .env("SIGNING_METHOD", "esigner")
        .env("ESIGNER_USE_OTP", "true")
        .env("CODESIGNTOOL_PATH", dir.path().join("CodeSignTool.bat"))
        .args(context_args(dir.path()))
        .arg("sign")
        .write_stdin("123456\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("6-digit OTP code"))
        .stderr(predicate::str::contains("cannot use an interactive OTP code"));
}

#[test]
fn esigner_otp_mode_rejects_malformed_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    esigner_otp_setup(dir.path());

    packager(dir.path())
        .env("ESIGNER_USERNAME", "release@example.com")
        .env("ESIGNER_USE_OTP", "true")
        .env("CODESIGNTOOL_PATH", dir.path().join("CodeSignTool.bat"))
        .args(context_args(dir.path()))
        .arg("sign")
        .write_stdin("12ab56\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid OTP code"));
}
