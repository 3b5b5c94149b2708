//! File system utilities for packaging.
//!
//! Provides file copies with automatic directory creation, single-entry zip
//! archives and SHA-256 checksums, with path context on every I/O error.

use crate::packager::error::{Error, ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncReadExt};

/// Bytes per megabyte for operator-facing size reporting.
const MEGABYTE: u64 = 1024 * 1024;

/// Whole megabytes in `bytes`, rounded down.
pub fn whole_megabytes(bytes: u64) -> u64 {
    bytes / MEGABYTE
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if !from.exists() {
        crate::bail!("{} does not exist", from.display());
    }
    if !from.is_file() {
        crate::bail!("{} is not a file", from.display());
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating output directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", to)
}

/// Writes a deflate-compressed zip at `archive` holding `source` under
/// `entry_name`.
///
/// Any existing archive is replaced. Returns the size of `source` in bytes.
pub async fn write_single_entry_zip(source: &Path, archive: &Path, entry_name: &str) -> Result<u64> {
    let source = source.to_path_buf();
    let archive = archive.to_path_buf();
    let entry_name = entry_name.to_string();

    // zip writes synchronously
    tokio::task::spawn_blocking(move || zip_blocking(&source, &archive, &entry_name))
        .await
        .map_err(|e| Error::GenericError(format!("Archive task panicked: {}", e)))?
}

/// Writes the archive under a `.partial` name and renames it into place, so a
/// failed write never leaves a truncated zip at `archive`.
fn zip_blocking(source: &Path, archive: &Path, entry_name: &str) -> Result<u64> {
    if let Some(parent) = archive.parent() {
        std::fs::create_dir_all(parent).fs_context("creating output directory", parent)?;
    }

    let mut partial = archive.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    match write_zip(source, &partial, entry_name) {
        Ok(size) => {
            std::fs::rename(&partial, archive).fs_context("moving archive into place", archive)?;
            Ok(size)
        }
        Err(e) => {
            if partial.exists()
                && let Err(remove) = std::fs::remove_file(&partial)
            {
                log::warn!("Failed to remove {}: {}", partial.display(), remove);
            }
            Err(e)
        }
    }
}

fn write_zip(source: &Path, archive: &Path, entry_name: &str) -> Result<u64> {
    let mut input = std::fs::File::open(source).fs_context("opening archive input", source)?;
    let size = input
        .metadata()
        .fs_context("reading archive input metadata", source)?
        .len();

    let output = std::fs::File::create(archive).fs_context("creating archive", archive)?;
    let mut writer = zip::ZipWriter::new(output);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .large_file(size >= u32::MAX as u64);

    writer.start_file(entry_name, options)?;
    io::copy(&mut input, &mut writer).fs_context("compressing into archive", archive)?;
    let mut output = writer.finish()?;
    output.flush().fs_context("flushing archive", archive)?;

    Ok(size)
}

/// Calculates the hex-encoded SHA-256 checksum of a file.
///
/// Reads the file in 8KB chunks to handle large installers.
pub async fn sha256_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .await
        .fs_context("opening file for checksum", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for checksum", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
