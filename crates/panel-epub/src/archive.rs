//! Zip packaging of a finished staging tree
//!
//! The root marker goes in first and uncompressed so readers can sniff the
//! format from a fixed offset; every other file is deflated.

use crate::constants::MIMETYPE_FILE;
use crate::types::*;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Zip `staging_root` into `output_path` and delete the staging tree.
///
/// Any previous file at `output_path` is replaced. On failure the partial
/// archive is removed and the staging tree is left in place.
pub fn assemble_package(staging_root: &Path, output_path: &Path) -> Result<PathBuf> {
    if !staging_root.is_dir() {
        return Err(EpubError::StagingNotFound(staging_root.to_path_buf()));
    }
    let marker = staging_root.join(MIMETYPE_FILE);
    if !marker.is_file() {
        return Err(EpubError::MissingRootMarker(marker));
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if let Err(e) = write_archive(staging_root, &marker, output_path) {
        if output_path.exists() {
            if let Err(remove_err) = fs::remove_file(output_path) {
                warn!(
                    "Could not remove partial archive {}: {}",
                    output_path.display(),
                    remove_err
                );
            }
        }
        return Err(e);
    }
    info!("Created EPUB: {}", output_path.display());

    match fs::remove_dir_all(staging_root) {
        Ok(()) => debug!("Removed staging folder: {}", staging_root.display()),
        Err(e) => warn!(
            "Could not remove staging folder {}: {}",
            staging_root.display(),
            e
        ),
    }

    Ok(output_path.to_path_buf())
}

fn write_archive(staging_root: &Path, marker: &Path, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MIMETYPE_FILE, stored)?;
    zip.write_all(&fs::read(marker)?)?;

    for path in collect_files(staging_root)? {
        let entry_name = archive_entry_name(staging_root, &path)?;
        if entry_name == MIMETYPE_FILE {
            continue;
        }
        zip.start_file(entry_name.as_str(), deflated)?;
        zip.write_all(&fs::read(&path)?)?;
        debug!("Added to EPUB: {}", entry_name);
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    Ok(())
}

/// Every regular file under `root`, sorted by path so archives are reproducible
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Path of `path` relative to `root`, joined with forward slashes
fn archive_entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is outside the staging folder", path.display()),
        )
    })?;

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
