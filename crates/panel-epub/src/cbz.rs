//! CBZ (zipped comic) extraction

use crate::types::*;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Folder a CBZ is extracted into: `<root>/<stem>_extract`
pub fn extract_dir_for(cbz_path: &Path, root: &Path) -> PathBuf {
    root.join(format!("{}_extract", archive_stem(cbz_path)))
}

/// File stem of the archive, used as the book title
pub fn archive_stem(cbz_path: &Path) -> String {
    cbz_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extract every entry of `cbz_path` under `dest`, keeping the archive's
/// folder structure. Entries whose path would escape `dest` are skipped.
///
/// Returns the number of files written.
pub fn extract_cbz(cbz_path: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(cbz_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    fs::create_dir_all(dest)?;

    let mut extracted = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        debug!("Extracted {}", out_path.display());
        extracted += 1;
    }

    info!(
        "Extracted {} file(s) from {} to {}",
        extracted,
        cbz_path.display(),
        dest.display()
    );
    Ok(extracted)
}
