//! Staging tree for one conversion run
//!
//! ```text
//! <base>/temp/
//!     mimetype
//!     META-INF/container.xml
//!     OEBPS/Images/
//!     OEBPS/Text/
//! ```
//!
//! The tree is exclusive to one run. Batch conversions recreate it for every
//! archive, so callers must never run two conversions against the same base
//! path at once.

use crate::constants::*;
use crate::documents::render_container;
use crate::naming::{is_raster_extension, split_extension};
use crate::types::*;
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths of a freshly created staging tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingTree {
    pub root: PathBuf,
    pub oebps_dir: PathBuf,
    pub images_dir: PathBuf,
    pub text_dir: PathBuf,
}

impl StagingTree {
    /// Paths for the staging tree under `base_path`, without touching the disk
    pub fn at(base_path: &Path) -> Self {
        let root = base_path.join(STAGING_DIR_NAME);
        let oebps_dir = root.join(OEBPS_DIR);
        Self {
            images_dir: oebps_dir.join(IMAGES_DIR),
            text_dir: oebps_dir.join(TEXT_DIR),
            oebps_dir,
            root,
        }
    }

    /// Delete any previous staging tree and create an empty skeleton
    /// holding the root marker and `container.xml`.
    pub fn create(base_path: &Path) -> Result<Self> {
        let tree = Self::at(base_path);

        if tree.root.exists() {
            info!("Removing existing staging folder: {}", tree.root.display());
            fs::remove_dir_all(&tree.root)?;
        }

        let meta_inf = tree.root.join(META_INF_DIR);
        fs::create_dir_all(&meta_inf)?;
        fs::create_dir_all(&tree.images_dir)?;
        fs::create_dir_all(&tree.text_dir)?;

        // No trailing newline
        fs::write(tree.root.join(MIMETYPE_FILE), EPUB_MIMETYPE)?;
        fs::write(meta_inf.join(CONTAINER_FILE), render_container())?;

        info!("Staging folder recreated: {}", tree.root.display());
        Ok(tree)
    }
}

/// Where one source image lands in the staging Images folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedCopy {
    /// File name inside the source folder
    pub source: String,
    /// File name inside the Images folder
    pub staged: String,
}

/// Decide the staged name of every raster image found directly inside
/// `source_dir`, without copying anything.
///
/// Images named `cover` (any case) are renamed `0.<ext>`, `0_1.<ext>`, ...
/// so they sort before every other page.
pub fn plan_source_copies(source_dir: &Path) -> Result<Vec<StagedCopy>> {
    if !source_dir.is_dir() {
        return Err(EpubError::SourceNotFound(source_dir.to_path_buf()));
    }

    let mut pages = Vec::new();
    let mut covers = Vec::new();
    for entry in fs::read_dir(source_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(file_name) = entry.file_name().into_string() else {
            debug!("Skipping non UTF-8 file name: {:?}", entry.file_name());
            continue;
        };
        let (stem, extension) = split_extension(&file_name);
        if !is_raster_extension(extension) {
            debug!("Skipping non-raster file: {}", file_name);
            continue;
        }
        if stem.eq_ignore_ascii_case(COVER_STEM) {
            covers.push(file_name);
        } else {
            pages.push(file_name);
        }
    }
    pages.sort();
    covers.sort();

    let mut taken: HashSet<String> = pages.iter().cloned().collect();
    let mut copies: Vec<StagedCopy> = pages
        .into_iter()
        .map(|name| StagedCopy {
            staged: name.clone(),
            source: name,
        })
        .collect();

    for (idx, file_name) in covers.into_iter().enumerate() {
        let extension = split_extension(&file_name).1.to_ascii_lowercase();
        let base = if idx == 0 {
            "0".to_string()
        } else {
            format!("0_{}", idx)
        };

        let mut staged = format!("{}.{}", base, extension);
        let mut suffix = 1;
        while taken.contains(&staged) {
            staged = format!("{}_{}.{}", base, suffix, extension);
            suffix += 1;
        }
        taken.insert(staged.clone());
        copies.push(StagedCopy {
            source: file_name,
            staged,
        });
    }

    Ok(copies)
}

/// Copy the raster images found directly inside `source_dir` into the
/// staging Images folder, renaming covers as [`plan_source_copies`] decides.
///
/// Returns the number of files copied.
pub fn copy_source_images(source_dir: &Path, tree: &StagingTree) -> Result<usize> {
    let copies = plan_source_copies(source_dir)?;

    for copy in &copies {
        let dest = tree.images_dir.join(&copy.staged);
        fs::copy(source_dir.join(&copy.source), &dest)?;
        if copy.source == copy.staged {
            debug!("Copied: {} -> {}", copy.source, dest.display());
        } else {
            info!("Copied cover {} as {}", copy.source, copy.staged);
        }
    }

    info!("Copied {} image(s) from {}", copies.len(), source_dir.display());
    Ok(copies.len())
}

/// Sorted snapshot of the raster images currently in `images_dir`.
///
/// Later stages work from this list and never re-list the folder.
pub fn snapshot_images(images_dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(images_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            if is_raster_extension(split_extension(&name).1) {
                names.push(name);
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_writes_skeleton() {
        let dir = tempfile::tempdir().unwrap();
        let tree = StagingTree::create(dir.path()).unwrap();

        assert!(tree.images_dir.is_dir());
        assert!(tree.text_dir.is_dir());
        let marker = fs::read_to_string(tree.root.join(MIMETYPE_FILE)).unwrap();
        assert_eq!(marker, "application/epub+zip");
        assert!(tree.root.join("META-INF/container.xml").is_file());
    }

    #[test]
    fn test_create_replaces_previous_tree() {
        let dir = tempfile::tempdir().unwrap();
        let tree = StagingTree::create(dir.path()).unwrap();
        fs::write(tree.images_dir.join("stale.jpg"), b"x").unwrap();

        let tree = StagingTree::create(dir.path()).unwrap();
        assert!(!tree.images_dir.join("stale.jpg").exists());
    }

    #[test]
    fn test_copy_renames_covers_and_skips_other_files() {
        let source = tempfile::tempdir().unwrap();
        for name in ["Cover.PNG", "002.jpg", "001.jpg", "notes.txt", "0.png"] {
            fs::write(source.path().join(name), b"data").unwrap();
        }
        fs::create_dir(source.path().join("nested")).unwrap();

        let base = tempfile::tempdir().unwrap();
        let tree = StagingTree::create(base.path()).unwrap();
        let copied = copy_source_images(source.path(), &tree).unwrap();
        assert_eq!(copied, 4);

        let names = snapshot_images(&tree.images_dir).unwrap();
        // "0.png" already exists, so the cover is uniquified
        assert_eq!(names, vec!["0.png", "001.jpg", "002.jpg", "0_1.png"]);
    }

    #[test]
    fn test_copy_missing_source_is_fatal() {
        let base = tempfile::tempdir().unwrap();
        let tree = StagingTree::create(base.path()).unwrap();
        let result = copy_source_images(&base.path().join("missing"), &tree);
        assert!(matches!(result, Err(EpubError::SourceNotFound(_))));
    }
}
