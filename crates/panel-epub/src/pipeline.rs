//! End-to-end conversion runs
//!
//! The whole run is blocking file and image work, so the async entry points
//! hand it to a single `spawn_blocking` task.

use crate::archive::assemble_package;
use crate::cbz::{archive_stem, extract_cbz, extract_dir_for};
use crate::constants::*;
use crate::documents::{PackageMetadata, STYLE_CSS, render_nav, render_ncx, render_opf};
use crate::naming::sanitize_filename;
use crate::options::ConversionOptions;
use crate::pages::{generate_page_documents, write_page_document};
use crate::spine::{SpineLayout, SpineSettings, build_spine};
use crate::split::{SplitSettings, split_pages};
use crate::staging::{StagingTree, copy_source_images, snapshot_images};
use crate::stats::ConversionStatistics;
use crate::types::*;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Format of `dcterms:modified`
const MODIFIED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Result of converting one book
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutput {
    pub epub_path: PathBuf,
    /// Book id written into the package
    pub book_id: String,
    pub statistics: ConversionStatistics,
}

/// Convert the image folder `options.source_dir` into an EPUB under
/// `options.base_path`.
pub async fn convert_folder(options: &ConversionOptions) -> Result<ConversionOutput> {
    options.validate()?;
    let options = options.clone();
    tokio::task::spawn_blocking(move || convert_folder_sync(options)).await?
}

/// Convert each CBZ archive into its own EPUB under `root`.
///
/// `template` supplies every setting except the source folder, base path,
/// title and book id, which are derived per archive. Missing archives are
/// skipped with a warning; any other failure stops the batch.
pub async fn convert_cbz_batch(
    cbz_paths: &[PathBuf],
    root: &Path,
    template: &ConversionOptions,
) -> Result<Vec<ConversionOutput>> {
    if cbz_paths.is_empty() {
        return Err(EpubError::NoInputs);
    }
    template.validate()?;

    let cbz_paths = cbz_paths.to_vec();
    let root = root.to_path_buf();
    let template = template.clone();
    tokio::task::spawn_blocking(move || convert_cbz_batch_sync(&cbz_paths, &root, &template)).await?
}

/// Blocking implementation of [`convert_folder`]
pub fn convert_folder_sync(mut options: ConversionOptions) -> Result<ConversionOutput> {
    options.validate()?;
    let book_id = options.ensure_book_id().to_string();

    info!("=== Converting an image folder ===");
    info!("Source images: {}", options.source_dir.display());
    info!("Output folder: {}", options.base_path.display());
    info!("Title: {}", options.title);
    info!("Author: {}", options.creator);
    info!("Reading direction: {}", options.reading_direction);
    info!("Original resolution: {}", options.original_resolution);
    info!("Book id: {}", book_id);
    info!("rendition:spread: {}", options.effective_spread_mode());
    info!("Double page ratio: {}", options.double_page_ratio);

    if !options.source_dir.is_dir() {
        return Err(EpubError::SourceNotFound(options.source_dir.clone()));
    }
    fs::create_dir_all(&options.base_path)?;

    info!("[1/7] Initializing EPUB structure...");
    let tree = StagingTree::create(&options.base_path)?;

    info!("[2/7] Copying images to {}/{}...", OEBPS_DIR, IMAGES_DIR);
    copy_source_images(&options.source_dir, &tree)?;
    let snapshot = snapshot_images(&tree.images_dir)?;

    info!("[3/7] Splitting double pages and generating XHTML pages...");
    let split = split_pages(
        &tree.images_dir,
        &snapshot,
        &SplitSettings {
            double_page_ratio: options.double_page_ratio,
            reading_direction: options.reading_direction,
            fallback_dimensions: options.fallback_dimensions,
        },
    );
    let pages = generate_page_documents(&tree.text_dir, &split.images);

    info!("[4/7] Generating {}...", OPF_FILE);
    let layout = build_spine(&split.images, &pages, &spine_settings(&options));
    for blank in &layout.blank_pages {
        write_page_document(&tree.text_dir, blank)?;
        info!("Created blank page {}", blank.file_name);
    }
    let metadata = package_metadata(&options, book_id.clone());
    fs::write(tree.oebps_dir.join(OPF_FILE), render_opf(&metadata, &layout))?;

    info!("[5/7] Generating {}...", NCX_FILE);
    let page_files = page_files(&layout);
    fs::write(
        tree.oebps_dir.join(NCX_FILE),
        render_ncx(&book_id, &options.title, &page_files),
    )?;

    info!("[6/7] Generating {} and {}...", NAV_FILE, STYLESHEET_FILE);
    fs::write(
        tree.oebps_dir.join(NAV_FILE),
        render_nav(&options.title, page_files.first().map(String::as_str)),
    )?;
    fs::write(tree.text_dir.join(STYLESHEET_FILE), STYLE_CSS)?;

    info!("[7/7] Creating EPUB file...");
    let epub_path = output_path(&options.base_path, &options.title);
    let epub_path = assemble_package(&tree.root, &epub_path)?;

    let statistics = ConversionStatistics::from_run(&split, &layout);
    info!("=== Done: {} ===", epub_path.display());
    Ok(ConversionOutput {
        epub_path,
        book_id,
        statistics,
    })
}

/// Blocking implementation of [`convert_cbz_batch`]
pub fn convert_cbz_batch_sync(
    cbz_paths: &[PathBuf],
    root: &Path,
    template: &ConversionOptions,
) -> Result<Vec<ConversionOutput>> {
    if cbz_paths.is_empty() {
        return Err(EpubError::NoInputs);
    }

    info!("=== Converting {} CBZ file(s) ===", cbz_paths.len());
    info!("Output root folder: {}", root.display());
    fs::create_dir_all(root)?;

    let mut outputs = Vec::new();
    for (idx, cbz_path) in cbz_paths.iter().enumerate() {
        info!("--- [{}/{}] {} ---", idx + 1, cbz_paths.len(), cbz_path.display());

        if !cbz_path.is_file() {
            warn!("File not found, skipping: {}", cbz_path.display());
            continue;
        }

        let extract_dir = extract_dir_for(cbz_path, root);
        let mut options = template.clone();
        options.source_dir = extract_dir.clone();
        options.base_path = root.to_path_buf();
        options.title = archive_stem(cbz_path);
        options.book_id = None;

        let result = extract_cbz(cbz_path, &extract_dir).and_then(|_| convert_folder_sync(options));

        if extract_dir.exists() {
            match fs::remove_dir_all(&extract_dir) {
                Ok(()) => info!("Removed extraction folder: {}", extract_dir.display()),
                Err(e) => warn!(
                    "Could not remove extraction folder {}: {}",
                    extract_dir.display(),
                    e
                ),
            }
        }

        outputs.push(result?);
    }

    info!("=== Generated {} EPUB file(s) ===", outputs.len());
    Ok(outputs)
}

/// `<base>/<sanitized title>.epub`
pub fn output_path(base_path: &Path, title: &str) -> PathBuf {
    base_path.join(format!("{}.epub", sanitize_filename(title)))
}

pub(crate) fn spine_settings(options: &ConversionOptions) -> SpineSettings {
    SpineSettings {
        has_cover: options.has_cover,
        reading_direction: options.reading_direction,
        blank_viewport: options.target_resolution(),
    }
}

fn package_metadata(options: &ConversionOptions, book_id: String) -> PackageMetadata {
    let modified = options.modified.unwrap_or_else(chrono::Utc::now);
    PackageMetadata {
        book_id,
        title: options.title.clone(),
        creator: options.creator.clone(),
        modified: modified.format(MODIFIED_FORMAT).to_string(),
        reading_direction: options.reading_direction,
        original_resolution: options.original_resolution.clone(),
        spread_mode: options.effective_spread_mode().to_string(),
    }
}

/// Every page document of the layout, blanks included, in file-name order
fn page_files(layout: &SpineLayout) -> Vec<String> {
    let text_prefix = format!("{}/", TEXT_DIR);
    let mut files: Vec<String> = layout
        .manifest
        .iter()
        .filter(|item| item.media_type == XHTML_MEDIA_TYPE)
        .filter_map(|item| item.href.strip_prefix(&text_prefix))
        .map(str::to_string)
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_uses_sanitized_title() {
        assert_eq!(
            output_path(Path::new("/out"), " My: Book/1 "),
            PathBuf::from("/out/My_ Book_1.epub")
        );
        assert_eq!(output_path(Path::new("/out"), "   "), PathBuf::from("/out/book.epub"));
    }

    #[test]
    fn test_package_metadata_uses_pinned_time() {
        let mut options = ConversionOptions::default();
        options.modified = Some(
            chrono::DateTime::parse_from_rfc3339("2024-05-01T12:30:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        );
        options.spread_mode = String::new();
        let meta = package_metadata(&options, "urn:uuid:x".to_string());
        assert_eq!(meta.modified, "2024-05-01T12:30:00Z");
        assert_eq!(meta.spread_mode, "auto");
    }
}
