//! File and id naming shared by the splitter, page generator and spine builder

use crate::constants::{DEFAULT_OUTPUT_STEM, RASTER_EXTENSIONS};
use crate::types::HalfPart;

/// Replace every character that is not alphanumeric, `_` or `-` with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Turn a book title into an output file stem.
///
/// Spaces are kept here, unlike [`sanitize_name`].
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        DEFAULT_OUTPUT_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split `name.ext` into `("name", "ext")`.
///
/// A leading dot does not start an extension, so `.hidden` has none.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], &file_name[idx + 1..]),
        _ => (file_name, ""),
    }
}

pub fn is_raster_extension(extension: &str) -> bool {
    let lowered = extension.to_ascii_lowercase();
    RASTER_EXTENSIONS.contains(&lowered.as_str())
}

pub fn image_media_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// Base name of one half of a split spread
pub fn half_base(root: &str, part: HalfPart) -> String {
    format!("{}_{}", root, part.suffix())
}

/// Id of the page document showing the image with this base name
pub fn page_document_id(base: &str) -> String {
    format!("page_{}_F", base)
}

pub fn page_document_file(base: &str) -> String {
    format!("{}.xhtml", page_document_id(base))
}

/// Manifest id of an image item
pub fn image_item_id(base: &str) -> String {
    format!("img_{}", base)
}

/// Id of the `n`th synthesized blank page (1-based)
pub fn blank_page_id(n: usize) -> String {
    format!("page_blank_{}", n)
}

pub fn blank_page_file(n: usize) -> String {
    format!("{}.xhtml", blank_page_id(n))
}
