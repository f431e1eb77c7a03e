//! Shared constants for EPUB generation
//!
//! This module centralizes the fixed names, defaults and media types used
//! throughout the conversion.

use crate::types::Dimensions;

// =============================================================================
// Package Layout
// =============================================================================

/// Content of the root marker file
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// Name of the root marker file (first archive entry, stored)
pub const MIMETYPE_FILE: &str = "mimetype";

/// Staging folder created under the base path
pub const STAGING_DIR_NAME: &str = "temp";

pub const META_INF_DIR: &str = "META-INF";
pub const OEBPS_DIR: &str = "OEBPS";
pub const IMAGES_DIR: &str = "Images";
pub const TEXT_DIR: &str = "Text";

pub const CONTAINER_FILE: &str = "container.xml";
pub const OPF_FILE: &str = "content.opf";
pub const NCX_FILE: &str = "toc.ncx";
pub const NAV_FILE: &str = "nav.xhtml";
pub const STYLESHEET_FILE: &str = "style.css";

// =============================================================================
// Defaults
// =============================================================================

/// Target resolution used for metadata and blank pages
pub const DEFAULT_ORIGINAL_RESOLUTION: Dimensions = Dimensions::new(1072, 1448);

/// Size assumed for an image that cannot be decoded
pub const DEFAULT_FALLBACK_DIMENSIONS: Dimensions = Dimensions::new(1046, 1448);

/// Width/height ratio at or above which a page is a double spread
pub const DEFAULT_DOUBLE_PAGE_RATIO: f64 = 1.3;

/// Default `rendition:spread` value
pub const DEFAULT_SPREAD_MODE: &str = "auto";

/// Name of the output file when the title sanitizes to nothing
pub const DEFAULT_OUTPUT_STEM: &str = "book";

/// Stem that marks a source image as the cover
pub const COVER_STEM: &str = "cover";

// =============================================================================
// Media Types
// =============================================================================

/// Extensions (lower case, no dot) that are staged, split and paged
pub const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";
pub const CSS_MEDIA_TYPE: &str = "text/css";
pub const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";
