//! Fixed-layout EPUB generation for comic and manga page images.
//!
//! The conversion runs as a strictly sequential pipeline:
//! 1. Stage the package skeleton and copy the source images
//! 2. Probe each image and split double-page spreads into halves
//! 3. Write one fixed-viewport page document per rendered image
//! 4. Lay out the spine, inserting blank pages to keep spreads facing
//! 5. Write the package documents and zip the staging tree

pub mod archive;
pub mod cbz;
mod constants;
pub mod documents;
pub mod naming;
mod options;
pub mod pages;
pub mod pipeline;
mod preview;
pub mod probe;
pub mod spine;
pub mod split;
pub mod staging;
mod stats;
mod types;

pub use archive::assemble_package;
pub use cbz::extract_cbz;
pub use constants::*;
pub use options::*;
pub use pipeline::{ConversionOutput, convert_cbz_batch, convert_folder, output_path};
pub use preview::{preview_layout, preview_layout_sync};
pub use spine::{SpineLayout, SpineSettings, SpineState, build_spine};
pub use split::{SplitOutcome, SplitReport, SplitSettings, split_pages};
pub use stats::ConversionStatistics;
pub use types::*;
