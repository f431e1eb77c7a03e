use crate::options::ConversionOptions;
use crate::pages::plan_page_documents;
use crate::pipeline::spine_settings;
use crate::spine::{SpineLayout, build_spine};
use crate::split::{is_double_spread, plan_halves, probe_source, single_image};
use crate::staging::plan_source_copies;
use crate::types::*;
use log::info;

/// Compute the spine a conversion of `options.source_dir` would produce.
///
/// Images are probed in place; nothing is staged, split or written. Double
/// spreads are assumed to split cleanly.
pub async fn preview_layout(options: &ConversionOptions) -> Result<SpineLayout> {
    options.validate()?;
    let options = options.clone();
    tokio::task::spawn_blocking(move || preview_layout_sync(&options)).await?
}

/// Blocking implementation of [`preview_layout`]
pub fn preview_layout_sync(options: &ConversionOptions) -> Result<SpineLayout> {
    let copies = plan_source_copies(&options.source_dir)?;
    if copies.is_empty() {
        info!("No images found in {}", options.source_dir.display());
    }

    let mut images = Vec::with_capacity(copies.len());
    for copy in &copies {
        let path = options.source_dir.join(&copy.source);
        let source = probe_source(&path, &copy.staged, options.fallback_dimensions);
        if is_double_spread(source.dimensions, options.double_page_ratio) {
            images.extend(
                plan_halves(&source, options.reading_direction).map(|half| half.image),
            );
        } else {
            images.push(single_image(&source));
        }
    }
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    let pages = plan_page_documents(&images);
    Ok(build_spine(&images, &pages, &spine_settings(options)))
}
