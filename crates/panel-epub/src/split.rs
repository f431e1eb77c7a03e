//! Double-page detection and splitting
//!
//! A page whose width/height ratio reaches the threshold is cut down the
//! middle. The half read first becomes `<base>_a`, the other `<base>_b`:
//!
//! | Direction | `_a`       | `_b`       |
//! |-----------|------------|------------|
//! | ltr       | left crop  | right crop |
//! | rtl       | right crop | left crop  |
//!
//! Each half is tagged with [`ImageRole::Half`] so the spine builder can pair
//! them without looking at file names.

use crate::naming::{half_base, sanitize_name, split_extension};
use crate::probe::probe_dimensions;
use crate::types::*;
use image::GenericImageView;
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings the splitter needs from the conversion options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSettings {
    pub double_page_ratio: f64,
    pub reading_direction: ReadingDirection,
    pub fallback_dimensions: Dimensions,
}

/// What happened to one source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOutcome {
    /// Not a double spread; kept unchanged
    Single,
    /// Replaced by two halves
    Split,
    /// Looked like a double spread but could not be cut; kept unchanged
    SplitFailed,
}

/// Result of running the splitter over a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitReport {
    /// Source images in snapshot order
    pub sources: Vec<SourcePage>,
    /// One outcome per entry of `sources`
    pub outcomes: Vec<SplitOutcome>,
    /// Images present after splitting, sorted by file name
    pub images: Vec<RenderedImage>,
}

impl SplitReport {
    pub fn count(&self, outcome: SplitOutcome) -> usize {
        self.outcomes.iter().filter(|&&o| o == outcome).count()
    }
}

/// Whether a page of this size is a double spread
pub fn is_double_spread(dimensions: Dimensions, threshold: f64) -> bool {
    dimensions.aspect_ratio() >= threshold && dimensions.width > 1
}

/// Probe, classify and split every image of `snapshot` inside `images_dir`.
///
/// `snapshot` must be taken before calling; halves written here are never
/// revisited.
pub fn split_pages(images_dir: &Path, snapshot: &[String], settings: &SplitSettings) -> SplitReport {
    let mut report = SplitReport::default();

    for file_name in snapshot {
        let path = images_dir.join(file_name);
        let source = probe_source(&path, file_name, settings.fallback_dimensions);

        let outcome = if is_double_spread(source.dimensions, settings.double_page_ratio) {
            match split_double_page(images_dir, &source, settings.reading_direction) {
                Ok(halves) => {
                    if let Err(e) = fs::remove_file(&path) {
                        warn!("Could not remove original image {}: {}", path.display(), e);
                    } else {
                        debug!("Removed original double-page image: {}", path.display());
                    }
                    report.images.extend(halves);
                    SplitOutcome::Split
                }
                Err(e) => {
                    error!("Error splitting double page {}: {}", file_name, e);
                    report.images.push(single_image(&source));
                    SplitOutcome::SplitFailed
                }
            }
        } else {
            report.images.push(single_image(&source));
            SplitOutcome::Single
        };

        report.sources.push(source);
        report.outcomes.push(outcome);
    }

    report.images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    report
}

/// Probe the staged file at `path` and describe it under `file_name`
pub(crate) fn probe_source(path: &Path, file_name: &str, fallback: Dimensions) -> SourcePage {
    let (stem, extension) = split_extension(file_name);
    let probe = probe_dimensions(path, fallback);
    SourcePage {
        file_name: file_name.to_string(),
        stem: stem.to_string(),
        extension: extension.to_string(),
        dimensions: probe.dimensions,
        probed: !probe.used_fallback,
    }
}

pub(crate) fn single_image(source: &SourcePage) -> RenderedImage {
    RenderedImage {
        file_name: source.file_name.clone(),
        base: sanitize_name(&source.stem),
        extension: source.extension.clone(),
        dimensions: source.dimensions,
        role: ImageRole::Single,
    }
}

/// One half of a planned split: the image it becomes and where its crop starts
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HalfPlan {
    pub image: RenderedImage,
    pub x: u32,
}

/// The two halves `source` would be cut into, `a` first.
///
/// The left crop is `width / 2` wide and the right crop takes the rest, so
/// the halves always add up to the original width.
pub(crate) fn plan_halves(source: &SourcePage, direction: ReadingDirection) -> [HalfPlan; 2] {
    let Dimensions { width, height } = source.dimensions;
    let half = width / 2;
    let left = (0, half);
    let right = (half, width - half);
    let (crop_a, crop_b) = match direction {
        ReadingDirection::Ltr => (left, right),
        ReadingDirection::Rtl => (right, left),
    };

    let root = sanitize_name(&source.stem);
    [(HalfPart::A, crop_a), (HalfPart::B, crop_b)].map(|(part, (x, crop_width))| {
        let base = half_base(&root, part);
        HalfPlan {
            image: RenderedImage {
                file_name: format!("{}.{}", base, source.extension),
                base,
                extension: source.extension.clone(),
                dimensions: Dimensions::new(crop_width, height),
                role: ImageRole::Half {
                    root: root.clone(),
                    part,
                },
            },
            x,
        }
    })
}

/// Cut one double page into its two halves and save them next to it.
///
/// Either both halves are written or neither is left on disk.
fn split_double_page(
    images_dir: &Path,
    source: &SourcePage,
    direction: ReadingDirection,
) -> Result<[RenderedImage; 2]> {
    let img = image::open(images_dir.join(&source.file_name))?;
    let (width, height) = img.dimensions();
    if width < 2 {
        return Err(EpubError::Config(format!(
            "{} is too narrow to split",
            source.file_name
        )));
    }

    let decoded = SourcePage {
        dimensions: Dimensions::new(width, height),
        ..source.clone()
    };
    let plan = plan_halves(&decoded, direction);
    let mut written: Vec<PathBuf> = Vec::with_capacity(2);

    for half in &plan {
        let dest = images_dir.join(&half.image.file_name);
        if dest.exists() {
            remove_partial(&written);
            return Err(EpubError::Config(format!(
                "{} already exists, refusing to overwrite it",
                half.image.file_name
            )));
        }

        let crop = half.image.dimensions;
        if let Err(e) = img.crop_imm(half.x, 0, crop.width, crop.height).save(&dest) {
            written.push(dest);
            remove_partial(&written);
            return Err(e.into());
        }

        info!(
            "Split {} -> {} ({})",
            source.file_name, half.image.file_name, crop
        );
        written.push(dest);
    }

    Ok(plan.map(|half| half.image))
}

fn remove_partial(paths: &[PathBuf]) {
    for path in paths {
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }
}
