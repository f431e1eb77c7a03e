use crate::spine::SpineLayout;
use crate::split::{SplitOutcome, SplitReport};

/// Summary of one conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStatistics {
    /// Images copied into staging before splitting
    pub source_images: usize,
    /// Source images kept whole (split failures included)
    pub single_pages: usize,
    /// Source images cut into two halves
    pub spreads_split: usize,
    /// Double spreads that could not be cut and were kept whole
    pub split_failures: usize,
    /// Images that could not be decoded and were sized with the fallback
    pub fallback_sized: usize,
    /// Spreads laid out as a facing pair
    pub facing_spreads: usize,
    pub blank_pages_added: usize,
    /// Spine entries, cover and blanks included
    pub spine_entries: usize,
    /// Images left out of the spine
    pub skipped_images: usize,
    pub has_cover: bool,
}

impl ConversionStatistics {
    /// Collect the numbers of a run from its split report and final layout
    pub fn from_run(split: &SplitReport, layout: &SpineLayout) -> Self {
        let split_failures = split.count(SplitOutcome::SplitFailed);
        Self {
            source_images: split.sources.len(),
            single_pages: split.count(SplitOutcome::Single) + split_failures,
            spreads_split: split.count(SplitOutcome::Split),
            split_failures,
            fallback_sized: split.sources.iter().filter(|source| !source.probed).count(),
            facing_spreads: layout.spreads,
            blank_pages_added: layout.blank_pages.len(),
            spine_entries: layout.spine.len(),
            skipped_images: layout.skipped_images.len(),
            has_cover: layout.cover_image_id.is_some(),
        }
    }
}
