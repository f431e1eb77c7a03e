//! Spine and manifest layout
//!
//! Walks the sorted image list once and assigns every page a facing side.
//! Sides alternate starting on the right. A double spread must start on the
//! side its `a` half belongs to (right for rtl, left for ltr); when the
//! alternation would put it on the wrong side, one blank page is inserted
//! first. The cover is centered and does not take part in the alternation.
//!
//! ```text
//! rtl, s1 + p2 (double):   s1:R  blank_1:L  p2_a:R  p2_b:L
//! rtl, p1 (double) only:   p1_a:R  p1_b:L
//! ltr, s1 + p2 (double):   s1:R  blank_1:L  p2_a:L  p2_b:R
//! ```

use crate::constants::*;
use crate::naming::{blank_page_file, blank_page_id, image_item_id, image_media_type};
use crate::pages::PageIndex;
use crate::types::*;
use log::{debug, info, warn};

/// Manifest id of the cover image
pub const COVER_IMAGE_ID: &str = "cover";

/// Layout inputs taken from the conversion options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpineSettings {
    pub has_cover: bool,
    pub reading_direction: ReadingDirection,
    /// Viewport of synthesized blank pages
    pub blank_viewport: Dimensions,
}

/// Side-parity state carried from one spine entry to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpineState {
    /// Side of the last non-cover entry, `None` before the first one
    pub last_side: Option<Side>,
    /// Side the next non-cover entry will take
    pub next_side: Side,
    /// Number of blank pages synthesized so far
    pub blank_counter: usize,
}

impl Default for SpineState {
    fn default() -> Self {
        Self {
            last_side: None,
            next_side: Side::Right,
            blank_counter: 0,
        }
    }
}

impl SpineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spread that must start on `desired` needs a blank first.
    ///
    /// Never true before the first entry: nothing precedes it to misalign.
    pub fn needs_blank_before(&self, desired: Side) -> bool {
        self.last_side.is_some() && self.next_side != desired
    }

    /// Record that an entry was placed on `used`
    pub fn advance(&mut self, used: Side) {
        self.last_side = Some(used);
        self.next_side = used.opposite();
    }

    /// Reserve the next blank page number (1-based)
    pub fn next_blank_number(&mut self) -> usize {
        self.blank_counter += 1;
        self.blank_counter
    }
}

/// Finished manifest and spine for one book
#[derive(Debug, Clone, PartialEq)]
pub struct SpineLayout {
    pub manifest: Vec<ManifestItem>,
    pub spine: Vec<SpineEntry>,
    /// Blank pages referenced by the spine; they still have to be written
    pub blank_pages: Vec<PageDocument>,
    pub cover_image_id: Option<String>,
    /// Images left out because they had no page document
    pub skipped_images: Vec<String>,
    /// Number of double spreads laid out as a facing pair
    pub spreads: usize,
}

impl SpineLayout {
    fn with_auxiliary_items() -> Self {
        let manifest = vec![
            ManifestItem::new("nav", NAV_FILE, XHTML_MEDIA_TYPE).with_properties("nav"),
            ManifestItem::new("ncx", NCX_FILE, NCX_MEDIA_TYPE),
            ManifestItem::new(
                "css",
                format!("{}/{}", TEXT_DIR, STYLESHEET_FILE),
                CSS_MEDIA_TYPE,
            ),
        ];
        Self {
            manifest,
            spine: Vec::new(),
            blank_pages: Vec::new(),
            cover_image_id: None,
            skipped_images: Vec::new(),
            spreads: 0,
        }
    }

    /// `(idref, side)` pairs in reading order
    pub fn sides(&self) -> Vec<(&str, PageSpread)> {
        self.spine
            .iter()
            .map(|entry| (entry.idref.as_str(), entry.spread))
            .collect()
    }
}

/// Lay out `images` (sorted by file name) into a manifest and spine.
///
/// Every image needs a page document in `pages`; images without one are
/// skipped with a warning. A double spread whose halves are not both paged is
/// not treated as a pair: the half that has a page is laid out as an
/// ordinary single page.
pub fn build_spine(images: &[RenderedImage], pages: &PageIndex, settings: &SpineSettings) -> SpineLayout {
    let mut layout = SpineLayout::with_auxiliary_items();
    let mut state = SpineState::new();
    let desired_side_a = settings.reading_direction.leading_half_side();

    let mut i = 0;
    while i < images.len() {
        let image = &images[i];
        let Some(page) = pages.get(&image.file_name) else {
            warn!(
                "Page document not found for image '{}', skipping it",
                image.file_name
            );
            layout.skipped_images.push(image.file_name.clone());
            i += 1;
            continue;
        };

        if i == 0 && settings.has_cover {
            add_cover(&mut layout, image, page);
            i += 1;
            continue;
        }

        let partner = images.get(i + 1).filter(|next| image.pairs_with(next));
        if let Some(partner) = partner {
            match pages.get(&partner.file_name) {
                Some(partner_page) => {
                    if state.needs_blank_before(desired_side_a) {
                        add_blank(&mut layout, &mut state, settings.blank_viewport);
                        info!(
                            "Inserted blank page before double spread {} (next side now {})",
                            image.file_name,
                            state.next_side.as_str()
                        );
                    }
                    add_page(&mut layout, &mut state, image, page);
                    add_page(&mut layout, &mut state, partner, partner_page);
                    layout.spreads += 1;
                    i += 2;
                    continue;
                }
                None => warn!(
                    "Double spread {} has no page for its second half {}, laying it out as single pages",
                    image.file_name, partner.file_name
                ),
            }
        }

        add_page(&mut layout, &mut state, image, page);
        i += 1;
    }

    debug!(
        "Spine laid out: {} entries, {} blank page(s)",
        layout.spine.len(),
        state.blank_counter
    );
    layout
}

fn add_cover(layout: &mut SpineLayout, image: &RenderedImage, page: &PageDocument) {
    layout.manifest.push(page_item(page));
    layout.manifest.push(
        ManifestItem::new(
            COVER_IMAGE_ID,
            image_href(image),
            image_media_type(&image.extension),
        )
        .with_properties("cover-image"),
    );
    layout.cover_image_id = Some(COVER_IMAGE_ID.to_string());
    layout.spine.push(SpineEntry {
        idref: page.id.clone(),
        spread: PageSpread::Center,
    });
}

fn add_page(layout: &mut SpineLayout, state: &mut SpineState, image: &RenderedImage, page: &PageDocument) {
    layout.manifest.push(page_item(page));
    layout.manifest.push(ManifestItem::new(
        image_item_id(&image.base),
        image_href(image),
        image_media_type(&image.extension),
    ));
    push_spine_entry(layout, state, &page.id);
}

fn add_blank(layout: &mut SpineLayout, state: &mut SpineState, viewport: Dimensions) {
    let number = state.next_blank_number();
    let page = PageDocument {
        id: blank_page_id(number),
        file_name: blank_page_file(number),
        viewport,
        image_file: None,
    };
    layout.manifest.push(page_item(&page));
    push_spine_entry(layout, state, &page.id);
    layout.blank_pages.push(page);
}

fn push_spine_entry(layout: &mut SpineLayout, state: &mut SpineState, idref: &str) {
    let side = state.next_side;
    layout.spine.push(SpineEntry {
        idref: idref.to_string(),
        spread: side.into(),
    });
    state.advance(side);
}

fn page_item(page: &PageDocument) -> ManifestItem {
    ManifestItem::new(
        page.id.clone(),
        format!("{}/{}", TEXT_DIR, page.file_name),
        XHTML_MEDIA_TYPE,
    )
}

fn image_href(image: &RenderedImage) -> String {
    format!("{}/{}", IMAGES_DIR, image.file_name)
}
