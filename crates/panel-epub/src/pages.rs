//! Page document generation
//!
//! Every rendered image gets exactly one fixed-layout XHTML page whose
//! viewport is the image's own pixel size. A page that cannot be written is
//! left out of the returned [`PageIndex`]; the spine builder then skips its
//! image instead of failing the run.

use crate::documents::render_page_document;
use crate::naming::{page_document_file, page_document_id};
use crate::types::*;
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Generated page documents, looked up by the image file they display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageIndex {
    by_image: BTreeMap<String, PageDocument>,
}

impl PageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image_file: impl Into<String>, page: PageDocument) {
        self.by_image.insert(image_file.into(), page);
    }

    pub fn get(&self, image_file: &str) -> Option<&PageDocument> {
        self.by_image.get(image_file)
    }

    pub fn contains(&self, image_file: &str) -> bool {
        self.by_image.contains_key(image_file)
    }

    pub fn len(&self) -> usize {
        self.by_image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_image.is_empty()
    }
}

impl IntoIterator for PageIndex {
    type Item = (String, PageDocument);
    type IntoIter = std::collections::btree_map::IntoIter<String, PageDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_image.into_iter()
    }
}

/// Page document describing `image`
pub fn page_for_image(image: &RenderedImage) -> PageDocument {
    PageDocument {
        id: page_document_id(&image.base),
        file_name: page_document_file(&image.base),
        viewport: image.dimensions,
        image_file: Some(image.file_name.clone()),
    }
}

/// Write one page document into the Text folder
pub fn write_page_document(text_dir: &Path, page: &PageDocument) -> Result<()> {
    fs::write(text_dir.join(&page.file_name), render_page_document(page))?;
    Ok(())
}

/// Page documents for `images`, without touching the disk.
///
/// Two images whose names sanitize to the same base would share a page file;
/// only the first one keeps it.
pub fn plan_page_documents(images: &[RenderedImage]) -> PageIndex {
    let mut index = PageIndex::new();
    let mut used_files = HashSet::new();

    for image in images {
        let page = page_for_image(image);
        if !used_files.insert(page.file_name.clone()) {
            warn!(
                "Page {} already generated for another image, skipping {}",
                page.file_name, image.file_name
            );
            continue;
        }
        index.insert(image.file_name.clone(), page);
    }

    index
}

/// Write a page for every image and index the ones that made it to disk.
pub fn generate_page_documents(text_dir: &Path, images: &[RenderedImage]) -> PageIndex {
    let mut index = PageIndex::new();

    for (image_file, page) in plan_page_documents(images) {
        match write_page_document(text_dir, &page) {
            Ok(()) => {
                debug!(
                    "Created page {} (viewport {})",
                    page.file_name, page.viewport
                );
                index.insert(image_file, page);
            }
            Err(e) => warn!("Could not write page {}: {}", page.file_name, e),
        }
    }

    index
}
