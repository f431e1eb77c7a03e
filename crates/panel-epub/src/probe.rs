//! Image dimension probing

use crate::types::Dimensions;
use log::{debug, warn};
use std::path::Path;

/// Dimensions of a probed image and whether they are real or the fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub dimensions: Dimensions,
    pub used_fallback: bool,
}

/// Read an image's pixel size from its header.
///
/// Decode failures are not errors: the fallback size is returned and a warning
/// is logged.
pub fn probe_dimensions(path: &Path, fallback: Dimensions) -> ProbeResult {
    match image::image_dimensions(path) {
        Ok((width, height)) => {
            debug!("Probed {}: {}x{}", path.display(), width, height);
            ProbeResult {
                dimensions: Dimensions::new(width, height),
                used_fallback: false,
            }
        }
        Err(e) => {
            warn!("Cannot read size for {}: {}", path.display(), e);
            warn!("Using fallback size {}", fallback);
            ProbeResult {
                dimensions: fallback,
                used_fallback: true,
            }
        }
    }
}
