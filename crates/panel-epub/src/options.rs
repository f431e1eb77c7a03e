use crate::constants::*;
use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complete conversion configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConversionOptions {
    // Input / output
    pub source_dir: PathBuf,
    /// Folder that receives the staging tree and the finished EPUB
    pub base_path: PathBuf,

    // Book metadata
    pub title: String,
    pub creator: String,
    /// Generated as `urn:uuid:<v4>` when absent
    pub book_id: Option<String>,

    // Layout
    /// First image in sort order is the cover
    pub has_cover: bool,
    pub reading_direction: ReadingDirection,
    /// `"WxH"`, written verbatim into the metadata
    pub original_resolution: String,
    /// Written verbatim into `rendition:spread`
    pub spread_mode: String,
    pub double_page_ratio: f64,
    /// Size assumed for images that cannot be decoded
    pub fallback_dimensions: Dimensions,

    /// Pins `dcterms:modified`; the current time is used when absent
    #[cfg_attr(feature = "serde", serde(skip))]
    pub modified: Option<chrono::DateTime<chrono::Utc>>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            base_path: PathBuf::from("."),
            title: "title".to_string(),
            creator: "author".to_string(),
            book_id: None,
            has_cover: true,
            reading_direction: ReadingDirection::Rtl,
            original_resolution: DEFAULT_ORIGINAL_RESOLUTION.to_string(),
            spread_mode: DEFAULT_SPREAD_MODE.to_string(),
            double_page_ratio: DEFAULT_DOUBLE_PAGE_RATIO,
            fallback_dimensions: DEFAULT_FALLBACK_DIMENSIONS,
            modified: None,
        }
    }
}

impl ConversionOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| EpubError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EpubError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !self.double_page_ratio.is_finite() || self.double_page_ratio <= 0.0 {
            return Err(EpubError::Config(format!(
                "Double page ratio must be a positive number, got {}",
                self.double_page_ratio
            )));
        }

        if self.base_path.as_os_str().is_empty() {
            return Err(EpubError::Config("No output folder specified".to_string()));
        }

        Ok(())
    }

    /// Target resolution parsed from `original_resolution`, or the default pair
    pub fn target_resolution(&self) -> Dimensions {
        Dimensions::parse_or(&self.original_resolution, DEFAULT_ORIGINAL_RESOLUTION)
    }

    /// Spread mode as written into the metadata (blank means `auto`)
    pub fn effective_spread_mode(&self) -> &str {
        let trimmed = self.spread_mode.trim();
        if trimmed.is_empty() {
            DEFAULT_SPREAD_MODE
        } else {
            trimmed
        }
    }

    /// Return the configured book id, generating one if none was set.
    ///
    /// The generated id is stored so that every package document of the run
    /// shares it.
    pub fn ensure_book_id(&mut self) -> &str {
        self.book_id
            .get_or_insert_with(|| format!("urn:uuid:{}", uuid::Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_resolution_fallback() {
        let mut options = ConversionOptions::default();
        options.original_resolution = "800 X 600".to_string();
        assert_eq!(options.target_resolution(), Dimensions::new(800, 600));

        options.original_resolution = "garbage".to_string();
        assert_eq!(options.target_resolution(), DEFAULT_ORIGINAL_RESOLUTION);

        options.original_resolution = "1x2x3".to_string();
        assert_eq!(options.target_resolution(), DEFAULT_ORIGINAL_RESOLUTION);
    }

    #[test]
    fn test_ensure_book_id_is_stable() {
        let mut options = ConversionOptions::default();
        let first = options.ensure_book_id().to_string();
        assert!(first.starts_with("urn:uuid:"));
        assert_eq!(options.ensure_book_id(), first);

        options.book_id = Some("isbn:123".to_string());
        assert_eq!(options.ensure_book_id(), "isbn:123");
    }

    #[test]
    fn test_effective_spread_mode() {
        let mut options = ConversionOptions::default();
        options.spread_mode = "  landscape ".to_string();
        assert_eq!(options.effective_spread_mode(), "landscape");
        options.spread_mode = "   ".to_string();
        assert_eq!(options.effective_spread_mode(), "auto");
    }
}
