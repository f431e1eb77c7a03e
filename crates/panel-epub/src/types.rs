use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Source folder does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Staging folder not found: {}", .0.display())]
    StagingNotFound(PathBuf),
    #[error("'mimetype' file not found at: {}", .0.display())]
    MissingRootMarker(PathBuf),
    #[error("No input archives provided")]
    NoInputs,
}

pub type Result<T> = std::result::Result<T, EpubError>;

/// Page-turn order of the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ReadingDirection {
    /// Western order: pages turn to the left
    Ltr,
    /// Manga order: pages turn to the right
    #[default]
    Rtl,
}

impl ReadingDirection {
    /// Parse a direction, falling back to right-to-left on anything unrecognised.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReadingDirection::Ltr => "ltr",
            ReadingDirection::Rtl => "rtl",
        }
    }

    /// Value of the `primary-writing-mode` package hint
    pub fn primary_writing_mode(self) -> &'static str {
        match self {
            ReadingDirection::Ltr => "horizontal-lr",
            ReadingDirection::Rtl => "horizontal-rl",
        }
    }

    /// Side the `a` half of a double spread has to land on
    pub fn leading_half_side(self) -> Side {
        match self {
            ReadingDirection::Ltr => Side::Left,
            ReadingDirection::Rtl => Side::Right,
        }
    }
}

/// Reads any string, falling back to right-to-left like [`ReadingDirection::parse_lenient`]
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ReadingDirection {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&value))
    }
}

impl FromStr for ReadingDirection {
    type Err = EpubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ltr" => Ok(ReadingDirection::Ltr),
            "rtl" => Ok(ReadingDirection::Rtl),
            other => Err(EpubError::Config(format!(
                "Unknown reading direction '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ReadingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facing side of a page when the reader shows two pages at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Placement tag written on each spine itemref
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSpread {
    Left,
    Right,
    /// Only used for the cover
    Center,
}

impl PageSpread {
    pub fn as_str(self) -> &'static str {
        match self {
            PageSpread::Left => "left",
            PageSpread::Right => "right",
            PageSpread::Center => "center",
        }
    }
}

impl From<Side> for PageSpread {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => PageSpread::Left,
            Side::Right => PageSpread::Right,
        }
    }
}

/// Pixel size of an image or page viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a `"WxH"` string such as `1072x1448`
    pub fn parse(value: &str) -> Option<Self> {
        let lowered = value.to_ascii_lowercase();
        let mut parts = lowered.split('x');
        let width = parts.next()?.trim().parse().ok()?;
        let height = parts.next()?.trim().parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { width, height })
    }

    pub fn parse_or(value: &str, default: Self) -> Self {
        Self::parse(value).unwrap_or(default)
    }

    /// Width divided by height, or 0 for a degenerate height
    pub fn aspect_ratio(self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One staged source image, as probed before any splitting
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePage {
    /// File name inside the Images folder
    pub file_name: String,
    /// File name without its extension
    pub stem: String,
    /// Extension without the dot, original case preserved
    pub extension: String,
    pub dimensions: Dimensions,
    /// False when the fallback size was used because decoding failed
    pub probed: bool,
}

/// Which half of a split double spread an image holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfPart {
    /// First half in reading order
    A,
    /// Second half in reading order
    B,
}

impl HalfPart {
    pub fn suffix(self) -> &'static str {
        match self {
            HalfPart::A => "a",
            HalfPart::B => "b",
        }
    }
}

/// How a rendered image came to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRole {
    /// Original file kept as-is
    Single,
    /// One half of a split double spread; `root` is the sanitized base of the original
    Half { root: String, part: HalfPart },
}

/// An image file that ends up in the package
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub file_name: String,
    /// Sanitized base name used for page and manifest ids
    pub base: String,
    pub extension: String,
    pub dimensions: Dimensions,
    pub role: ImageRole,
}

impl RenderedImage {
    /// True when `other` is the `b` half completing this `a` half
    pub fn pairs_with(&self, other: &RenderedImage) -> bool {
        match (&self.role, &other.role) {
            (
                ImageRole::Half {
                    root,
                    part: HalfPart::A,
                },
                ImageRole::Half {
                    root: other_root,
                    part: HalfPart::B,
                },
            ) => root == other_root && self.extension.eq_ignore_ascii_case(&other.extension),
            _ => false,
        }
    }
}

/// One fixed-layout XHTML content page
#[derive(Debug, Clone, PartialEq)]
pub struct PageDocument {
    pub id: String,
    /// File name inside the Text folder
    pub file_name: String,
    pub viewport: Dimensions,
    /// Image displayed by the page; `None` for a blank page
    pub image_file: Option<String>,
}

/// Ordered reference into the manifest with its facing side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineEntry {
    pub idref: String,
    pub spread: PageSpread,
}

/// A resource declared in the package manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    /// Path relative to the OEBPS folder
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
}

impl ManifestItem {
    pub fn new(id: impl Into<String>, href: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
        }
    }

    pub fn with_properties(mut self, properties: impl Into<String>) -> Self {
        self.properties = Some(properties.into());
        self
    }
}
