//! Validated rendering options, one record per request.

use std::num::{NonZeroU8, NonZeroU64};

pub const DEFAULT_PAGE_SIZE: &str = "A4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
}

impl ImageFormat {
    /// Value passed to `--format`.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpg => "image/jpeg",
        }
    }
}

/// Options for a PDF render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    pub grayscale: bool,
    pub low_quality: bool,
    pub forms: bool,
    pub images: bool,
    pub javascript: bool,
    pub orientation: Orientation,
    pub page_size: String,
    /// `None` when the request carried no (or an empty) title.
    pub title: Option<String>,
    pub image_dpi: Option<NonZeroU64>,
    pub image_quality: Option<NonZeroU64>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            grayscale: false,
            low_quality: false,
            forms: false,
            images: true,
            javascript: true,
            orientation: Orientation::Portrait,
            page_size: DEFAULT_PAGE_SIZE.to_string(),
            title: None,
            image_dpi: None,
            image_quality: None,
        }
    }
}

/// Options for a raster image render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub crop_height: Option<NonZeroU64>,
    pub crop_width: Option<NonZeroU64>,
    pub crop_x: Option<NonZeroU64>,
    pub crop_y: Option<NonZeroU64>,
    pub disable_smart_width: bool,
    pub images: bool,
    pub javascript: bool,
    pub format: ImageFormat,
    pub height: Option<NonZeroU64>,
    pub width: Option<NonZeroU64>,
    /// Always within `1..=100`.
    pub quality: Option<NonZeroU8>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            crop_height: None,
            crop_width: None,
            crop_x: None,
            crop_y: None,
            disable_smart_width: false,
            images: true,
            javascript: true,
            format: ImageFormat::Png,
            height: None,
            width: None,
            quality: None,
        }
    }
}
