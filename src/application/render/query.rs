//! Query-string parsing into validated options records.

use std::{
    collections::HashMap,
    num::{NonZeroU8, NonZeroU64},
};

use crate::domain::{
    error::InvalidOption,
    options::{DEFAULT_PAGE_SIZE, DocumentOptions, ImageFormat, ImageOptions, Orientation},
};

const MAX_IMAGE_QUALITY: i64 = 100;

/// Decoded query parameters of a single request.
///
/// Only the first occurrence of a key is kept, and an empty value reads the
/// same as a missing key.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut values = HashMap::new();
        if let Some(raw) = raw {
            for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
                values
                    .entry(key.into_owned())
                    .or_insert_with(|| value.into_owned());
            }
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// `"1"` is the only truthy value.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("1")
    }

    /// Absent keys and non-positive values both yield `None`; only text that
    /// does not parse as an integer is an error.
    pub fn positive_int(&self, key: &'static str) -> Result<Option<NonZeroU64>, InvalidOption> {
        Ok(self
            .int(key)?
            .filter(|value| *value > 0)
            .and_then(|value| u64::try_from(value).ok())
            .and_then(NonZeroU64::new))
    }

    fn int(&self, key: &'static str) -> Result<Option<i64>, InvalidOption> {
        self.get(key)
            .map(|value| value.parse::<i64>().map_err(|_| InvalidOption::value(key)))
            .transpose()
    }
}

pub fn parse_document_options(params: &QueryParams) -> Result<DocumentOptions, InvalidOption> {
    let image_dpi = params.positive_int("imagedpi")?;
    let image_quality = params.positive_int("imagequality")?;

    let orientation = match params.get("orientation") {
        None | Some("P") => Orientation::Portrait,
        Some("L") => Orientation::Landscape,
        Some(_) => return Err(InvalidOption::value("orientation")),
    };

    let page_size = params.get("pagesize").unwrap_or(DEFAULT_PAGE_SIZE).to_string();
    let title = params.get("title").map(str::to_string);

    Ok(DocumentOptions {
        grayscale: params.flag("grayscale"),
        low_quality: params.flag("lowquality"),
        forms: params.flag("forms"),
        images: !params.flag("noimages"),
        javascript: !params.flag("nojavascript"),
        orientation,
        page_size,
        title,
        image_dpi,
        image_quality,
    })
}

pub fn parse_image_options(params: &QueryParams) -> Result<ImageOptions, InvalidOption> {
    let crop_height = params.positive_int("cropheight")?;
    let crop_width = params.positive_int("cropwidth")?;
    let crop_x = params.positive_int("cropx")?;
    let crop_y = params.positive_int("cropy")?;
    let quality = parse_quality(params)?;
    let height = params.positive_int("height")?;
    let width = params.positive_int("width")?;

    let format = match params.get("format") {
        None | Some("png") => ImageFormat::Png,
        Some("jpg") => ImageFormat::Jpg,
        Some(_) => return Err(InvalidOption::format()),
    };

    Ok(ImageOptions {
        crop_height,
        crop_width,
        crop_x,
        crop_y,
        disable_smart_width: params.flag("disablesmartwidth"),
        images: !params.flag("noimages"),
        javascript: !params.flag("nojavascript"),
        format,
        height,
        width,
        quality,
    })
}

fn parse_quality(params: &QueryParams) -> Result<Option<NonZeroU8>, InvalidOption> {
    match params.int("quality")? {
        Some(value) if value > MAX_IMAGE_QUALITY => Err(InvalidOption::value("quality")),
        Some(value) if value > 0 => Ok(u8::try_from(value).ok().and_then(NonZeroU8::new)),
        _ => Ok(None),
    }
}
