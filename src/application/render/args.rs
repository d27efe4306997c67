//! Command-line construction for wkhtmltopdf and wkhtmltoimage.
//!
//! Argument order is fixed. The renderers let later flags win over earlier
//! ones, so reordering changes behaviour.

use std::fmt::Display;

use crate::domain::options::{DocumentOptions, ImageOptions};

/// Read the document from stdin and write the result to stdout.
const STDIO_PLACEHOLDERS: [&str; 2] = ["-", "-"];

pub const LICENSE_ARGS: &[&str] = &["--license"];
pub const VERSION_ARGS: &[&str] = &["--version"];

pub fn document_args(options: &DocumentOptions) -> Vec<String> {
    let mut args = ArgList::new();

    args.flag_if(options.grayscale, "--grayscale");
    args.flag_if(options.low_quality, "--lowquality");
    args.flag_if(options.forms, "--enable-forms");
    args.flag_if(!options.images, "--no-images");
    args.flag_if(!options.javascript, "--disable-javascript");
    args.pair("--orientation", options.orientation.as_str());
    args.pair("--page-size", &options.page_size);
    if let Some(title) = options.title.as_deref().filter(|title| !title.is_empty()) {
        args.pair("--title", title);
    }
    args.optional_pair("--image-dpi", options.image_dpi);
    args.optional_pair("--image-quality", options.image_quality);

    args.finish()
}

pub fn image_args(options: &ImageOptions) -> Vec<String> {
    let mut args = ArgList::new();

    args.optional_pair("--crop-h", options.crop_height);
    args.optional_pair("--crop-w", options.crop_width);
    args.optional_pair("--crop-x", options.crop_x);
    args.optional_pair("--crop-y", options.crop_y);
    args.flag_if(options.disable_smart_width, "--disable-smart-width");
    args.flag_if(!options.images, "--no-images");
    args.flag_if(!options.javascript, "--disable-javascript");
    args.pair("--format", options.format.as_str());
    args.optional_pair("--height", options.height);
    args.optional_pair("--width", options.width);
    args.optional_pair("--quality", options.quality);

    args.finish()
}

struct ArgList(Vec<String>);

impl ArgList {
    fn new() -> Self {
        Self(vec!["--encoding".to_string(), "utf-8".to_string()])
    }

    fn flag_if(&mut self, enabled: bool, flag: &str) {
        if enabled {
            self.0.push(flag.to_string());
        }
    }

    fn pair(&mut self, flag: &str, value: &str) {
        self.0.push(flag.to_string());
        self.0.push(value.to_string());
    }

    fn optional_pair<T: Display>(&mut self, flag: &str, value: Option<T>) {
        if let Some(value) = value {
            self.pair(flag, &value.to_string());
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.0.extend(STDIO_PLACEHOLDERS.map(String::from));
        self.0
    }
}

#[cfg(test)]
mod tests {
    use std::num::{NonZeroU8, NonZeroU64};

    use super::*;
    use crate::domain::options::{ImageFormat, Orientation};

    fn contains_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|pair| pair[0] == flag && pair[1] == value)
    }

    #[test]
    fn default_document_args() {
        let args = document_args(&DocumentOptions::default());
        assert_eq!(
            args,
            [
                "--encoding",
                "utf-8",
                "--orientation",
                "Portrait",
                "--page-size",
                "A4",
                "-",
                "-"
            ]
        );
    }

    #[test]
    fn every_document_option_in_order() {
        let options = DocumentOptions {
            grayscale: true,
            low_quality: true,
            forms: true,
            images: false,
            javascript: false,
            orientation: Orientation::Landscape,
            page_size: "Letter".to_string(),
            title: Some("Report".to_string()),
            image_dpi: NonZeroU64::new(300),
            image_quality: NonZeroU64::new(80),
        };

        assert_eq!(
            document_args(&options),
            [
                "--encoding",
                "utf-8",
                "--grayscale",
                "--lowquality",
                "--enable-forms",
                "--no-images",
                "--disable-javascript",
                "--orientation",
                "Landscape",
                "--page-size",
                "Letter",
                "--title",
                "Report",
                "--image-dpi",
                "300",
                "--image-quality",
                "80",
                "-",
                "-"
            ]
        );
    }

    #[test]
    fn images_flag_only_when_disabled() {
        let enabled = document_args(&DocumentOptions::default());
        assert!(!enabled.iter().any(|arg| arg.contains("images")));

        let disabled = document_args(&DocumentOptions {
            images: false,
            ..Default::default()
        });
        assert!(disabled.iter().any(|arg| arg == "--no-images"));
    }

    #[test]
    fn empty_title_is_omitted() {
        let args = document_args(&DocumentOptions {
            title: Some(String::new()),
            ..Default::default()
        });
        assert!(!args.iter().any(|arg| arg == "--title"));
    }

    #[test]
    fn every_image_option_in_order() {
        let options = ImageOptions {
            crop_height: NonZeroU64::new(10),
            crop_width: NonZeroU64::new(20),
            crop_x: NonZeroU64::new(30),
            crop_y: NonZeroU64::new(40),
            disable_smart_width: true,
            images: false,
            javascript: false,
            format: ImageFormat::Jpg,
            height: NonZeroU64::new(100),
            width: NonZeroU64::new(200),
            quality: NonZeroU8::new(75),
        };

        assert_eq!(
            image_args(&options),
            [
                "--encoding",
                "utf-8",
                "--crop-h",
                "10",
                "--crop-w",
                "20",
                "--crop-x",
                "30",
                "--crop-y",
                "40",
                "--disable-smart-width",
                "--no-images",
                "--disable-javascript",
                "--format",
                "jpg",
                "--height",
                "100",
                "--width",
                "200",
                "--quality",
                "75",
                "-",
                "-"
            ]
        );
    }

    #[test]
    fn image_args_always_carry_format() {
        let args = image_args(&ImageOptions::default());
        assert!(contains_pair(&args, "--format", "png"));
        assert_eq!(&args[..2], ["--encoding", "utf-8"]);
        assert_eq!(&args[args.len() - 2..], ["-", "-"]);
    }

    #[test]
    fn building_is_deterministic() {
        let options = ImageOptions {
            width: NonZeroU64::new(640),
            quality: NonZeroU8::new(90),
            ..Default::default()
        };
        assert_eq!(image_args(&options), image_args(&options.clone()));
    }
}
