//! Source image formats accepted by the pipeline
//!
//! Output is always JPEG; these are the formats an upload may arrive in.

use image::ImageFormat;
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceFormat {
    Jpeg,
    Png,
    Bmp,
    Tiff,
    WebP,
}

impl SourceFormat {
    /// Maps a format detected by the `image` crate, `None` when the
    /// pipeline does not accept it.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            ImageFormat::Png => Some(SourceFormat::Png),
            ImageFormat::Bmp => Some(SourceFormat::Bmp),
            ImageFormat::Tiff => Some(SourceFormat::Tiff),
            ImageFormat::WebP => Some(SourceFormat::WebP),
            _ => None,
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SourceFormat::Jpeg),
            "png" => Some(SourceFormat::Png),
            "bmp" => Some(SourceFormat::Bmp),
            "tif" | "tiff" => Some(SourceFormat::Tiff),
            "webp" => Some(SourceFormat::WebP),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Png => "PNG",
            SourceFormat::Bmp => "BMP",
            SourceFormat::Tiff => "TIFF",
            SourceFormat::WebP => "WEBP",
        };
        write!(f, "{}", name)
    }
}

/// Check whether a path carries one of the accepted source extensions
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(SourceFormat::from_extension)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_image_format() {
        assert_eq!(
            SourceFormat::from_image_format(ImageFormat::Jpeg),
            Some(SourceFormat::Jpeg)
        );
        assert_eq!(
            SourceFormat::from_image_format(ImageFormat::WebP),
            Some(SourceFormat::WebP)
        );
        assert_eq!(SourceFormat::from_image_format(ImageFormat::Gif), None);
        assert_eq!(SourceFormat::from_image_format(ImageFormat::Avif), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(SourceFormat::from_extension("JPEG"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_extension("tif"), Some(SourceFormat::Tiff));
        assert_eq!(SourceFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("photo.jpg")));
        assert!(is_image_file(Path::new("photo.PNG")));
        assert!(is_image_file(Path::new("scan.tiff")));
        assert!(is_image_file(Path::new("pic.webp")));
        assert!(is_image_file(Path::new("old.bmp")));

        assert!(!is_image_file(Path::new("anim.gif")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("README")));
    }

    #[test]
    fn test_display() {
        assert_eq!(SourceFormat::Jpeg.to_string(), "JPEG");
        assert_eq!(SourceFormat::WebP.to_string(), "WEBP");
    }
}
