use crate::constants::DEFAULT_OPTIMIZED_MARKER;
use crate::error::{CompressionError, Result};
use crate::formats::SourceFormat;
use crate::utils::bytes_to_mb;
use image::{ImageDecoder, ImageReader};
use std::fs;
use std::path::Path;

/// Signals extracted from one source file, used to pick a compression policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAnalysis {
    pub file_size_bytes: u64,
    pub file_size_mb: f64,
    pub width: u32,
    pub height: u32,
    pub max_dimension: u32,
    pub aspect_ratio: f64,
    pub format: SourceFormat,
    /// The file looks like it was already optimized by a known producer.
    pub likely_optimized: bool,
    pub has_alpha: bool,
}

/// Decides whether a file was already optimized by a known producer, so
/// that it gets a light touch instead of another lossy pass.
pub trait OptimizedSourceDetector: Send + Sync {
    fn is_optimized(&self, path: &Path) -> bool;
}

/// Case-insensitive substring match on the file name.
#[derive(Debug, Clone)]
pub struct FilenameMarker {
    marker: String,
}

impl FilenameMarker {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_lowercase(),
        }
    }
}

impl Default for FilenameMarker {
    fn default() -> Self {
        Self::new(DEFAULT_OPTIMIZED_MARKER)
    }
}

impl OptimizedSourceDetector for FilenameMarker {
    fn is_optimized(&self, path: &Path) -> bool {
        if self.marker.is_empty() {
            return false;
        }
        path.file_name()
            .map(|name| name.to_string_lossy().to_lowercase().contains(&self.marker))
            .unwrap_or(false)
    }
}

/// Never flags anything as pre-optimized.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOptimizedSources;

impl OptimizedSourceDetector for NoOptimizedSources {
    fn is_optimized(&self, _path: &Path) -> bool {
        false
    }
}

pub struct ImageAnalyzer {
    detector: Box<dyn OptimizedSourceDetector>,
}

impl Default for ImageAnalyzer {
    fn default() -> Self {
        Self::new(Box::new(FilenameMarker::default()))
    }
}

impl ImageAnalyzer {
    pub fn new(detector: Box<dyn OptimizedSourceDetector>) -> Self {
        Self { detector }
    }

    /// Inspects a file without decoding its pixel data.
    ///
    /// Dimensions and color type come from the image header. The `image`
    /// crate expands palette images while reading the header, so a PNG
    /// palette carrying a `tRNS` chunk reports an RGBA color type and is
    /// detected as transparent like any direct alpha mode.
    ///
    /// # Errors
    /// * `UnreadableImage` - missing, empty, corrupt or unsupported file
    /// * `DegenerateImage` - a zero width or height in the header
    pub fn analyze(&self, path: &Path) -> Result<ImageAnalysis> {
        let unreadable = |reason: String| CompressionError::UnreadableImage(path.to_path_buf(), reason);

        let file_size_bytes = fs::metadata(path)
            .map_err(|e| unreadable(e.to_string()))?
            .len();
        if file_size_bytes == 0 {
            return Err(unreadable("file is empty".to_string()));
        }

        let reader = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| unreadable(e.to_string()))?;

        let format = match reader.format() {
            Some(detected) => SourceFormat::from_image_format(detected)
                .ok_or_else(|| unreadable(format!("unsupported format {:?}", detected)))?,
            None => return Err(unreadable("unrecognized image format".to_string())),
        };

        let decoder = reader.into_decoder().map_err(|e| unreadable(e.to_string()))?;
        let (width, height) = decoder.dimensions();
        let has_alpha = decoder.color_type().has_alpha();

        if width == 0 || height == 0 {
            return Err(CompressionError::DegenerateImage(
                path.to_path_buf(),
                width,
                height,
            ));
        }

        Ok(ImageAnalysis {
            file_size_bytes,
            file_size_mb: bytes_to_mb(file_size_bytes),
            width,
            height,
            max_dimension: width.max(height),
            aspect_ratio: width as f64 / height as f64,
            format,
            likely_optimized: self.detector.is_optimized(path),
            has_alpha,
        })
    }
}
