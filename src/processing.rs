use crate::analysis::ImageAnalyzer;
use crate::archive::clean_label;
use crate::constants::{
    AGGRESSIVE_SOURCE_MIN_MB, BYTES_PER_MB, COMPRESSED_SUFFIX, CONVERGENCE_MAX_ATTEMPTS,
    CONVERGENCE_QUALITY_FLOOR, CONVERGENCE_QUALITY_STEP, CONVERGENCE_TARGET_MB, ORIGINAL_SUFFIX,
    OUTPUT_EXTENSION,
};
use crate::error::{CompressionError, Result};
use crate::policy::{select_policy, Category, CompressionSettings};
use crate::resize::resize_to_max_dimension;
use crate::utils::{bytes_to_mb, savings_percent};
use image::codecs::jpeg::JpegEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, Rgb, RgbImage};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Result of compressing one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOutcome {
    pub source_name: String,
    /// Name of the file written to the compressed directory.
    pub output_name: String,
    pub original_bytes: u64,
    pub final_bytes: u64,
    pub category: Category,
    /// Quality of the last JPEG encode, even when the original was kept.
    pub quality: u8,
    pub attempts: u32,
    /// The encode came out larger than the source, which was copied instead.
    pub kept_original: bool,
}

impl CompressionOutcome {
    pub fn original_mb(&self) -> f64 {
        bytes_to_mb(self.original_bytes)
    }

    pub fn final_mb(&self) -> f64 {
        bytes_to_mb(self.final_bytes)
    }

    pub fn savings_percent(&self) -> f64 {
        savings_percent(self.original_mb(), self.final_mb()).unwrap_or(0.0)
    }
}

/// Final bytes of an encode loop along with how it got there.
#[derive(Debug, Clone, PartialEq)]
pub struct Convergence {
    pub bytes: Vec<u8>,
    pub quality: u8,
    pub attempts: u32,
}

/// Re-encode with decreasing quality until the output fits `target_bytes`.
///
/// Quality starts at `start_quality`, drops by a fixed step per attempt and
/// never goes below the floor. The loop stops as soon as the output fits,
/// the floor is reached, or the attempt cap is hit; in the last case the
/// final encoding is returned even though it is still over target.
pub fn converge<F>(start_quality: u8, target_bytes: u64, mut encode: F) -> Result<Convergence>
where
    F: FnMut(u8) -> Result<Vec<u8>>,
{
    let mut quality = start_quality;
    let mut attempts = 0;

    loop {
        let bytes = encode(quality)?;
        attempts += 1;
        debug!(
            "Attempt {}: quality {} -> {} bytes",
            attempts,
            quality,
            bytes.len()
        );

        let fits = bytes.len() as u64 <= target_bytes;
        if fits || quality <= CONVERGENCE_QUALITY_FLOOR || attempts >= CONVERGENCE_MAX_ATTEMPTS {
            return Ok(Convergence {
                bytes,
                quality,
                attempts,
            });
        }

        quality = quality
            .saturating_sub(CONVERGENCE_QUALITY_STEP)
            .max(CONVERGENCE_QUALITY_FLOOR);
    }
}

/// Encode an RGB image as baseline JPEG at the given quality.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder.encode_image(img)?;
    Ok(buffer)
}

/// Decode a file and apply its embedded EXIF orientation.
pub fn load_oriented(path: &Path) -> Result<DynamicImage> {
    let unreadable = |reason: String| CompressionError::UnreadableImage(path.to_path_buf(), reason);

    let mut decoder = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| unreadable(e.to_string()))?
        .into_decoder()
        .map_err(|e| unreadable(e.to_string()))?;

    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| unreadable(e.to_string()))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Composite any alpha channel over opaque white and return 8-bit RGB.
///
/// Palette sources arrive here already expanded to RGBA by the decoder.
pub fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }

    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut flattened = RgbImage::new(width, height);

    for (dst, src) in flattened.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u16;
        let blend = |channel: u8| ((channel as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *dst = Rgb([blend(src[0]), blend(src[1]), blend(src[2])]);
    }

    flattened
}

/// `<label>_<stem>_compressed.jpg`, or `<label>_<stem>_original.<ext>` for
/// the copy-through fallback. The label prefix is left out when empty.
pub fn output_name_for(source: &Path, label: &str, kept_original: bool) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let base = if label.is_empty() {
        stem
    } else {
        format!("{}_{}", label, stem)
    };

    if kept_original {
        match source.extension() {
            Some(ext) => format!("{}{}.{}", base, ORIGINAL_SUFFIX, ext.to_string_lossy()),
            None => format!("{}{}", base, ORIGINAL_SUFFIX),
        }
    } else {
        format!("{}{}.{}", base, COMPRESSED_SUFFIX, OUTPUT_EXTENSION)
    }
}

/// Pick a free path for `name` in `dir`, appending `_<n>` to the stem on collision.
fn unique_output_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (2..)
        .map(|n| dir.join(format!("{}_{}{}", stem, n, extension)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Encodes single source files into the compressed-output directory.
pub struct Compressor {
    analyzer: ImageAnalyzer,
    settings: CompressionSettings,
    output_dir: PathBuf,
    label: String,
}

impl Compressor {
    pub fn new(output_dir: impl Into<PathBuf>, settings: CompressionSettings) -> Self {
        Self {
            analyzer: ImageAnalyzer::default(),
            settings,
            output_dir: output_dir.into(),
            label: String::new(),
        }
    }

    /// Prefix for output file names; sanitized like archive labels.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = clean_label(label);
        self
    }

    /// Swap in an analyzer with a different pre-optimized source detector.
    pub fn with_analyzer(mut self, analyzer: ImageAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Compress one file into the output directory. The source is never modified.
    ///
    /// # Errors
    /// * `UnreadableImage` / `DegenerateImage` - the source cannot be analyzed or decoded
    /// * `EncodeFailure` - encoding or writing the output failed
    pub fn compress(&self, input: &Path) -> Result<CompressionOutcome> {
        let analysis = self.analyzer.analyze(input)?;
        let policy = select_policy(&analysis, &self.settings);
        debug!(
            "{}: {} ({}), {:.2} MB, {}x{}",
            input.display(),
            policy.category,
            policy.description,
            analysis.file_size_mb,
            analysis.width,
            analysis.height
        );

        let img = load_oriented(input)?;
        let flattened = DynamicImage::ImageRgb8(flatten_to_rgb(img));
        let resized = resize_to_max_dimension(flattened, policy.max_dimension).into_rgb8();

        let compressed_name = output_name_for(input, &self.label, false);
        let encode_failure = |reason: String| {
            CompressionError::EncodeFailure(self.output_dir.join(&compressed_name), reason)
        };
        let encode = |quality: u8| encode_jpeg(&resized, quality).map_err(|e| encode_failure(e.to_string()));

        let converged = if policy.aggressive && analysis.file_size_mb > AGGRESSIVE_SOURCE_MIN_MB {
            let target_bytes = (CONVERGENCE_TARGET_MB * BYTES_PER_MB) as u64;
            converge(policy.quality, target_bytes, encode)?
        } else {
            Convergence {
                bytes: encode(policy.quality)?,
                quality: policy.quality,
                attempts: 1,
            }
        };

        let kept_original = converged.bytes.len() as u64 > analysis.file_size_bytes;
        let output_name = output_name_for(input, &self.label, kept_original);
        let output_path = unique_output_path(&self.output_dir, &output_name);

        let final_bytes = if kept_original {
            debug!(
                "{}: encoded {} bytes exceeds original {} bytes, keeping original",
                input.display(),
                converged.bytes.len(),
                analysis.file_size_bytes
            );
            fs::copy(input, &output_path)
                .map_err(|e| CompressionError::EncodeFailure(output_path.clone(), e.to_string()))?
        } else {
            self.write_output(&output_path, &converged.bytes)?;
            converged.bytes.len() as u64
        };

        Ok(CompressionOutcome {
            source_name: file_name_of(input),
            output_name: file_name_of(&output_path),
            original_bytes: analysis.file_size_bytes,
            final_bytes,
            category: policy.category,
            quality: converged.quality,
            attempts: converged.attempts,
            kept_original,
        })
    }

    fn write_output(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let failure = |reason: String| CompressionError::EncodeFailure(path.to_path_buf(), reason);

        let mut temp = NamedTempFile::new_in(&self.output_dir).map_err(|e| failure(e.to_string()))?;
        temp.write_all(bytes).map_err(|e| failure(e.to_string()))?;
        temp.persist(path).map_err(|e| failure(e.error.to_string()))?;
        Ok(())
    }
}
