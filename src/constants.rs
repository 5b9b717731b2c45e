pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// Tier thresholds. A tier matches when either the size or the dimension
// threshold is strictly exceeded.
pub const KNOWN_OPTIMIZED_MAX_MB: f64 = 0.5;
pub const HUGE_SIZE_MB: f64 = 10.0;
pub const HUGE_DIMENSION: u32 = 3000;
pub const LARGE_SIZE_MB: f64 = 2.0;
pub const LARGE_DIMENSION: u32 = 2000;
pub const MEDIUM_SIZE_MB: f64 = 0.5;
pub const MEDIUM_DIMENSION: u32 = 1000;

pub const KNOWN_OPTIMIZED_QUALITY: u8 = 90;
pub const HUGE_QUALITY: u8 = 60;
pub const HUGE_MAX_DIMENSION: u32 = 1200;
pub const LARGE_QUALITY: u8 = 75;
pub const LARGE_MAX_DIMENSION: u32 = 1400;
pub const MEDIUM_QUALITY: u8 = 85;
pub const MEDIUM_MAX_DIMENSION: u32 = 1600;
pub const SMALL_QUALITY: u8 = 90;

// Iterative convergence
pub const AGGRESSIVE_SOURCE_MIN_MB: f64 = 5.0;
pub const CONVERGENCE_TARGET_MB: f64 = 1.0;
pub const CONVERGENCE_QUALITY_FLOOR: u8 = 30;
pub const CONVERGENCE_QUALITY_STEP: u8 = 10;
pub const CONVERGENCE_MAX_ATTEMPTS: u32 = 5;

pub const DEFAULT_OPTIMIZED_MARKER: &str = "whatsapp";

pub const DEFAULT_ARCHIVE_LABEL: &str = "Archive";
pub const ARCHIVE_EXTENSION: &str = "zip";
pub const COMPRESSED_SUFFIX: &str = "_compressed";
pub const ORIGINAL_SUFFIX: &str = "_original";
pub const OUTPUT_EXTENSION: &str = "jpg";

pub const UPLOADS_DIR: &str = "uploads";
pub const COMPRESSED_DIR: &str = "compressed";
pub const ARCHIVES_DIR: &str = "archives";
pub const RESULTS_FILE: &str = "results.json";
pub const PROGRESS_FILE: &str = "progress.json";

pub const DEFAULT_SESSION_MAX_AGE_HOURS: u64 = 24;

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Savings:";
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const INFO_PREFIX: &str = "📋";
