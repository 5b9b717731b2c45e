use crate::error::CompressionError;
use crate::policy::Category;
use crate::processing::{CompressionOutcome, Compressor};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::utils::savings_percent;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Running totals for one tier label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryStats {
    pub count: usize,
    pub original_mb: f64,
    pub compressed_mb: f64,
    /// Only set by [`BatchResult::finalize`], and left unset when
    /// `original_mb` is zero.
    pub savings_percent: Option<f64>,
}

/// A source file that could not be compressed.
#[derive(Debug)]
pub struct FileFailure {
    pub name: String,
    pub path: PathBuf,
    pub error: CompressionError,
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub successful: usize,
    pub failed: usize,
    pub total_original_mb: f64,
    pub total_compressed_mb: f64,
    /// Successful outcomes in input order.
    pub files: Vec<CompressionOutcome>,
    /// Failed files in input order.
    pub failures: Vec<FileFailure>,
    pub categories: BTreeMap<Category, CategoryStats>,
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.successful + self.failed
    }

    pub fn savings_percent(&self) -> Option<f64> {
        savings_percent(self.total_original_mb, self.total_compressed_mb)
    }

    /// Adds a compressed file to the totals and its category.
    pub fn record_success(&mut self, outcome: CompressionOutcome) {
        let original_mb = outcome.original_mb();
        let compressed_mb = outcome.final_mb();

        self.successful += 1;
        self.total_original_mb += original_mb;
        self.total_compressed_mb += compressed_mb;

        let stats = self.categories.entry(outcome.category).or_default();
        stats.count += 1;
        stats.original_mb += original_mb;
        stats.compressed_mb += compressed_mb;

        self.files.push(outcome);
    }

    /// Counts a failed file. Sizes and categories are left untouched.
    pub fn record_failure(&mut self, path: &Path, error: CompressionError) {
        self.failed += 1;
        self.failures.push(FileFailure {
            name: file_name_of(path),
            path: path.to_path_buf(),
            error,
        });
    }

    /// Computes per-category savings; call once all files are in.
    pub fn finalize(&mut self) {
        for stats in self.categories.values_mut() {
            stats.savings_percent = savings_percent(stats.original_mb, stats.compressed_mb);
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Runs a [`Compressor`] over an ordered list of source files.
pub struct BatchRunner<'a> {
    compressor: &'a Compressor,
    progress: &'a dyn ProgressSink,
}

impl<'a> BatchRunner<'a> {
    pub fn new(compressor: &'a Compressor, progress: &'a dyn ProgressSink) -> Self {
        Self {
            compressor,
            progress,
        }
    }

    /// Compress every file in order, then delete it from the uploads area.
    ///
    /// Sources are removed whether or not they compressed, so a bad upload
    /// is never retried. Per-file errors land in `failures` and never stop
    /// the batch.
    pub fn run(&self, files: &[PathBuf]) -> BatchResult {
        let start_time = Instant::now();
        let total = files.len();
        let mut result = BatchResult::default();

        info!("Compressing {} files", total);

        for (index, path) in files.iter().enumerate() {
            let name = file_name_of(path);
            self.progress
                .emit(ProgressEvent::compressing(index, total, &name));

            match self.compressor.compress(path) {
                Ok(outcome) => {
                    debug!(
                        "{} -> {} ({:.2} MB -> {:.2} MB, {})",
                        name,
                        outcome.output_name,
                        outcome.original_mb(),
                        outcome.final_mb(),
                        outcome.category
                    );
                    result.record_success(outcome);
                }
                Err(error) => {
                    debug!("{} failed: {}", name, error);
                    result.record_failure(path, error);
                }
            }

            if let Err(e) = fs::remove_file(path) {
                debug!("Could not remove source {}: {}", path.display(), e);
            }
        }

        self.progress.emit(ProgressEvent::archiving(total));

        result.finalize();
        result.elapsed = start_time.elapsed();
        info!(
            "Batch done: {} ok, {} failed in {:?}",
            result.successful, result.failed, result.elapsed
        );
        result
    }
}
