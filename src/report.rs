//! `results.json`: the per-session results document.

use crate::batch::BatchResult;
use crate::error::Result;
use crate::policy::Category;
use crate::utils::{bytes_to_mb, round_to};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Audit row for one compressed file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub name: String,
    pub output_name: String,
    pub original_mb: f64,
    pub compressed_mb: f64,
    pub savings: f64,
    pub category: Category,
    pub quality: u8,
    pub kept_original: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRecord {
    pub count: usize,
    pub original_mb: f64,
    pub compressed_mb: f64,
    /// Absent when the category's original size is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub successful: usize,
    pub failed: usize,
    pub total_original_mb: f64,
    pub total_compressed_mb: f64,
    pub savings_percent: f64,
    pub archive_name: String,
    pub archive_size_mb: f64,
    pub elapsed_seconds: f64,
    pub files: Vec<FileRecord>,
    pub failures: Vec<FailureRecord>,
    pub categories: BTreeMap<Category, CategoryRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchReport {
    Completed(SessionSummary),
    Error { error: String },
}

impl BatchReport {
    /// Build the completed report. Sizes are rounded to 2 decimals and
    /// percentages to 1.
    pub fn completed(result: &BatchResult, archive_name: &str, archive_bytes: u64) -> Self {
        let files = result
            .files
            .iter()
            .map(|outcome| FileRecord {
                name: outcome.source_name.clone(),
                output_name: outcome.output_name.clone(),
                original_mb: round_to(outcome.original_mb(), 2),
                compressed_mb: round_to(outcome.final_mb(), 2),
                savings: round_to(outcome.savings_percent(), 1),
                category: outcome.category,
                quality: outcome.quality,
                kept_original: outcome.kept_original,
            })
            .collect();

        let failures = result
            .failures
            .iter()
            .map(|failure| FailureRecord {
                name: failure.name.clone(),
                error: failure.error.to_string(),
            })
            .collect();

        let categories = result
            .categories
            .iter()
            .map(|(category, stats)| {
                let record = CategoryRecord {
                    count: stats.count,
                    original_mb: round_to(stats.original_mb, 2),
                    compressed_mb: round_to(stats.compressed_mb, 2),
                    savings: stats.savings_percent.map(|s| round_to(s, 1)),
                };
                (*category, record)
            })
            .collect();

        BatchReport::Completed(SessionSummary {
            successful: result.successful,
            failed: result.failed,
            total_original_mb: round_to(result.total_original_mb, 2),
            total_compressed_mb: round_to(result.total_compressed_mb, 2),
            savings_percent: round_to(result.savings_percent().unwrap_or(0.0), 1),
            archive_name: archive_name.to_string(),
            archive_size_mb: round_to(bytes_to_mb(archive_bytes), 2),
            elapsed_seconds: round_to(result.elapsed.as_secs_f64(), 2),
            files,
            failures,
            categories,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        BatchReport::Error {
            error: message.into(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, BatchReport::Completed(_))
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
