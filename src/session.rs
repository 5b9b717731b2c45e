//! On-disk layout of one batch run.
//!
//! A session directory owns three subdirectories: `uploads/` holds the
//! sources, `compressed/` the intermediate outputs and `archives/` the
//! final zip. One session is never shared between concurrent runs.

use crate::constants::{ARCHIVES_DIR, COMPRESSED_DIR, UPLOADS_DIR};
use crate::error::{CompressionError, Result};
use crate::formats::is_image_file;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLayout {
    pub root: PathBuf,
    pub uploads: PathBuf,
    pub compressed: PathBuf,
    pub archives: PathBuf,
}

impl SessionLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            uploads: root.join(UPLOADS_DIR),
            compressed: root.join(COMPRESSED_DIR),
            archives: root.join(ARCHIVES_DIR),
            root,
        }
    }

    /// Check that `uploads/` exists and create the two output directories.
    ///
    /// Must run once before the batch starts; any failure here is fatal to
    /// the whole session.
    pub fn prepare(&self) -> Result<()> {
        if !self.uploads.is_dir() {
            return Err(CompressionError::DirectorySetupFailure(
                self.uploads.clone(),
                "uploads directory does not exist".to_string(),
            ));
        }

        for dir in [&self.compressed, &self.archives] {
            fs::create_dir_all(dir)
                .map_err(|e| CompressionError::DirectorySetupFailure(dir.clone(), e.to_string()))?;
        }

        debug!("Prepared session {}", self.root.display());
        Ok(())
    }

    /// Regular, non-hidden files with an accepted image extension directly
    /// inside `uploads/`, sorted by name.
    ///
    /// Only the extension is checked here; content that does not decode
    /// fails later as a per-file error.
    pub fn collect_uploads(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.uploads)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| CompressionError::Io(e.into()))?;
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !entry.file_type().is_file() || hidden {
                continue;
            }
            if !is_image_file(entry.path()) {
                debug!("Skipping {}: not an image extension", entry.path().display());
                continue;
            }
            files.push(entry.into_path());
        }

        if files.is_empty() {
            return Err(CompressionError::NoImageFilesFound(self.uploads.clone()));
        }
        Ok(files)
    }
}

/// Remove session directories under `root` last modified more than
/// `max_age` ago. Returns how many were removed.
///
/// A missing `root` prunes nothing. Plain files are ignored, and a
/// directory that cannot be inspected or removed is logged and skipped.
pub fn prune_sessions(root: &Path, max_age: Duration) -> Result<usize> {
    if !root.exists() {
        debug!("Session root {} does not exist", root.display());
        return Ok(0);
    }

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                warn!("Cannot read modification time of {}: {}", path.display(), e);
                continue;
            }
        };

        let age = now.duration_since(modified).unwrap_or_default();
        if age <= max_age {
            continue;
        }

        match fs::remove_dir_all(&path) {
            Ok(()) => {
                info!("Removed old session {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}
