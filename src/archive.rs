use crate::constants::{ARCHIVE_EXTENSION, DEFAULT_ARCHIVE_LABEL};
use crate::error::{CompressionError, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Keep only alphanumerics, spaces, hyphens and underscores, then trim.
pub fn clean_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// [`clean_label`], falling back to the default label when nothing is left.
pub fn sanitize_label(label: &str) -> String {
    let cleaned = clean_label(label);
    if cleaned.is_empty() {
        DEFAULT_ARCHIVE_LABEL.to_string()
    } else {
        cleaned
    }
}

/// Regular, non-hidden files directly inside `dir`, sorted by name.
///
/// Hidden names are skipped so that `.tmpXXXXXX` leftovers from an
/// interrupted `NamedTempFile` write never reach the archive. Compressed
/// outputs are always named after their upload, and hidden uploads are
/// never collected, so no real output starts with a dot.
fn archivable_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if entry.file_type()?.is_file() && !hidden {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Packs the compressed-output directory into a single zip archive.
pub struct Archiver {
    compressed_dir: PathBuf,
    archives_dir: PathBuf,
}

impl Archiver {
    pub fn new(compressed_dir: impl Into<PathBuf>, archives_dir: impl Into<PathBuf>) -> Self {
        Self {
            compressed_dir: compressed_dir.into(),
            archives_dir: archives_dir.into(),
        }
    }

    pub fn archive_path(&self, label: &str) -> PathBuf {
        self.archives_dir
            .join(format!("{}.{}", sanitize_label(label), ARCHIVE_EXTENSION))
    }

    /// Write `<label>.zip` holding every file in the compressed directory,
    /// then empty that directory.
    ///
    /// The archive is fully written and renamed into place before anything
    /// is deleted; on `ArchiveWriteFailure` the compressed files are left
    /// untouched.
    pub fn create(&self, label: &str) -> Result<PathBuf> {
        let archive_path = self.archive_path(label);
        let failure =
            |reason: String| CompressionError::ArchiveWriteFailure(archive_path.clone(), reason);

        let files = archivable_files(&self.compressed_dir).map_err(|e| failure(e.to_string()))?;
        info!(
            "Archiving {} files into {}",
            files.len(),
            archive_path.display()
        );

        let temp = NamedTempFile::new_in(&self.archives_dir).map_err(|e| failure(e.to_string()))?;
        let mut writer = ZipWriter::new(temp);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for path in &files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| failure(e.to_string()))?;
            let mut source = BufReader::new(File::open(path).map_err(|e| failure(e.to_string()))?);
            io::copy(&mut source, &mut writer).map_err(|e| failure(e.to_string()))?;
        }

        let temp = writer.finish().map_err(|e| failure(e.to_string()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| failure(e.to_string()))?;
        temp.persist(&archive_path)
            .map_err(|e| failure(e.error.to_string()))?;

        for path in &files {
            if let Err(e) = fs::remove_file(path) {
                debug!("Could not remove {}: {}", path.display(), e);
            }
        }

        Ok(archive_path)
    }
}
