use crate::archive::{sanitize_label, Archiver};
use crate::batch::{BatchResult, BatchRunner};
use crate::constants::RESULTS_FILE;
use crate::error::Result;
use crate::policy::CompressionSettings;
use crate::processing::Compressor;
use crate::progress::ProgressSink;
use crate::report::BatchReport;
use crate::session::SessionLayout;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything a finished session produced.
#[derive(Debug)]
pub struct SessionOutcome {
    pub result: BatchResult,
    pub archive: PathBuf,
    pub report: BatchReport,
}

/// Run one session end to end: prepare directories, compress every upload,
/// archive the outputs and write `results.json` into the session root.
///
/// Per-file failures are carried in the returned [`BatchResult`]. Fatal
/// errors abort the run, and an error report is written before returning.
pub fn run_session(
    layout: &SessionLayout,
    settings: &CompressionSettings,
    label: &str,
    progress: &dyn ProgressSink,
) -> Result<SessionOutcome> {
    let compressor = Compressor::new(&layout.compressed, settings.clone()).with_label(label);
    run_session_with(layout, &compressor, label, progress)
}

/// Like [`run_session`] with a preconfigured [`Compressor`], whose output
/// directory should be the session's `compressed/`.
pub fn run_session_with(
    layout: &SessionLayout,
    compressor: &Compressor,
    label: &str,
    progress: &dyn ProgressSink,
) -> Result<SessionOutcome> {
    match execute(layout, compressor, label, progress) {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            write_report(layout, &BatchReport::error(e.to_string()));
            Err(e)
        }
    }
}

fn execute(
    layout: &SessionLayout,
    compressor: &Compressor,
    label: &str,
    progress: &dyn ProgressSink,
) -> Result<SessionOutcome> {
    layout.prepare()?;
    let files = layout.collect_uploads()?;
    info!(
        "Session {}: {} uploads, label {:?}",
        layout.root.display(),
        files.len(),
        sanitize_label(label)
    );

    let result = BatchRunner::new(compressor, progress).run(&files);

    let archive = Archiver::new(&layout.compressed, &layout.archives).create(label)?;
    let archive_bytes = fs::metadata(&archive)?.len();
    let archive_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let report = BatchReport::completed(&result, &archive_name, archive_bytes);
    write_report(layout, &report);

    Ok(SessionOutcome {
        result,
        archive,
        report,
    })
}

fn write_report(layout: &SessionLayout, report: &BatchReport) {
    let path = layout.root.join(RESULTS_FILE);
    if let Err(e) = report.write_json(&path) {
        debug!("Could not write {}: {}", path.display(), e);
    }
}
