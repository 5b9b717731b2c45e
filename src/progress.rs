//! Progress reporting for batch runs.
//!
//! Events are informational only. Sinks may drop them, and nothing in the
//! pipeline waits on delivery.

use crate::error::Result;
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Compressing,
    Archiving,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Percentage of the batch done, 0-100.
    pub progress: u8,
    pub current_file: String,
    pub stage: Stage,
    /// 1-based position of the current file.
    pub index: usize,
    pub total: usize,
}

impl ProgressEvent {
    /// Emitted before file `index` (0-based) of `total` is compressed.
    pub fn compressing(index: usize, total: usize, file_name: &str) -> Self {
        let progress = if total == 0 {
            0
        } else {
            (index * 100 / total).min(100) as u8
        };
        Self {
            progress,
            current_file: file_name.to_string(),
            stage: Stage::Compressing,
            index: index + 1,
            total,
        }
    }

    /// Emitted once every file has been processed.
    pub fn archiving(total: usize) -> Self {
        Self {
            progress: 100,
            current_file: "Creating archive...".to_string(),
            stage: Stage::Archiving,
            index: total,
            total,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Forwards events over a channel; a closed receiver is ignored.
pub struct ChannelProgress {
    sender: Sender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgress {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }
}

impl ProgressSink for ProgressBar {
    fn emit(&self, event: ProgressEvent) {
        self.set_length(event.total as u64);
        match event.stage {
            Stage::Compressing => {
                self.set_position(event.index.saturating_sub(1) as u64);
                self.set_message(event.current_file);
            }
            Stage::Archiving => {
                self.set_position(event.total as u64);
                self.set_message(event.current_file);
            }
        }
    }
}

/// Mirrors the latest event into a JSON file, overwriting it each time.
#[derive(Debug, Clone)]
pub struct ProgressFile {
    path: PathBuf,
}

impl ProgressFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, event: &ProgressEvent) -> Result<()> {
        let json = serde_json::to_string_pretty(event)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ProgressSink for ProgressFile {
    fn emit(&self, event: ProgressEvent) {
        if let Err(e) = self.write(&event) {
            tracing::debug!("Dropping progress event for {}: {}", self.path.display(), e);
        }
    }
}

/// Sends every event to each inner sink in order.
pub struct FanOut<'a> {
    sinks: Vec<&'a dyn ProgressSink>,
}

impl<'a> FanOut<'a> {
    pub fn new(sinks: Vec<&'a dyn ProgressSink>) -> Self {
        Self { sinks }
    }
}

impl ProgressSink for FanOut<'_> {
    fn emit(&self, event: ProgressEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}
