pub mod analysis;
pub mod archive;
pub mod batch;
pub mod cli;
pub mod constants;
pub mod error;
pub mod formats;
pub mod info;
pub mod logger;
pub mod pipeline;
pub mod policy;
pub mod processing;
pub mod progress;
pub mod report;
pub mod resize;
pub mod session;
pub mod utils;

pub use analysis::{
    FilenameMarker, ImageAnalysis, ImageAnalyzer, NoOptimizedSources, OptimizedSourceDetector,
};
pub use archive::{sanitize_label, Archiver};
pub use batch::{BatchResult, BatchRunner, CategoryStats, FileFailure};
pub use error::{CompressionError, Result};
pub use formats::SourceFormat;
pub use pipeline::{run_session, run_session_with, SessionOutcome};
pub use policy::{select_policy, Category, CompressionPolicy, CompressionSettings};
pub use processing::{converge, CompressionOutcome, Compressor, Convergence};
pub use progress::{ProgressEvent, ProgressSink, Stage};
pub use report::BatchReport;
pub use resize::resize_to_max_dimension;
pub use session::{prune_sessions, SessionLayout};
