use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use squeeze_batch::cli::{Args, Commands, SettingsArgs};
use squeeze_batch::constants::{
    COMPRESSED_SIZE_PREFIX, COMPRESSION_RATIO_PREFIX, ERROR_PREFIX, ORIGINAL_SIZE_PREFIX,
    PROGRESS_FILE, SUCCESS_PREFIX, WARNING_PREFIX,
};
use squeeze_batch::info::{get_image_info, print_image_info};
use squeeze_batch::logger;
use squeeze_batch::progress::{FanOut, ProgressFile, ProgressSink};
use squeeze_batch::utils::{create_progress_bar, format_file_size};
use squeeze_batch::{
    prune_sessions, run_session, CompressionSettings, ImageAnalyzer, SessionLayout, SessionOutcome,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::warn;

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    match execute(args.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", ERROR_PREFIX, e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when some session failed but others may have succeeded.
fn execute(command: Commands) -> Result<bool> {
    match command {
        Commands::Run {
            sessions,
            label,
            settings,
            progress_file,
            threads,
        } => {
            let settings = settings.resolve().context("Invalid compression settings")?;
            setup_thread_pool(threads);
            Ok(run_sessions(&sessions, &label, &settings, progress_file))
        }
        Commands::Analyze { input, settings } => {
            analyze(&input, &settings)?;
            Ok(true)
        }
        Commands::Prune {
            root,
            max_age_hours,
        } => {
            let removed = prune_sessions(&root, Duration::from_secs(max_age_hours * 3600))
                .with_context(|| format!("Failed to prune {}", root.display()))?;
            if !logger::is_quiet() {
                println!("{} Removed {} old sessions", SUCCESS_PREFIX, removed);
            }
            Ok(true)
        }
    }
}

fn setup_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        if let Err(e) = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            warn!("Failed to set thread pool size: {}", e);
        }
    }
}

fn analyze(input: &Path, settings: &SettingsArgs) -> Result<()> {
    let settings = settings.resolve().context("Invalid compression settings")?;
    let (analysis, policy) = get_image_info(input, &ImageAnalyzer::default(), &settings)
        .with_context(|| format!("Failed to analyze {}", input.display()))?;
    print_image_info(input, &analysis, &policy);
    Ok(())
}

/// One whole session per rayon worker. Returns whether every session completed.
fn run_sessions(
    sessions: &[PathBuf],
    label: &str,
    settings: &CompressionSettings,
    progress_file: bool,
) -> bool {
    let multi = MultiProgress::new();

    let outcomes: Vec<(PathBuf, squeeze_batch::Result<SessionOutcome>)> = sessions
        .par_iter()
        .map(|root| {
            let layout = SessionLayout::new(root);
            let bar = if logger::is_quiet() {
                ProgressBar::hidden()
            } else {
                multi.add(create_progress_bar(0))
            };
            let file_sink = ProgressFile::new(root.join(PROGRESS_FILE));

            let mut sinks: Vec<&dyn ProgressSink> = vec![&bar];
            if progress_file {
                sinks.push(&file_sink);
            }
            let progress = FanOut::new(sinks);

            let outcome = run_session(&layout, settings, label, &progress);
            bar.finish_and_clear();
            (root.clone(), outcome)
        })
        .collect();

    let mut all_ok = true;
    for (root, outcome) in outcomes {
        match outcome {
            Ok(outcome) => print_summary(&root, &outcome),
            Err(e) => {
                all_ok = false;
                eprintln!("{} {}: {}", ERROR_PREFIX, root.display(), e);
            }
        }
    }
    all_ok
}

fn print_summary(root: &Path, outcome: &SessionOutcome) {
    let result = &outcome.result;

    for failure in &result.failures {
        warn!("{}: {}", failure.name, failure.error);
    }

    if logger::is_quiet() {
        return;
    }

    println!("\n{} {}", SUCCESS_PREFIX, root.display());
    println!(
        "  📁 Processed: {}/{} files in {:.2?}",
        result.successful,
        result.total(),
        result.elapsed
    );
    if result.failed > 0 {
        println!("  {}  Failed: {}", WARNING_PREFIX, result.failed);
    }
    println!("  {} {:.2} MB", ORIGINAL_SIZE_PREFIX, result.total_original_mb);
    println!("  {} {:.2} MB", COMPRESSED_SIZE_PREFIX, result.total_compressed_mb);
    if let Some(savings) = result.savings_percent() {
        println!("  {} {:.1}%", COMPRESSION_RATIO_PREFIX, savings);
    }

    for (category, stats) in &result.categories {
        match stats.savings_percent {
            Some(savings) => println!(
                "  • {}: {} files ({:.1}% savings)",
                category, stats.count, savings
            ),
            None => println!("  • {}: {} files", category, stats.count),
        }
    }

    let archive_size = std::fs::metadata(&outcome.archive)
        .map(|m| format_file_size(m.len()))
        .unwrap_or_else(|_| "unknown size".to_string());
    println!("  📦 Archive: {} ({})", outcome.archive.display(), archive_size);
}
