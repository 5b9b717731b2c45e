use crate::constants::DEFAULT_SESSION_MAX_AGE_HOURS;
use crate::error::Result;
use crate::policy::CompressionSettings;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "squeeze-batch",
    about = "Size-tiered batch image compression into a single zip archive",
    long_about = "squeeze-batch compresses every upload in a session directory to JPEG, \
                  choosing quality and maximum dimension from the size of each source. \
                  Huge sources are re-encoded until they fit a size budget, outputs that would \
                  grow are replaced by the original, and the results are bundled into one archive.",
    version,
    after_help = "EXAMPLES:\n  \
    squeeze-batch run ./sessions/abc123 -l \"Summer 2024\"\n  \
    squeeze-batch run ./sessions/* -j 4 -q 80 --progress-file\n  \
    squeeze-batch analyze photo.png --no-resize\n  \
    squeeze-batch prune ./sessions --max-age-hours 12"
)]
pub struct Args {
    #[arg(short = 'Q', long, global = true, help = "Only print warnings and errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print debug logs")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides shared by `run` and `analyze`.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SettingsArgs {
    #[arg(
        short = 'q',
        long,
        help = "Override JPEG quality (1-100)",
        long_help = "Replace the size tier's quality for every file. \
                     The category label is still chosen from the source size."
    )]
    pub quality: Option<u8>,

    #[arg(
        short = 'm',
        long,
        help = "Override the maximum output dimension in pixels",
        long_help = "Downscale so the longer side is at most this many pixels. \
                     Ignored when --no-resize is given."
    )]
    pub max_dimension: Option<u32>,

    #[arg(long, help = "Never resize, keeping source dimensions")]
    pub no_resize: bool,

    #[arg(
        long,
        value_name = "FILE",
        help = "JSON settings file; command-line flags take precedence",
        long_help = "Read settings from a JSON file such as \
                     {\"quality\": 80, \"max_dimension\": 1600, \"no_resize\": false}. \
                     Flags given on the command line override its values."
    )]
    pub settings: Option<PathBuf>,
}

impl SettingsArgs {
    /// Settings file first, then command-line flags on top.
    pub fn resolve(&self) -> Result<CompressionSettings> {
        let base = match &self.settings {
            Some(path) => CompressionSettings::from_json_file(path)?,
            None => CompressionSettings::default(),
        };
        let flags = CompressionSettings {
            quality: self.quality,
            max_dimension: self.max_dimension,
            no_resize: self.no_resize,
        };

        let resolved = base.merged_with(&flags);
        resolved.validate()?;
        Ok(resolved)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress and archive one or more session directories",
        long_about = "Each session directory must contain an uploads/ folder. Uploads are \
                      compressed into compressed/, bundled into archives/<label>.zip and a \
                      results.json is written to the session root. Uploads are consumed."
    )]
    Run {
        #[arg(required = true, help = "Session directories to process")]
        sessions: Vec<PathBuf>,

        #[arg(
            short = 'l',
            long,
            default_value = "",
            help = "Archive name and output file prefix",
            long_help = "Used as <label>.zip and as the prefix of each output file. \
                         Only letters, digits, spaces, hyphens and underscores are kept; \
                         an empty label produces Archive.zip."
        )]
        label: String,

        #[command(flatten)]
        settings: SettingsArgs,

        #[arg(long, help = "Mirror progress into progress.json in each session root")]
        progress_file: bool,

        #[arg(
            short = 'j',
            long,
            help = "Number of sessions processed in parallel (default: auto)",
            long_help = "Sessions run concurrently, one whole session per thread. \
                         Files inside a session are always processed in order."
        )]
        threads: Option<usize>,
    },

    #[command(
        about = "Show the analysis and resolved compression policy for an image",
        long_about = "Reads the image header and prints size, dimensions, format and transparency, \
                      followed by the tier, quality and maximum dimension that would be used."
    )]
    Analyze {
        #[arg(help = "Image file to analyze")]
        input: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    #[command(
        about = "Remove session directories older than a given age",
        long_about = "Deletes every directory directly under ROOT whose modification time \
                      is older than --max-age-hours."
    )]
    Prune {
        #[arg(help = "Directory holding session directories")]
        root: PathBuf,

        #[arg(long, default_value_t = DEFAULT_SESSION_MAX_AGE_HOURS, help = "Maximum session age in hours")]
        max_age_hours: u64,
    },
}
