//! Download command implementation

use super::{CliError, StatusCommand};
use crate::downloader::{DownloadExecutor, RunSummary};
use crate::fetcher::molit::MolitFetchClient;
use crate::planner::RunMode;
use crate::shutdown::SharedHalt;
use crate::uploader::MirrorSink;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Real-Estate Data Downloader CLI
#[derive(Parser, Debug)]
#[command(name = "realestate-data-downloader")]
#[command(about = "Download MOLIT real-estate transaction spreadsheets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download spreadsheets for all categories per the selected mode
    Download(DownloadArgs),
    /// Print stored per-category progress
    Status(StatusCommand),
}

/// Run mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Everything from 2006-01 onward, resuming stored progress
    Full,
    /// The trailing 12 months, re-checking recently revised data
    Update,
    /// The most recent --test-months months only
    Test,
}

/// Arguments for the download command
#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Run mode
    #[arg(long, value_enum, default_value = "update")]
    pub mode: ModeArg,

    /// Number of trailing months fetched in test mode
    #[arg(long, default_value_t = 2)]
    pub test_months: u32,

    /// Local output root; one subdirectory per category
    #[arg(long, default_value = "data")]
    pub output_dir: PathBuf,

    /// Drive-synced folder to mirror completed files into
    #[arg(long)]
    pub mirror_dir: Option<PathBuf>,

    /// Skip the upload sink entirely, even when --mirror-dir is set
    #[arg(long)]
    pub skip_upload: bool,

    /// Progress store location
    #[arg(long, default_value = "progress.json")]
    pub progress_file: PathBuf,

    /// Stop starting new downloads after this many minutes; honored at
    /// period boundaries
    #[arg(long)]
    pub max_runtime_mins: Option<u64>,

    /// Discard stored progress before planning (full re-fetch)
    #[arg(long)]
    pub reset_progress: bool,
}

impl DownloadArgs {
    /// The planner mode these arguments select.
    pub fn run_mode(&self) -> RunMode {
        match self.mode {
            ModeArg::Full => RunMode::FullHistory,
            ModeArg::Update => RunMode::UpdateWindow,
            ModeArg::Test => RunMode::BoundedTest(self.test_months),
        }
    }

    /// Execute the download run.
    pub async fn execute(&self, halt: SharedHalt) -> Result<RunSummary, CliError> {
        let fetcher = Arc::new(MolitFetchClient::new()?);

        let mut executor =
            DownloadExecutor::new(fetcher, self.output_dir.clone(), self.progress_file.clone())
                .with_halt(halt)
                .with_reset_progress(self.reset_progress)
                .with_progress_bars(std::io::stderr().is_terminal());

        if !self.skip_upload {
            if let Some(mirror_dir) = &self.mirror_dir {
                executor = executor.with_upload_sink(Arc::new(MirrorSink::new(mirror_dir)));
            }
        }

        if let Some(mins) = self.max_runtime_mins {
            executor = executor.with_max_runtime(Duration::from_secs(mins * 60));
        }

        Ok(executor.run(self.run_mode()).await?)
    }
}
