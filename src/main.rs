// synothumb CLI
//
// Thin front-end over the batch engine: scans folders, runs generation or
// purge batches, and prints the engine's progress/log stream.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use synothumb::jobs::worker::{run_generate_batch, run_purge_batch};
use synothumb::settings::{default_ledger_path, default_settings_path};
use synothumb::{
    scan_videos, test_connection, EventSink, LogLevel, OutputTarget, Progress, RunConfig,
    RunControl, Settings,
};

#[derive(Parser)]
#[command(name = "synothumb")]
#[command(about = "Batch video thumbnail generator for local folders and Synology NAS sidecars", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the per-user config location)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the video files a generation run would process
    Scan {
        /// Folders to scan (defaults to the saved folder list)
        folders: Vec<PathBuf>,
    },

    /// Generate thumbnails
    Generate {
        /// Folders to scan (defaults to the saved folder list)
        folders: Vec<PathBuf>,
        /// Write into the NAS @eaDir sidecar tree instead of beside the videos
        #[arg(long)]
        remote: bool,
        /// Regenerate thumbnails that already exist
        #[arg(long)]
        overwrite: bool,
        /// Capture time in seconds (default: middle of each video)
        #[arg(long)]
        capture_time: Option<String>,
    },

    /// Delete previously generated thumbnails
    Purge {
        /// Folders to scan (defaults to the saved folder list)
        folders: Vec<PathBuf>,
        /// Purge the NAS @eaDir sidecar tree instead of local thumbnails
        #[arg(long)]
        remote: bool,
    },

    /// Connect to the NAS and list the visible shared folders
    TestConnection,
}

/// Prints the engine's log/progress stream to the terminal.
struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn progress(&self, progress: Progress) {
        println!(
            "  {}/{} ({:.0}%)",
            progress.current, progress.total, progress.percent
        );
    }

    fn log(&self, message: &str, level: LogLevel) {
        let tag = match level {
            LogLevel::Info => "info",
            LogLevel::Success => "ok",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        };
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        println!("[{}] {:>5}  {}", timestamp, tag, message);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings_path = cli.settings.unwrap_or_else(default_settings_path);
    let mut settings = Settings::load(&settings_path);

    match cli.command {
        Commands::Scan { folders } => {
            let folders = resolve_folders(folders, &settings)?;
            let videos = scan_videos(&folders);
            for video in &videos {
                println!("{}", video.path.display());
            }
            println!("{} videos in {} folders", videos.len(), folders.len());
        }

        Commands::Generate {
            folders,
            remote,
            overwrite,
            capture_time,
        } => {
            let folders = resolve_folders(folders, &settings)?;
            let videos = scan_videos(&folders);
            if videos.is_empty() {
                bail!("no video files found");
            }

            settings.folders = folders;
            if capture_time.is_some() {
                settings.capture_time = capture_time;
            }

            let config = RunConfig {
                settings,
                target: target_for(remote),
                overwrite,
                ledger_path: default_ledger_path(),
                settings_path,
            };
            let control = RunControl::new();
            let outcome = run_generate_batch(&config, &videos, &control, &ConsoleSink);
            if outcome.failed > 0 && outcome.success == 0 && outcome.skipped == 0 {
                bail!("all {} videos failed", outcome.failed);
            }
        }

        Commands::Purge { folders, remote } => {
            let folders = resolve_folders(folders, &settings)?;
            let videos = scan_videos(&folders);
            if videos.is_empty() {
                bail!("no video files found");
            }

            let config = RunConfig {
                settings,
                target: target_for(remote),
                overwrite: false,
                ledger_path: default_ledger_path(),
                settings_path,
            };
            let control = RunControl::new();
            run_purge_batch(&config, &videos, &control, &ConsoleSink);
        }

        Commands::TestConnection => {
            let entries = test_connection(&settings.connection)?;
            println!("Connected. Visible shared folders:");
            for entry in entries {
                println!("  {}", entry);
            }
        }
    }

    Ok(())
}

fn target_for(remote: bool) -> OutputTarget {
    if remote {
        OutputTarget::RemoteSidecar
    } else {
        OutputTarget::Local
    }
}

fn resolve_folders(folders: Vec<PathBuf>, settings: &Settings) -> Result<Vec<PathBuf>> {
    let folders = if folders.is_empty() {
        settings.folders.clone()
    } else {
        folders
    };
    if folders.is_empty() {
        bail!("no folders given and none saved in settings");
    }
    Ok(folders)
}
