// Run-scoped worker driver
//
// Owns the whole lifecycle of one batch run: ledger load, remote session
// setup, orchestrator loop, and the end-of-run checkpoint (ledger and
// settings persistence, session teardown). The remote session is owned
// exclusively by the worker for the duration of the run; teardown happens
// on every exit path by scope.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::discover::VideoEntry;
use crate::encode::{ImageJpegEncoder, JpegEncode};
use crate::extract::{FfmpegExtractor, FrameExtractor};
use crate::ledger::CompletionLedger;
use crate::oracle::StoreTarget;
use crate::remote::SftpStore;
use crate::settings::Settings;

use super::control::RunControl;
use super::generate::{run_generate, RunContext};
use super::progress::{EventSink, LogLevel};
use super::purge::{run_purge, PurgeContext};
use super::{Outcome, OutputTarget, PurgeOutcome};

/// Configuration for one batch run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub settings: Settings,
    pub target: OutputTarget,
    pub overwrite: bool,
    pub ledger_path: PathBuf,
    pub settings_path: PathBuf,
}

/// Run a full generation batch with the default ffmpeg extractor and
/// image-crate encoder.
pub fn run_generate_batch(
    config: &RunConfig,
    videos: &[VideoEntry],
    control: &RunControl,
    events: &dyn EventSink,
) -> Outcome {
    run_generate_batch_with(config, videos, control, events, &FfmpegExtractor, &ImageJpegEncoder)
}

/// Generation batch with explicit extractor/encoder (used by tests).
pub fn run_generate_batch_with(
    config: &RunConfig,
    videos: &[VideoEntry],
    control: &RunControl,
    events: &dyn EventSink,
    extractor: &dyn FrameExtractor,
    encoder: &dyn JpegEncode,
) -> Outcome {
    let mut ledger = CompletionLedger::load(&config.ledger_path);

    // Connection failure aborts the whole run with zero progress.
    let store = match open_store(config, events) {
        Ok(store) => store,
        Err(()) => return Outcome::new(videos.len()),
    };
    let target = store_target(&store, config);

    events.log(
        &format!("Processing {} videos", videos.len()),
        LogLevel::Info,
    );

    let outcome = {
        let mut ctx = RunContext {
            videos,
            target,
            ledger: &mut ledger,
            extractor,
            encoder,
            control,
            events,
            overwrite: config.overwrite,
            capture_time: config.settings.capture_time.clone(),
        };
        run_generate(&mut ctx)
    };

    finish_run(config, &ledger, store, events, true);

    let level = if outcome.stopped { LogLevel::Warning } else { LogLevel::Success };
    events.log(
        &format!(
            "{} {} succeeded, {} skipped, {} failed",
            if outcome.stopped { "Stopped:" } else { "Done!" },
            outcome.success,
            outcome.skipped,
            outcome.failed
        ),
        level,
    );
    outcome
}

/// Run a full purge batch.
pub fn run_purge_batch(
    config: &RunConfig,
    videos: &[VideoEntry],
    control: &RunControl,
    events: &dyn EventSink,
) -> PurgeOutcome {
    let mut ledger = CompletionLedger::load(&config.ledger_path);

    let store = match open_store(config, events) {
        Ok(store) => store,
        Err(()) => return PurgeOutcome::new(videos.len()),
    };
    let target = store_target(&store, config);

    events.log(
        &format!("Clearing thumbnails for {} videos", videos.len()),
        LogLevel::Warning,
    );

    let outcome = {
        let mut ctx = PurgeContext {
            videos,
            target,
            ledger: &mut ledger,
            control,
            events,
        };
        run_purge(&mut ctx)
    };

    finish_run(config, &ledger, store, events, false);

    events.log(
        &format!(
            "Purge finished: {} cleared, {} failed",
            outcome.cleared, outcome.failed
        ),
        LogLevel::Success,
    );
    outcome
}

/// Spawn a generation run on a dedicated worker thread.
pub fn spawn_generate(
    config: RunConfig,
    videos: Vec<VideoEntry>,
    control: Arc<RunControl>,
    events: Arc<dyn EventSink + Send + Sync>,
) -> JoinHandle<Outcome> {
    std::thread::Builder::new()
        .name("thumb-worker".into())
        .spawn(move || run_generate_batch(&config, &videos, &control, events.as_ref()))
        .expect("failed to spawn worker thread")
}

/// Spawn a purge run on a dedicated worker thread.
pub fn spawn_purge(
    config: RunConfig,
    videos: Vec<VideoEntry>,
    control: Arc<RunControl>,
    events: Arc<dyn EventSink + Send + Sync>,
) -> JoinHandle<PurgeOutcome> {
    std::thread::Builder::new()
        .name("thumb-purge-worker".into())
        .spawn(move || run_purge_batch(&config, &videos, &control, events.as_ref()))
        .expect("failed to spawn purge worker thread")
}

/// Open the remote session when the target needs one.
fn open_store(config: &RunConfig, events: &dyn EventSink) -> std::result::Result<Option<SftpStore>, ()> {
    match config.target {
        OutputTarget::Local => Ok(None),
        OutputTarget::RemoteSidecar => {
            let params = &config.settings.connection;
            events.log(
                &format!(
                    "Connecting to {}@{}:{}",
                    params.username, params.host, params.port
                ),
                LogLevel::Info,
            );
            match SftpStore::connect(params) {
                Ok(store) => {
                    events.log("SSH connection established", LogLevel::Success);
                    Ok(Some(store))
                }
                Err(e) => {
                    log::error!("Connection failed: {}", e);
                    events.log(&e.to_string(), LogLevel::Error);
                    Err(())
                }
            }
        }
    }
}

fn store_target<'a>(store: &'a Option<SftpStore>, config: &'a RunConfig) -> StoreTarget<'a> {
    match store {
        Some(store) => StoreTarget::Remote {
            store,
            mapping: &config.settings.mapping,
        },
        None => StoreTarget::Local,
    }
}

/// End-of-run checkpoint: persist the ledger (and settings for generation
/// runs), close the remote session. Persistence failures are warnings; a
/// ledger that fails to save is simply retried at the next checkpoint.
fn finish_run(
    config: &RunConfig,
    ledger: &CompletionLedger,
    store: Option<SftpStore>,
    events: &dyn EventSink,
    save_settings: bool,
) {
    if let Err(e) = ledger.save(&config.ledger_path) {
        log::warn!("Could not persist ledger: {}", e);
        events.log(&format!("Could not save ledger: {}", e), LogLevel::Warning);
    } else {
        events.log(
            &format!("Ledger saved ({} entries)", ledger.len()),
            LogLevel::Info,
        );
    }

    if save_settings {
        if let Err(e) = config.settings.save(&config.settings_path) {
            log::warn!("Could not persist settings: {}", e);
            events.log(
                &format!("Could not save settings: {}", e),
                LogLevel::Warning,
            );
        }
    }

    if store.is_some() {
        drop(store);
        events.log("SSH connection closed", LogLevel::Info);
    }
}
