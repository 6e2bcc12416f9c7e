// Batch thumbnail generation orchestrator
//
// Strictly sequential per-video pipeline: wait-if-paused -> check-stop ->
// skip-check via the oracle -> probe -> extract -> encode -> write ->
// record. A failing video is counted and logged, never fatal to the batch;
// only the caller's connection setup can abort a whole run.

use crate::constants::{THUMB_JPEG_QUALITY, THUMB_WIDTH};
use crate::discover::VideoEntry;
use crate::encode::JpegEncode;
use crate::error::Result;
use crate::extract::{select_capture_time, FrameExtractor};
use crate::ledger::CompletionLedger;
use crate::oracle::{thumbnail_exists, StoreTarget};
use crate::remote::{ensure_dir, write_overwrite};
use crate::sidecar::{local_thumbnail_path, remote_sidecar_dir, remote_thumbnail_path};

use super::control::RunControl;
use super::progress::{EventSink, LogLevel, Progress};
use super::Outcome;

/// Everything one generation run owns. Built by the worker, lives for the
/// duration of the run, no ambient state.
pub struct RunContext<'a> {
    pub videos: &'a [VideoEntry],
    pub target: StoreTarget<'a>,
    pub ledger: &'a mut CompletionLedger,
    pub extractor: &'a dyn FrameExtractor,
    pub encoder: &'a dyn JpegEncode,
    pub control: &'a RunControl,
    pub events: &'a dyn EventSink,
    /// Bypass the skip-check and always regenerate.
    pub overwrite: bool,
    /// Capture time as entered by the user; blank means mid-video.
    pub capture_time: Option<String>,
}

/// Run the generation batch over the full video list.
pub fn run_generate(ctx: &mut RunContext) -> Outcome {
    let total = ctx.videos.len() as u64;
    let mut outcome = Outcome::new(ctx.videos.len());

    for (idx, video) in ctx.videos.iter().enumerate() {
        if ctx.control.stop_requested() {
            outcome.stopped = true;
            ctx.events.log(
                &format!("Stopped after {}/{} videos", idx, total),
                LogLevel::Warning,
            );
            break;
        }

        ctx.control.wait_if_paused();

        if ctx.control.stop_requested() {
            outcome.stopped = true;
            ctx.events.log(
                &format!("Stopped after {}/{} videos", idx, total),
                LogLevel::Warning,
            );
            break;
        }

        if idx == 0 {
            if let StoreTarget::Remote { mapping, .. } = &ctx.target {
                ctx.events.log(
                    &format!(
                        "Path mapping: {} -> /{}/",
                        mapping.local_mount_prefix, mapping.remote_share_root
                    ),
                    LogLevel::Info,
                );
            }
            if ctx.overwrite {
                ctx.events.log("Overwrite mode is on", LogLevel::Warning);
            }
        }

        if !ctx.overwrite && thumbnail_exists(video, &ctx.target, ctx.ledger) {
            outcome.skipped += 1;
            ctx.events.log(
                &format!("{} (already done)", video.filename),
                LogLevel::Info,
            );
        } else {
            match generate_one(video, ctx) {
                Ok(()) => {
                    outcome.success += 1;
                    ctx.ledger.insert(&video.key());
                    ctx.events.log(&video.filename, LogLevel::Success);
                }
                Err(e) => {
                    outcome.failed += 1;
                    log::error!("Thumbnail failed for {}: {}", video.path.display(), e);
                    ctx.events.log(
                        &format!("{}: {}", video.filename, e),
                        LogLevel::Error,
                    );
                }
            }
        }

        ctx.events.progress(Progress::new(idx as u64 + 1, total));
    }

    outcome
}

/// Extract, encode, and write one thumbnail.
fn generate_one(video: &VideoEntry, ctx: &RunContext) -> Result<()> {
    let meta = ctx.extractor.probe(&video.path)?;
    let target_secs = select_capture_time(ctx.capture_time.as_deref(), meta.duration_secs);
    let frame = ctx.extractor.extract_frame(&video.path, &meta, target_secs)?;
    let jpeg = ctx
        .encoder
        .encode_jpeg(&frame, THUMB_WIDTH, THUMB_JPEG_QUALITY)?;

    match &ctx.target {
        StoreTarget::Local => {
            std::fs::write(local_thumbnail_path(video), &jpeg)?;
        }
        StoreTarget::Remote { store, mapping } => {
            let sidecar_dir = remote_sidecar_dir(video, mapping)?;
            ensure_dir(*store, &sidecar_dir)?;
            let thumb_path = remote_thumbnail_path(video, mapping)?;
            write_overwrite(*store, &thumb_path, &jpeg)?;
        }
    }
    Ok(())
}
