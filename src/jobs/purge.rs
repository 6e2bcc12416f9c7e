// Thumbnail purge orchestrator
//
// Symmetric reverse batch: deletes previously generated thumbnails and
// retracts ledger entries. Stop-only (no pause), sequential, single pass.
// A missing thumbnail is a no-op, not an error.

use crate::discover::VideoEntry;
use crate::error::{Result, ThumbError};
use crate::ledger::CompletionLedger;
use crate::oracle::StoreTarget;
use crate::remote::remove_dir_recursive;
use crate::sidecar::{local_thumbnail_path, remote_sidecar_dir};

use super::control::RunControl;
use super::progress::{EventSink, LogLevel, Progress};
use super::PurgeOutcome;

pub struct PurgeContext<'a> {
    pub videos: &'a [VideoEntry],
    pub target: StoreTarget<'a>,
    pub ledger: &'a mut CompletionLedger,
    pub control: &'a RunControl,
    pub events: &'a dyn EventSink,
}

/// Run the purge batch over the full video list.
pub fn run_purge(ctx: &mut PurgeContext) -> PurgeOutcome {
    let total = ctx.videos.len() as u64;
    let mut outcome = PurgeOutcome::new(ctx.videos.len());

    for (idx, video) in ctx.videos.iter().enumerate() {
        if ctx.control.stop_requested() {
            outcome.stopped = true;
            ctx.events.log(
                &format!("Stopped after {}/{} videos", idx, total),
                LogLevel::Warning,
            );
            break;
        }

        match purge_one(video, &ctx.target) {
            Ok(true) => {
                outcome.cleared += 1;
                ctx.events.log(
                    &format!("Cleared: {}", video.filename),
                    LogLevel::Info,
                );
            }
            Ok(false) => {
                // Nothing to delete; still retract the ledger entry below.
            }
            Err(e) => {
                outcome.failed += 1;
                log::error!("Purge failed for {}: {}", video.path.display(), e);
                ctx.events.log(
                    &format!("{}: {}", video.filename, e),
                    LogLevel::Error,
                );
            }
        }

        // Evict unconditionally: after a purge pass the ledger must not
        // claim this video is thumbnailed.
        ctx.ledger.evict(&video.key());

        ctx.events.progress(Progress::new(idx as u64 + 1, total));
    }

    outcome
}

/// Delete one video's thumbnail. Returns whether anything was removed.
fn purge_one(video: &VideoEntry, target: &StoreTarget) -> Result<bool> {
    match target {
        StoreTarget::Local => {
            let thumb = local_thumbnail_path(video);
            if thumb.exists() {
                std::fs::remove_file(&thumb)?;
                Ok(true)
            } else {
                Ok(false)
            }
        }
        StoreTarget::Remote { store, mapping } => {
            let sidecar_dir = remote_sidecar_dir(video, mapping)?;
            let stat = match store.stat(&sidecar_dir) {
                // No sidecar subdirectory for this video: no-op.
                Err(_) => return Ok(false),
                Ok(stat) => stat,
            };
            if !stat.is_dir {
                return Err(ThumbError::RemoteIo {
                    path: sidecar_dir,
                    message: "expected a sidecar directory, found a file".to_string(),
                });
            }
            remove_dir_recursive(*store, &sidecar_dir)?;
            Ok(true)
        }
    }
}
