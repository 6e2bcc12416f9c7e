// synothumb - batch video thumbnail engine
//
// Scans folders for videos, extracts one representative frame each, and
// writes JPEG thumbnails either beside the source files or into Synology
// Video Station @eaDir sidecars over SFTP. The batch engine is resumable
// (completion ledger with self-healing skip detection), interruptible
// (pause/resume/stop), and strictly sequential.

pub mod constants;
pub mod discover;
pub mod encode;
pub mod error;
pub mod extract;
pub mod jobs;
pub mod ledger;
pub mod mapping;
pub mod oracle;
pub mod remote;
pub mod settings;
pub mod sidecar;
pub mod tools;

pub use discover::{scan_videos, VideoEntry};
pub use error::{Result, ThumbError};
pub use jobs::control::RunControl;
pub use jobs::progress::{EventSink, LogLevel, Progress};
pub use jobs::worker::{
    run_generate_batch, run_purge_batch, spawn_generate, spawn_purge, RunConfig,
};
pub use jobs::{Outcome, OutputTarget, PurgeOutcome};
pub use ledger::CompletionLedger;
pub use mapping::PathMapping;
pub use remote::{test_connection, ConnectionParams, SftpStore};
pub use settings::Settings;
