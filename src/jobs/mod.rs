// Batch job system: generation and purge orchestrators plus the
// pause/resume/stop control surface and the run-scoped worker driver.

pub mod control;
pub mod generate;
pub mod progress;
pub mod purge;
pub mod worker;


use serde::Serialize;

/// Where thumbnails are written for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    /// `{dir}/{stem}.jpg` beside the source video.
    Local,
    /// `@eaDir` sidecar tree on the NAS, over SFTP.
    RemoteSidecar,
}

/// Final counts of a generation run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Outcome {
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total: usize,
    pub stopped: bool,
}

impl Outcome {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }
}

/// Final counts of a purge run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PurgeOutcome {
    pub cleared: usize,
    pub failed: usize,
    pub total: usize,
    pub stopped: bool,
}

impl PurgeOutcome {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }
}
