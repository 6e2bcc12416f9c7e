// Error types for the thumbnail engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbError {
    /// Remote session could not be established or maintained.
    /// Fatal to a whole run; everything below is per-video or softer.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Local path falls outside the configured mount mapping.
    #[error("Path mapping error: {0}")]
    PathMapping(String),

    /// A remote stat/list/mkdir/write/remove failed.
    #[error("Remote IO error [{path}]: {message}")]
    RemoteIo { path: String, message: String },

    /// Could not open the container or decode the target frame.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// JPEG encoding failure.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Ledger persistence failure. Logged as a warning, never aborts a run.
    #[error("Ledger IO error: {0}")]
    LedgerIo(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ThumbError>;
