// Engine constants
// Sidecar names and thumbnail parameters are Video Station contracts.
// Do not change them or the NAS will ignore the generated files.

/// Hidden directory Synology keeps next to media files.
pub const EADIR_NAME: &str = "@eaDir";

/// Fixed thumbnail filename inside the per-video sidecar directory.
/// Vendor-mandated; not derived from the video name.
pub const SYNO_SCREENSHOT_NAME: &str = "SYNOVIDEO_VIDEO_SCREENSHOT.jpg";

// Thumbnail output
pub const THUMB_WIDTH: u32 = 800;
pub const THUMB_JPEG_QUALITY: u8 = 90;

// Connection defaults
pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// Persistence
pub const LEDGER_FILENAME: &str = "processed_videos.json";
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Video container extensions eligible for thumbnailing (lowercase).
pub const VIDEO_EXTENSIONS: [&str; 11] = [
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "mpeg", "mpg",
    "3gp",
];
