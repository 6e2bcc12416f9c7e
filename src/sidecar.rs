// Deterministic thumbnail locations for both output targets

use std::path::PathBuf;

use crate::constants::{EADIR_NAME, SYNO_SCREENSHOT_NAME};
use crate::discover::VideoEntry;
use crate::error::Result;
use crate::mapping::PathMapping;

/// Local target: `{video_directory}/{video_stem}.jpg`.
pub fn local_thumbnail_path(video: &VideoEntry) -> PathBuf {
    let dir = video.path.parent().map(PathBuf::from).unwrap_or_default();
    dir.join(format!("{}.jpg", video.stem))
}

/// Remote per-video sidecar directory:
/// `{translated_video_directory}/@eaDir/{video_filename}`.
///
/// The directory is keyed by the full filename (extension included), one
/// subdirectory per original file.
pub fn remote_sidecar_dir(video: &VideoEntry, mapping: &PathMapping) -> Result<String> {
    let dir = video.path.parent().map(PathBuf::from).unwrap_or_default();
    let remote_dir = mapping.translate(&dir)?;
    Ok(format!("{}/{}/{}", remote_dir, EADIR_NAME, video.filename))
}

/// Remote target: `{sidecar_dir}/SYNOVIDEO_VIDEO_SCREENSHOT.jpg`.
pub fn remote_thumbnail_path(video: &VideoEntry, mapping: &PathMapping) -> Result<String> {
    Ok(format!(
        "{}/{}",
        remote_sidecar_dir(video, mapping)?,
        SYNO_SCREENSHOT_NAME
    ))
}
