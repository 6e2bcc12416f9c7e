// Video discovery
//
// Recursive walk over the configured folders. Synology's @eaDir metadata
// trees are pruned so previously generated sidecars never show up as input.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::{EADIR_NAME, VIDEO_EXTENSIONS};

/// One video eligible for thumbnailing. Immutable once enumerated;
/// the list is rebuilt on every folder-set change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    /// Absolute local path; the unique key used by the ledger.
    pub path: PathBuf,
    /// File name including extension (sidecar subdirectory name).
    pub filename: String,
    /// File name without extension (local thumbnail name).
    pub stem: String,
}

impl VideoEntry {
    pub fn new(path: PathBuf) -> Option<Self> {
        let filename = path.file_name()?.to_str()?.to_string();
        let stem = path.file_stem()?.to_str()?.to_string();
        Some(Self { path, filename, stem })
    }

    /// Ledger key: the absolute local path as a string.
    pub fn key(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// Discover all video files under the given folders, sorted by path.
pub fn scan_videos(folders: &[PathBuf]) -> Vec<VideoEntry> {
    let mut videos = Vec::new();

    for folder in folders {
        for entry in WalkDir::new(folder)
            .into_iter()
            .filter_entry(|e| !is_eadir(e.path()))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_video_file(path) {
                if let Some(video) = VideoEntry::new(path.to_path_buf()) {
                    videos.push(video);
                }
            }
        }
    }

    // Sort by path for consistent ordering
    videos.sort_by(|a, b| a.path.cmp(&b.path));
    videos
}

/// Check if a file is a video based on extension (case-insensitive).
pub fn is_video_file(path: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e.to_lowercase(),
        None => return false,
    };
    VIDEO_EXTENSIONS.contains(&ext.as_str())
}

fn is_eadir(path: &Path) -> bool {
    path.file_name().map(|n| n == EADIR_NAME).unwrap_or(false)
}
