// Thumbnail existence oracle
//
// Reconciles ledger hints against live store state. The ledger is a cache:
// a "not yet seen" answer is cheap, but a "yes" is never trusted without a
// live stat. Stale entries are evicted and re-checked against the store,
// which stays the single source of truth.

use crate::discover::VideoEntry;
use crate::ledger::CompletionLedger;
use crate::mapping::PathMapping;
use crate::remote::RemoteFs;
use crate::sidecar::{local_thumbnail_path, remote_thumbnail_path};

/// Where thumbnails for the current run are written and checked.
pub enum StoreTarget<'a> {
    /// Beside the source video on the local filesystem.
    Local,
    /// Synology sidecar tree on the NAS.
    Remote {
        store: &'a dyn RemoteFs,
        mapping: &'a PathMapping,
    },
}

/// Does a valid thumbnail already exist for this video?
///
/// Local target: pure filesystem check, no ledger involvement.
/// Remote target: ledger hit -> verify by live stat, evicting on staleness
/// and re-checking the store; ledger miss -> live stat, recording a hit.
pub fn thumbnail_exists(
    video: &VideoEntry,
    target: &StoreTarget,
    ledger: &mut CompletionLedger,
) -> bool {
    match target {
        StoreTarget::Local => local_thumbnail_path(video).exists(),
        StoreTarget::Remote { store, mapping } => {
            let thumb_path = match remote_thumbnail_path(video, mapping) {
                Ok(p) => p,
                // Unmappable paths surface as per-video errors at generation
                // time; the oracle just reports "no thumbnail".
                Err(_) => return false,
            };

            let key = video.key();
            if ledger.contains(&key) {
                if store.stat(&thumb_path).is_ok() {
                    return true;
                }
                // The hint was stale; evict and ask the store again.
                ledger.evict(&key);
                return store.stat(&thumb_path).is_ok();
            }

            if store.stat(&thumb_path).is_ok() {
                ledger.insert(&key);
                true
            } else {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::remote::memfs::MemRemoteFs;
    use tempfile::TempDir;

    fn mapping() -> PathMapping {
        PathMapping {
            local_mount_prefix: "/mnt/nas".to_string(),
            remote_share_root: "video".to_string(),
        }
    }

    fn video(path: &str) -> VideoEntry {
        VideoEntry::new(PathBuf::from(path)).unwrap()
    }

    #[test]
    fn test_local_checks_filesystem_only() {
        let tmp = TempDir::new().unwrap();
        let video_path = tmp.path().join("clip.mp4");
        std::fs::write(&video_path, b"v").unwrap();
        let v = VideoEntry::new(video_path).unwrap();
        let mut ledger = CompletionLedger::new();

        assert!(!thumbnail_exists(&v, &StoreTarget::Local, &mut ledger));
        std::fs::write(tmp.path().join("clip.jpg"), b"jpeg").unwrap();
        assert!(thumbnail_exists(&v, &StoreTarget::Local, &mut ledger));
        // Local checks never touch the ledger
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_remote_miss_then_hit_records_ledger() {
        let fs = MemRemoteFs::new();
        let mapping = mapping();
        let v = video("/mnt/nas/movies/clip.mp4");
        let mut ledger = CompletionLedger::new();
        let target = StoreTarget::Remote { store: &fs, mapping: &mapping };

        assert!(!thumbnail_exists(&v, &target, &mut ledger));
        assert!(ledger.is_empty());

        fs.insert_file(
            "/video/movies/@eaDir/clip.mp4/SYNOVIDEO_VIDEO_SCREENSHOT.jpg",
            b"jpeg",
        );
        assert!(thumbnail_exists(&v, &target, &mut ledger));
        assert!(ledger.contains(&v.key()));
    }

    #[test]
    fn test_remote_stale_ledger_entry_is_evicted() {
        let fs = MemRemoteFs::new();
        let mapping = mapping();
        let v = video("/mnt/nas/movies/clip.mp4");
        let mut ledger = CompletionLedger::new();
        ledger.insert(&v.key());

        // Thumbnail was externally deleted: entry must be evicted and the
        // answer must come from the store.
        let target = StoreTarget::Remote { store: &fs, mapping: &mapping };
        assert!(!thumbnail_exists(&v, &target, &mut ledger));
        assert!(!ledger.contains(&v.key()));
    }

    #[test]
    fn test_remote_confirmed_ledger_entry_survives() {
        let fs = MemRemoteFs::new();
        fs.insert_file(
            "/video/movies/@eaDir/clip.mp4/SYNOVIDEO_VIDEO_SCREENSHOT.jpg",
            b"jpeg",
        );
        let mapping = mapping();
        let v = video("/mnt/nas/movies/clip.mp4");
        let mut ledger = CompletionLedger::new();
        ledger.insert(&v.key());

        let target = StoreTarget::Remote { store: &fs, mapping: &mapping };
        assert!(thumbnail_exists(&v, &target, &mut ledger));
        assert!(ledger.contains(&v.key()));
    }
}
