// Mount mapping: local path -> remote SFTP path
//
// Synology SFTP chroots regular users at the storage volume, so the share
// root is the first path segment of the translated path (never prefixed by
// a volume identifier).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThumbError};

/// Local-mount to remote-share translation table, e.g. `Y:` -> `video`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathMapping {
    /// Local prefix the videos are mounted under (`Y:` or `/mnt/nas`).
    pub local_mount_prefix: String,
    /// Name of the shared folder on the NAS (`video`).
    pub remote_share_root: String,
}

impl PathMapping {
    /// Translate a local path into the equivalent remote path.
    ///
    /// The local path must start with `local_mount_prefix` (compared
    /// case-insensitively, tolerant of `\` vs `/`); anything else is a hard
    /// error, not a skip.
    pub fn translate(&self, local_path: &Path) -> Result<String> {
        let prefix = normalize(self.local_mount_prefix.trim())
            .trim_end_matches('/')
            .to_string();
        let share = self.remote_share_root.trim().trim_matches('/');

        if prefix.is_empty() || share.is_empty() {
            return Err(ThumbError::PathMapping(
                "mount prefix and share root must both be configured".to_string(),
            ));
        }

        let local = normalize(&local_path.to_string_lossy());
        let rest = strip_prefix_ci(&local, &prefix).ok_or_else(|| {
            ThumbError::PathMapping(format!(
                "path is outside the {} mount: {}",
                prefix, local
            ))
        })?;

        let suffix = rest.trim_start_matches('/');
        if suffix.is_empty() {
            Ok(format!("/{}", share))
        } else {
            Ok(format!("/{}/{}", share, suffix))
        }
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Case-insensitive prefix strip that only matches at a path boundary:
/// the prefix must be followed by a separator or the end of the path, so
/// `/mnt/nas` never claims `/mnt/nasty`. Walks both strings char by char
/// to stay correct for prefixes whose lowercase form changes byte length.
fn strip_prefix_ci<'a>(local: &'a str, prefix: &str) -> Option<&'a str> {
    let mut rest = local;
    for wanted in prefix.chars() {
        let got = rest.chars().next()?;
        if !got.to_lowercase().eq(wanted.to_lowercase()) {
            return None;
        }
        rest = &rest[got.len_utf8()..];
    }
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn mapping(prefix: &str, share: &str) -> PathMapping {
        PathMapping {
            local_mount_prefix: prefix.to_string(),
            remote_share_root: share.to_string(),
        }
    }

    #[test]
    fn test_translate_windows_drive() {
        let m = mapping("Y:", "video");
        let out = m.translate(&PathBuf::from(r"Y:\movies\2024\clip.mp4")).unwrap();
        assert_eq!(out, "/video/movies/2024/clip.mp4");
        assert!(out.starts_with("/video/"));
        assert!(!out.contains('\\'));
    }

    #[test]
    fn test_translate_case_insensitive_prefix() {
        let m = mapping("Y:", "video");
        let out = m.translate(&PathBuf::from(r"y:\movies\clip.mp4")).unwrap();
        assert_eq!(out, "/video/movies/clip.mp4");
    }

    #[test]
    fn test_translate_unix_mount() {
        let m = mapping("/mnt/nas", "video");
        let out = m.translate(&PathBuf::from("/mnt/nas/shows/e01.mkv")).unwrap();
        assert_eq!(out, "/video/shows/e01.mkv");
    }

    #[test]
    fn test_translate_mount_root_itself() {
        let m = mapping("/mnt/nas", "video");
        assert_eq!(m.translate(&PathBuf::from("/mnt/nas")).unwrap(), "/video");
    }

    #[test]
    fn test_translate_outside_mount_fails() {
        let m = mapping("Y:", "video");
        let err = m.translate(&PathBuf::from(r"Z:\movies\clip.mp4")).unwrap_err();
        assert!(matches!(err, ThumbError::PathMapping(_)));
    }

    #[test]
    fn test_translate_rejects_sibling_of_mount() {
        // A textual prefix match that is not a whole path component
        let m = mapping("/mnt/nas", "video");
        assert!(matches!(
            m.translate(&PathBuf::from("/mnt/nasty/clip.mp4")),
            Err(ThumbError::PathMapping(_))
        ));
    }

    #[test]
    fn test_translate_non_ascii_prefix() {
        let m = mapping("/mnt/Vidéos", "video");
        let out = m.translate(&PathBuf::from("/mnt/vidéos/clip.mp4")).unwrap();
        assert_eq!(out, "/video/clip.mp4");
    }

    #[test]
    fn test_translate_empty_mapping_fails() {
        let m = mapping("", "video");
        assert!(matches!(
            m.translate(&PathBuf::from("/mnt/nas/a.mp4")),
            Err(ThumbError::PathMapping(_))
        ));
        let m = mapping("/mnt/nas", "");
        assert!(matches!(
            m.translate(&PathBuf::from("/mnt/nas/a.mp4")),
            Err(ThumbError::PathMapping(_))
        ));
    }
}
