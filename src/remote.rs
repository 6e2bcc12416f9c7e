// Remote store adapter over a single authenticated SFTP session
//
// The trait keeps the orchestrator testable against an in-memory store;
// `SftpStore` is the production implementation. One session per batch run,
// owned by the worker, dropped unconditionally at run end.

use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ssh2::Session;

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_SSH_PORT};
use crate::error::{Result, ThumbError};

/// NAS connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_SSH_PORT,
            username: String::new(),
            password: String::new(),
            timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Minimal stat result the engine needs.
#[derive(Debug, Clone, Copy)]
pub struct RemoteStat {
    pub size: u64,
    pub is_dir: bool,
}

/// Primitive operation set over the remote store. Every failure carries the
/// remote path it happened on.
pub trait RemoteFs {
    fn stat(&self, path: &str) -> Result<RemoteStat>;
    /// Entry names (not full paths) directly under `path`.
    fn list(&self, path: &str) -> Result<Vec<String>>;
    fn mkdir(&self, path: &str) -> Result<()>;
    fn write(&self, path: &str, data: &[u8]) -> Result<()>;
    fn remove(&self, path: &str) -> Result<()>;
    fn rmdir(&self, path: &str) -> Result<()>;
}

/// Parent of a forward-slash remote path ("/a/b" -> "/a", "/a" -> "/").
fn parent_of(path: &str) -> String {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some(("", _)) | None => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
    }
}

/// Recursively create a remote directory: walk upward collecting missing
/// ancestors, then create them deepest-first. A create failing because
/// another actor won the race is tolerated.
pub fn ensure_dir(fs: &dyn RemoteFs, path: &str) -> Result<()> {
    let mut missing = Vec::new();
    let mut current = path.trim_end_matches('/').to_string();

    while !current.is_empty() && current != "/" {
        if fs.stat(&current).is_ok() {
            break;
        }
        missing.push(current.clone());
        current = parent_of(&current);
    }

    for dir in missing.iter().rev() {
        if let Err(e) = fs.mkdir(dir) {
            if fs.stat(dir).is_err() {
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Overwrite-write: remove any existing file first (failure tolerated, the
/// file usually isn't there), write, then stat-verify the upload landed.
pub fn write_overwrite(fs: &dyn RemoteFs, path: &str, data: &[u8]) -> Result<()> {
    let _ = fs.remove(path);
    fs.write(path, data)?;

    let stat = fs.stat(path)?;
    if stat.size == 0 {
        return Err(ThumbError::RemoteIo {
            path: path.to_string(),
            message: "upload verified as zero bytes".to_string(),
        });
    }
    Ok(())
}

/// Delete every file inside `path`, then the now-empty directory itself.
pub fn remove_dir_recursive(fs: &dyn RemoteFs, path: &str) -> Result<()> {
    for name in fs.list(path)? {
        fs.remove(&format!("{}/{}", path, name))?;
    }
    fs.rmdir(path)
}

/// Production store: one authenticated SFTP channel over an SSH session.
pub struct SftpStore {
    // Session must outlive the sftp channel; dropped together at run end.
    _session: Session,
    sftp: ssh2::Sftp,
}

impl SftpStore {
    /// Open the TCP connection, handshake, and authenticate with a password.
    /// Any failure here is fatal to the run that requested it.
    pub fn connect(params: &ConnectionParams) -> Result<Self> {
        if params.host.trim().is_empty() || params.username.trim().is_empty() {
            return Err(ThumbError::Connection(
                "host and username must be configured".to_string(),
            ));
        }

        let timeout = Duration::from_secs(params.timeout_secs.max(1));
        let addr = (params.host.as_str(), params.port)
            .to_socket_addrs()
            .map_err(|e| ThumbError::Connection(format!("cannot resolve {}: {}", params.host, e)))?
            .next()
            .ok_or_else(|| {
                ThumbError::Connection(format!("no address found for {}", params.host))
            })?;

        let tcp = TcpStream::connect_timeout(&addr, timeout)
            .map_err(|e| ThumbError::Connection(format!("cannot reach {}: {}", addr, e)))?;

        let mut session = Session::new()
            .map_err(|e| ThumbError::Connection(format!("session init failed: {}", e)))?;
        session.set_timeout(timeout.as_millis() as u32);
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| ThumbError::Connection(format!("SSH handshake failed: {}", e)))?;
        session
            .userauth_password(&params.username, &params.password)
            .map_err(|e| ThumbError::Connection(format!("authentication failed: {}", e)))?;

        let sftp = session
            .sftp()
            .map_err(|e| ThumbError::Connection(format!("SFTP channel failed: {}", e)))?;

        Ok(Self {
            _session: session,
            sftp,
        })
    }

    fn io_err(path: &str, e: impl std::fmt::Display) -> ThumbError {
        ThumbError::RemoteIo {
            path: path.to_string(),
            message: e.to_string(),
        }
    }
}

impl RemoteFs for SftpStore {
    fn stat(&self, path: &str) -> Result<RemoteStat> {
        let stat = self
            .sftp
            .stat(Path::new(path))
            .map_err(|e| Self::io_err(path, e))?;
        Ok(RemoteStat {
            size: stat.size.unwrap_or(0),
            is_dir: stat.is_dir(),
        })
    }

    fn list(&self, path: &str) -> Result<Vec<String>> {
        let entries = self
            .sftp
            .readdir(Path::new(path))
            .map_err(|e| Self::io_err(path, e))?;
        Ok(entries
            .into_iter()
            .filter_map(|(p, _)| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect())
    }

    fn mkdir(&self, path: &str) -> Result<()> {
        self.sftp
            .mkdir(Path::new(path), 0o755)
            .map_err(|e| Self::io_err(path, e))
    }

    fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut file = self
            .sftp
            .create(Path::new(path))
            .map_err(|e| Self::io_err(path, e))?;
        file.write_all(data).map_err(|e| Self::io_err(path, e))?;
        file.flush().map_err(|e| Self::io_err(path, e))?;
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<()> {
        self.sftp
            .unlink(Path::new(path))
            .map_err(|e| Self::io_err(path, e))
    }

    fn rmdir(&self, path: &str) -> Result<()> {
        self.sftp
            .rmdir(Path::new(path))
            .map_err(|e| Self::io_err(path, e))
    }
}

/// Diagnostic: connect and list the top-level shared folders visible to the
/// account. Hidden and `@`-prefixed system entries are filtered out.
/// Independent of any batch run.
pub fn test_connection(params: &ConnectionParams) -> Result<Vec<String>> {
    let store = SftpStore::connect(params)?;
    let mut entries: Vec<String> = store
        .list("/")?
        .into_iter()
        .filter(|name| !name.starts_with('@') && !name.starts_with('.'))
        .collect();
    entries.sort();
    Ok(entries)
}

/// In-memory remote store for orchestrator and oracle tests.
#[cfg(test)]
pub(crate) mod memfs {
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    #[derive(Default)]
    struct State {
        files: BTreeMap<String, Vec<u8>>,
        dirs: BTreeSet<String>,
    }

    pub struct MemRemoteFs {
        state: RefCell<State>,
        pub fail_writes: Cell<bool>,
    }

    impl MemRemoteFs {
        pub fn new() -> Self {
            let mut state = State::default();
            state.dirs.insert("/".to_string());
            Self {
                state: RefCell::new(state),
                fail_writes: Cell::new(false),
            }
        }

        pub fn insert_file(&self, path: &str, data: &[u8]) {
            let mut state = self.state.borrow_mut();
            let mut dir = parent_of(path);
            while dir != "/" {
                state.dirs.insert(dir.clone());
                dir = parent_of(&dir);
            }
            state.files.insert(path.to_string(), data.to_vec());
        }

        pub fn delete_file(&self, path: &str) {
            self.state.borrow_mut().files.remove(path);
        }

        pub fn has_file(&self, path: &str) -> bool {
            self.state.borrow().files.contains_key(path)
        }

        pub fn has_dir(&self, path: &str) -> bool {
            self.state.borrow().dirs.contains(path)
        }

        pub fn file_count(&self) -> usize {
            self.state.borrow().files.len()
        }

        fn missing(path: &str) -> ThumbError {
            ThumbError::RemoteIo {
                path: path.to_string(),
                message: "no such file".to_string(),
            }
        }
    }

    impl RemoteFs for MemRemoteFs {
        fn stat(&self, path: &str) -> Result<RemoteStat> {
            let state = self.state.borrow();
            if let Some(data) = state.files.get(path) {
                return Ok(RemoteStat {
                    size: data.len() as u64,
                    is_dir: false,
                });
            }
            if state.dirs.contains(path) {
                return Ok(RemoteStat { size: 0, is_dir: true });
            }
            Err(Self::missing(path))
        }

        fn list(&self, path: &str) -> Result<Vec<String>> {
            let state = self.state.borrow();
            if !state.dirs.contains(path) {
                return Err(Self::missing(path));
            }
            let prefix = format!("{}/", path.trim_end_matches('/'));
            let mut names = BTreeSet::new();
            for key in state.files.keys().chain(state.dirs.iter()) {
                if let Some(rest) = key.strip_prefix(&prefix) {
                    if !rest.is_empty() && !rest.contains('/') {
                        names.insert(rest.to_string());
                    }
                }
            }
            Ok(names.into_iter().collect())
        }

        fn mkdir(&self, path: &str) -> Result<()> {
            let mut state = self.state.borrow_mut();
            if state.dirs.contains(path) || state.files.contains_key(path) {
                return Err(ThumbError::RemoteIo {
                    path: path.to_string(),
                    message: "already exists".to_string(),
                });
            }
            if !state.dirs.contains(&parent_of(path)) {
                return Err(Self::missing(path));
            }
            state.dirs.insert(path.to_string());
            Ok(())
        }

        fn write(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.fail_writes.get() {
                return Err(ThumbError::RemoteIo {
                    path: path.to_string(),
                    message: "write refused".to_string(),
                });
            }
            let mut state = self.state.borrow_mut();
            if !state.dirs.contains(&parent_of(path)) {
                return Err(Self::missing(path));
            }
            state.files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn remove(&self, path: &str) -> Result<()> {
            let mut state = self.state.borrow_mut();
            state
                .files
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| Self::missing(path))
        }

        fn rmdir(&self, path: &str) -> Result<()> {
            let mut state = self.state.borrow_mut();
            let prefix = format!("{}/", path.trim_end_matches('/'));
            let occupied = state.files.keys().any(|k| k.starts_with(&prefix))
                || state.dirs.iter().any(|d| d.starts_with(&prefix));
            if occupied {
                return Err(ThumbError::RemoteIo {
                    path: path.to_string(),
                    message: "directory not empty".to_string(),
                });
            }
            if !state.dirs.remove(path) {
                return Err(Self::missing(path));
            }
            Ok(())
        }
    }
}
