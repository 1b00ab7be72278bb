use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Name of the stamp file recording the last remote check.
pub const THROTTLE_FILE_NAME: &str = "uprun-autoupdate";

/// Last-check timestamp persisted as a file's modification time.
///
/// Absence of the file means "never checked". The file is created on the
/// first check and touched on every subsequent one; it is never deleted.
/// Concurrent invocations race on it last-writer-wins, which is accepted.
#[derive(Debug, Clone)]
pub struct ThrottleFile {
    path: PathBuf,
}

impl ThrottleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stamp file at its default location in the system temp directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join(THROTTLE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Time since the last recorded check, or `None` if no check was ever
    /// recorded.
    pub fn elapsed_since_check(&self) -> Option<Duration> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or_default(),
        )
    }

    /// Record that a remote check happened now.
    pub fn record_check(&self) -> io::Result<()> {
        fs::write(&self.path, b"")
    }
}
