use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure classes on the update path.
///
/// All of these degrade to running the currently installed binary; an update
/// attempt never aborts the user's invocation. `RollbackFailed` and `Restart`
/// are the two conditions that can leave the installation needing manual
/// repair, and are the only ones reported at error level.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("could not resolve the latest release version: {reason}")]
    Resolution { reason: String },

    #[error("invalid semantic version {input:?}")]
    Parse {
        input: String,
        #[source]
        source: semver::Error,
    },

    #[error("invalid download url {url:?}")]
    InvalidUrl { url: String },

    #[error("download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("unusable update archive: {reason}")]
    Archive { reason: String },

    #[error("could not replace executable {}", .path.display())]
    Apply {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "update failed ({apply}) and restoring the previous executable from {} also failed \
         ({rollback}); reinstall uprun to recover",
        .backup.display()
    )]
    RollbackFailed {
        apply: io::Error,
        rollback: io::Error,
        backup: PathBuf,
    },

    #[error("failed to restart after update")]
    Restart(#[source] io::Error),
}
