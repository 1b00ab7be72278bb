use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::artifact;
use crate::error::UpdateError;
use crate::release;

/// Download the release archive at `url` and swap the running executable for
/// the binary packaged inside it.
pub fn apply_update(url: &str) -> Result<(), UpdateError> {
    if url.is_empty() {
        return Err(UpdateError::InvalidUrl {
            url: url.to_string(),
        });
    }

    let target = std::env::current_exe().map_err(|source| UpdateError::Apply {
        path: PathBuf::from(artifact::TOOL_NAME),
        source,
    })?;

    let body = download_archive(url)?;
    apply_archive(&body, &target)
}

/// Extract the packaged binary from an already downloaded archive and swap
/// it into place at `target`.
pub fn apply_archive(body: &[u8], target: &Path) -> Result<(), UpdateError> {
    let binary = extract_binary(body, artifact::expected_binary_name())?;
    replace_executable(target, &binary)
}

/// Fetch the archive fully into memory.
fn download_archive(url: &str) -> Result<Vec<u8>, UpdateError> {
    let download_err = |reason: String| UpdateError::Download {
        url: url.to_string(),
        reason,
    };

    let response = release::http_agent()
        .get(url)
        .set("User-Agent", release::USER_AGENT)
        .call()
        .map_err(|err| download_err(err.to_string()))?;

    if response.status() != 200 {
        return Err(download_err(format!("status {}", response.status())));
    }

    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|err| download_err(err.to_string()))?;

    Ok(body)
}

/// Pull the packaged executable out of the archive.
///
/// Entries are matched by file name against `expected`; release archives
/// contain exactly one binary, so the first entry is the fallback when
/// nothing matches.
fn extract_binary(body: &[u8], expected: &str) -> Result<Vec<u8>, UpdateError> {
    let mut archive =
        ZipArchive::new(Cursor::new(body)).map_err(|err| UpdateError::Archive {
            reason: format!("not a zip archive: {err}"),
        })?;

    if archive.len() == 0 {
        return Err(UpdateError::Archive {
            reason: "archive contains no files".to_string(),
        });
    }

    let index = (0..archive.len())
        .find(|&i| {
            archive.by_index(i).ok().is_some_and(|entry| {
                Path::new(entry.name()).file_name().and_then(|n| n.to_str()) == Some(expected)
            })
        })
        .unwrap_or(0);

    let mut entry = archive.by_index(index).map_err(|err| UpdateError::Archive {
        reason: format!("unreadable archive entry {index}: {err}"),
    })?;

    let mut binary = Vec::new();
    entry
        .read_to_end(&mut binary)
        .map_err(|err| UpdateError::Archive {
            reason: format!("unreadable archive entry {}: {err}", entry.name()),
        })?;

    Ok(binary)
}

fn apply_err(target: &Path, source: io::Error) -> UpdateError {
    UpdateError::Apply {
        path: target.to_path_buf(),
        source,
    }
}

/// Swap `target` for `binary` via rename, which is atomic on the local
/// filesystem and the only legal way to replace a running image on Windows.
///
/// The previous executable is kept next to the target until the swap
/// succeeds; if the swap fails and the previous executable cannot be put
/// back, the installation needs manual repair and the error says so.
fn replace_executable(target: &Path, binary: &[u8]) -> Result<(), UpdateError> {
    let staging = target.with_extension("new");
    let backup = target.with_extension("old");

    // Carry over the current permission bits so the execute bit survives.
    #[cfg(unix)]
    let mode = {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(target)
            .map_err(|err| apply_err(target, err))?
            .permissions()
            .mode()
    };

    fs::write(&staging, binary).map_err(|err| apply_err(target, err))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&staging, fs::Permissions::from_mode(mode))
            .map_err(|err| apply_err(target, err))?;
    }

    // A leftover backup from an earlier run would make the rename fail on
    // Windows.
    let _ = fs::remove_file(&backup);

    if let Err(err) = fs::rename(target, &backup) {
        let _ = fs::remove_file(&staging);
        return Err(apply_err(target, err));
    }

    if let Err(err) = fs::rename(&staging, target) {
        let _ = fs::remove_file(&staging);
        if let Err(rollback) = fs::rename(&backup, target) {
            return Err(UpdateError::RollbackFailed {
                apply: err,
                rollback,
                backup,
            });
        }
        return Err(apply_err(target, err));
    }

    // The old image may still be mapped on Windows; leaving it behind until
    // the next update is tolerated.
    let _ = fs::remove_file(&backup);
    Ok(())
}
