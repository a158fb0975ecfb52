//! Persistent sinks for serialized credentials.

use std::fs;
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{GauthError, Result};

#[cfg(unix)]
const CREDENTIAL_MODE: u32 = 0o600;

/// UTF-8 text storage addressed by path.
///
/// `write` replaces the whole content; readers never observe a partial write.
pub trait CredentialSink: Send + Sync {
    fn read(&self, location: &Path) -> Result<String>;
    fn write(&self, location: &Path, contents: &str) -> Result<()>;
}

/// Filesystem sink. Writes go to a sibling temp file that is renamed over
/// the target, with `0600` permissions on Unix.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl CredentialSink for FileSink {
    fn read(&self, location: &Path) -> Result<String> {
        fs::read_to_string(location).map_err(|e| GauthError::persistence(location, e))
    }

    fn write(&self, location: &Path, contents: &str) -> Result<()> {
        replace_file(location, contents.as_bytes()).map_err(|e| GauthError::persistence(location, e))
    }
}

/// Replace `target` with `contents` through a sibling staging file.
fn replace_file(target: &Path, contents: &[u8]) -> io::Result<()> {
    let staging = staging_path(target)?;
    if let Some(dir) = staging.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let committed = write_staging(&staging, contents).and_then(|()| fs::rename(&staging, target));
    if committed.is_err() {
        let _ = fs::remove_file(&staging);
    }
    committed?;

    #[cfg(unix)]
    fs::set_permissions(target, fs::Permissions::from_mode(CREDENTIAL_MODE))?;
    Ok(())
}

/// `.<name>.gauth-<pid>-<nanos>` next to `target`.
fn staging_path(target: &Path) -> io::Result<PathBuf> {
    let name = target.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a credential file", target.display()),
        )
    })?;
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    Ok(target.with_file_name(format!(
        ".{}.gauth-{}-{stamp}",
        name.to_string_lossy(),
        std::process::id()
    )))
}

fn write_staging(staging: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(CREDENTIAL_MODE);

    let mut file = options.open(staging)?;
    file.write_all(contents)?;
    file.sync_all()
}
