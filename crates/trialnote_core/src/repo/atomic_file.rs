//! Write-to-temp-then-rename file replacement.

use super::{RepoError, RepoResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Replaces `path` with `bytes` so readers see either the old or the new file.
///
/// The temp file lives next to the target so the final rename stays on one
/// filesystem. On any failure before the rename the temp file is removed.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> RepoResult<()> {
    let temp_path = temp_path_for(path);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)?;
        temp_file.write_all(bytes)?;
        temp_file.flush()?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(RepoError::io(&temp_path, err));
    }

    if let Err(err) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(RepoError::io(path, err));
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|value| value.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
