use crate::error::FadeError;
use std::fs::{self, Permissions};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Writes `contents` to `path` through a temporary file in the same directory
/// followed by a rename, so readers only ever see the old or the new file.
pub fn write_atomic(path: &Path, contents: &[u8], mode: Option<u32>) -> Result<(), FadeError> {
    let io_error = |reason: std::io::Error| FadeError::AtomicWrite {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_error)?;

    let mut temp_file = tempfile::Builder::new()
        .prefix(".fade-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(io_error)?;
    temp_file.write_all(contents).map_err(io_error)?;
    if let Some(mode) = mode {
        fs::set_permissions(temp_file.path(), Permissions::from_mode(mode)).map_err(io_error)?;
    }
    temp_file.as_file().sync_all().map_err(io_error)?;

    temp_file.persist(path).map_err(|e| io_error(e.error))?;
    tracing::trace!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
