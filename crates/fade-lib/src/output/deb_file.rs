use crate::deb::DebArtifact;
use crate::error::FadeError;
use crate::utils::write_atomic;
use std::path::{Path, PathBuf};

const DEB_MODE: u32 = 0o644;

/// Where a `.deb` ends up when no `--output` is given, or when it names a directory.
pub fn resolve_output_path(artifact: &DebArtifact, output: Option<&Path>) -> PathBuf {
    match output {
        Some(output) if output.is_dir() => output.join(&artifact.file_name),
        Some(output) => output.to_path_buf(),
        None => PathBuf::from(&artifact.file_name),
    }
}

/// Writes the package atomically and returns its path.
pub fn write_deb_file(artifact: &DebArtifact, output: Option<&Path>) -> Result<PathBuf, FadeError> {
    let path = resolve_output_path(artifact, output);
    write_atomic(&path, &artifact.bytes, Some(DEB_MODE))?;
    Ok(path)
}
