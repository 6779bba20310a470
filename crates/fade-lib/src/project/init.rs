use super::{ProjectPaths, save};
use crate::config::{ProjectConfig, validate_config};
use crate::error::FadeError;
use crate::launcher::install_launcher;

/// Creates the work directory of a new project: launcher first, configuration last.
pub fn initialize(paths: &ProjectPaths, config: &ProjectConfig) -> Result<(), FadeError> {
    if paths.is_initialized() {
        return Err(FadeError::ProjectAlreadyInitialized {
            path: paths.root().to_path_buf(),
        });
    }
    if !paths.root().is_dir() {
        return Err(FadeError::validation(
            "path",
            format!("{} is not a directory", paths.root().display()),
        ));
    }
    validate_config(config)?;

    std::fs::create_dir_all(paths.work_dir())?;
    install_launcher(paths, config)?;
    save(paths, config)?;

    tracing::info!(
        "Initialized {} project {} in {}",
        config.project_type,
        config.name,
        paths.work_dir().display()
    );
    Ok(())
}
