use crate::cli::InitParams;
use crate::error::FadeError;
use crate::project::initialize;

pub fn run_init(params: InitParams) -> Result<(), FadeError> {
    let InitParams { paths, config } = params;

    initialize(&paths, &config)?;

    tracing::info!("Configuration saved to {}", paths.config_file().display());
    Ok(())
}
