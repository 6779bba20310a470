use crate::cli::{CreateDebParams, DebSink};
use crate::deb::{BuildOptions, build};
use crate::error::FadeError;
use crate::output::{host_deb, write_deb_file};
use crate::project;

pub async fn run_create_deb(params: CreateDebParams) -> Result<(), FadeError> {
    let CreateDebParams { paths, sink } = params;

    let config = project::load(&paths)?;
    tracing::info!("Building {} {}...", config.name, config.version);
    let artifact = build(&paths, &config, BuildOptions::default())?;
    tracing::debug!("{} is {} bytes", artifact.file_name, artifact.bytes.len());

    match sink {
        DebSink::File(output) => {
            let path = write_deb_file(&artifact, output.as_deref())?;
            tracing::info!("Package written to {}", path.display());
        }
        DebSink::Host(address) => host_deb(&artifact, address).await?,
    }

    Ok(())
}
