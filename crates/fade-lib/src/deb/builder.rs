use super::archive::{build_deb, build_tar_gz};
use super::control::{installed_size_kib, render_control, render_md5sums};
use super::payload::{PayloadFile, collect_payload};
use crate::config::{ProjectConfig, ProjectType, ensure_complete};
use crate::error::FadeError;
use crate::launcher::{LAUNCHER_MODE, generate, render_service_unit};
use crate::payload::{ScriptKind, render_maintainer_script};
use crate::project::ProjectPaths;
use std::time::{SystemTime, UNIX_EPOCH};

const SCRIPT_MODE: u32 = 0o755;
const METADATA_MODE: u32 = 0o644;

#[derive(Clone, Copy, Debug)]
pub struct BuildOptions {
    /// Modification time recorded for every archive entry
    pub mtime: u64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        let mtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        Self { mtime }
    }
}

/// A fully assembled package held in memory.
#[derive(Clone, Debug)]
pub struct DebArtifact {
    /// `<name>_<version>_<architecture>.deb`
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Files generated from the configuration rather than read from the project.
fn generated_files(config: &ProjectConfig) -> Vec<PayloadFile> {
    let launcher = ProjectPaths::launcher_relative(&config.name);
    let mut files = vec![PayloadFile::data(
        launcher.to_string_lossy(),
        LAUNCHER_MODE,
        generate(config),
    )];

    if config.project_type == ProjectType::Service {
        files.push(PayloadFile::data(
            format!("lib/systemd/system/{}", config.service_unit_name()),
            METADATA_MODE,
            render_service_unit(config),
        ));
    }

    files
}

/// Assembles the package for the project at `paths`.
///
/// The configuration is only read. Everything is built in memory, so an
/// error never leaves a partial package behind.
pub fn build(
    paths: &ProjectPaths,
    config: &ProjectConfig,
    options: BuildOptions,
) -> Result<DebArtifact, FadeError> {
    ensure_complete(config)?;

    tracing::info!("Collecting payload files...");
    let mut data_files = collect_payload(paths, config)?;
    data_files.extend(generated_files(config));

    let control = render_control(config, installed_size_kib(&data_files))?;
    let mut control_files = vec![
        PayloadFile::data("control", METADATA_MODE, control),
        PayloadFile::data("md5sums", METADATA_MODE, render_md5sums(&data_files)),
    ];
    for kind in ScriptKind::ALL {
        control_files.push(PayloadFile::data(
            kind.file_name(),
            SCRIPT_MODE,
            render_maintainer_script(kind, config),
        ));
    }

    tracing::info!("Packing {} files...", data_files.len());
    let control_tar_gz = build_tar_gz(&control_files, options.mtime)?;
    let data_tar_gz = build_tar_gz(&data_files, options.mtime)?;
    let bytes = build_deb(&control_tar_gz, &data_tar_gz, options.mtime)?;

    Ok(DebArtifact {
        file_name: config.deb_file_name(),
        bytes,
    })
}
