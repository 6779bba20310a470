use crate::config::{PartialProjectConfig, ProjectConfig};
use crate::merge::ConfigUpdate;
use crate::payload::ScriptKind;
use crate::project::ProjectPaths;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct InitParams {
    pub paths: ProjectPaths,
    pub config: ProjectConfig,
}

#[derive(Debug, Clone)]
pub struct EditParams {
    pub paths: ProjectPaths,
    pub update: ConfigUpdate,
    /// Payloads to open in the editor after the field update is applied
    pub edit_scripts: Vec<ScriptKind>,
}

impl EditParams {
    pub fn fields(&self) -> &PartialProjectConfig {
        &self.update.fields
    }
}

/// Where `create-deb` delivers the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebSink {
    /// `None` writes `<name>_<version>_<arch>.deb` into the working directory
    File(Option<PathBuf>),
    Host(SocketAddr),
}

#[derive(Debug, Clone)]
pub struct CreateDebParams {
    pub paths: ProjectPaths,
    pub sink: DebSink,
}
