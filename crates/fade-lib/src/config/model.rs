use crate::error::FadeError;
use crate::payload::ScriptKind;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const DEFAULT_URL: &str = "https://example.com/";
pub const DEFAULT_ARCHITECTURE: &str = "all";
pub const DEFAULT_PRIORITY: &str = "optional";

/// Decides what kind of launcher the package installs at `/usr/bin/<name>`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// Managed by systemd; the launcher only forwards lifecycle commands.
    Service,
    /// Runs inside fresh mount, pid and network namespaces.
    Isolated,
    /// Plain wrapper around the run command.
    Normal,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Isolated => "isolated",
            Self::Normal => "normal",
        }
    }
}

impl Display for ProjectType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_architecture() -> String {
    DEFAULT_ARCHITECTURE.to_string()
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

/// Persisted state of a project, stored as `.fadework/fade.json`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Package name, restricted to the Debian package name charset
    pub name: String,
    /// Debian version string
    pub version: String,
    /// Synopsis on the first line, extended description after it
    #[serde(rename = "desc", alias = "description")]
    pub description: String,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_architecture")]
    pub architecture: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    pub maintainer_name: String,
    pub maintainer_email: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    /// Command line executed by the launcher
    pub run: String,
    /// Dependency specifications, one `Depends` item each
    pub depends: Vec<String>,
    /// Project-relative paths excluded from the package; `dir/` excludes a directory
    #[serde(default)]
    pub blacklist: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postinst_payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerm_payload: Option<String>,
}

impl ProjectConfig {
    pub fn maintainer(&self) -> String {
        format!("{} <{}>", self.maintainer_name, self.maintainer_email)
    }

    /// Directory the project files are installed into on the target system.
    pub fn install_dir(&self) -> String {
        format!("/usr/lib/{}", self.name)
    }

    pub fn service_unit_name(&self) -> String {
        format!("{}.service", self.name)
    }

    pub fn deb_file_name(&self) -> String {
        format!("{}_{}_{}.deb", self.name, self.version, self.architecture)
    }

    pub fn payload(&self, kind: ScriptKind) -> Option<&str> {
        match kind {
            ScriptKind::PostInst => self.postinst_payload.as_deref(),
            ScriptKind::PreRm => self.prerm_payload.as_deref(),
        }
    }

    pub fn set_payload(&mut self, kind: ScriptKind, payload: Option<String>) {
        match kind {
            ScriptKind::PostInst => self.postinst_payload = payload,
            ScriptKind::PreRm => self.prerm_payload = payload,
        }
    }
}

/// A sparse configuration as supplied by the CLI or an `--input` file.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialProjectConfig {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "desc", alias = "description")]
    pub description: Option<String>,
    pub url: Option<String>,
    pub architecture: Option<String>,
    pub priority: Option<String>,
    pub maintainer_name: Option<String>,
    pub maintainer_email: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
    pub run: Option<String>,
    pub depends: Option<Vec<String>>,
    pub blacklist: Option<Vec<String>>,
    pub postinst_payload: Option<String>,
    pub prerm_payload: Option<String>,
}

impl PartialProjectConfig {
    /// Fields set in `overrides` win over the ones in `self`.
    pub fn overlay(self, overrides: PartialProjectConfig) -> Self {
        Self {
            name: overrides.name.or(self.name),
            version: overrides.version.or(self.version),
            description: overrides.description.or(self.description),
            url: overrides.url.or(self.url),
            architecture: overrides.architecture.or(self.architecture),
            priority: overrides.priority.or(self.priority),
            maintainer_name: overrides.maintainer_name.or(self.maintainer_name),
            maintainer_email: overrides.maintainer_email.or(self.maintainer_email),
            project_type: overrides.project_type.or(self.project_type),
            run: overrides.run.or(self.run),
            depends: overrides.depends.or(self.depends),
            blacklist: overrides.blacklist.or(self.blacklist),
            postinst_payload: overrides.postinst_payload.or(self.postinst_payload),
            prerm_payload: overrides.prerm_payload.or(self.prerm_payload),
        }
    }

    /// Builds the configuration of a new project, failing on the first missing
    /// mandatory field and filling defaults for the rest.
    pub fn into_new_config(self) -> Result<ProjectConfig, FadeError> {
        let name = self.name.ok_or_else(|| FadeError::missing("name"))?;
        let version = self.version.ok_or_else(|| FadeError::missing("version"))?;
        let description = self
            .description
            .ok_or_else(|| FadeError::missing("description"))?;
        let run = self.run.ok_or_else(|| FadeError::missing("run"))?;
        let maintainer_name = self
            .maintainer_name
            .ok_or_else(|| FadeError::missing("maintainer_name"))?;
        let maintainer_email = self
            .maintainer_email
            .ok_or_else(|| FadeError::missing("maintainer_email"))?;
        let project_type = self.project_type.ok_or_else(|| FadeError::missing("type"))?;
        let depends = self
            .depends
            .filter(|depends| !depends.is_empty())
            .ok_or_else(|| FadeError::missing("depends"))?;

        let config = ProjectConfig {
            name,
            version,
            description,
            url: self.url.unwrap_or_else(default_url),
            architecture: self.architecture.unwrap_or_else(default_architecture),
            priority: self.priority.unwrap_or_else(default_priority),
            maintainer_name,
            maintainer_email,
            project_type,
            run,
            depends,
            blacklist: self.blacklist.unwrap_or_default(),
            postinst_payload: self.postinst_payload,
            prerm_payload: self.prerm_payload,
        };
        super::validate_config(&config)?;
        Ok(config)
    }
}
