use crate::config::{ProjectConfig, ProjectType};
use crate::error::FadeError;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Maintainer scripts whose body can be supplied by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScriptKind {
    PostInst,
    PreRm,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 2] = [ScriptKind::PostInst, ScriptKind::PreRm];

    /// Member name inside `control.tar.gz`.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::PostInst => "postinst",
            Self::PreRm => "prerm",
        }
    }
}

/// Something that lets a user rewrite a payload, typically an interactive editor.
pub trait PayloadEditor {
    /// Returns the full text after editing. Returning the input unchanged means
    /// nothing was edited.
    fn edit(&self, kind: ScriptKind, current: Option<&str>) -> Result<String, FadeError>;
}

impl<F> PayloadEditor for F
where
    F: Fn(ScriptKind, Option<&str>) -> Result<String, FadeError>,
{
    fn edit(&self, kind: ScriptKind, current: Option<&str>) -> Result<String, FadeError> {
        self(kind, current)
    }
}

/// Opens the payload in `$VISUAL`, `$EDITOR` or `vi`.
#[derive(Clone, Debug)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_env() -> Self {
        let command = ["VISUAL", "EDITOR"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string());
        Self::new(command)
    }
}

impl PayloadEditor for ExternalEditor {
    fn edit(&self, kind: ScriptKind, current: Option<&str>) -> Result<String, FadeError> {
        let editor_error = |reason: String| FadeError::Editor {
            script: kind.file_name().to_string(),
            reason,
        };

        let mut buffer = tempfile::Builder::new()
            .prefix(&format!("fade-{}-", kind.file_name()))
            .suffix(".sh")
            .tempfile()?;
        buffer.write_all(current.unwrap_or_default().as_bytes())?;
        buffer.flush()?;

        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| editor_error("no editor configured".to_string()))?;

        tracing::debug!("Opening {} payload with {}", kind.file_name(), self.command);
        let status = Command::new(program)
            .args(parts)
            .arg(buffer.path())
            .status()
            .map_err(|e| editor_error(format!("could not start '{}': {e}", self.command)))?;
        if !status.success() {
            return Err(editor_error(format!("'{}' exited with {status}", self.command)));
        }

        Ok(std::fs::read_to_string(buffer.path())?)
    }
}

/// Runs `editor` on the payload of `kind` and stores the result in `config`.
/// Returns whether the payload changed.
pub fn edit_payload(
    editor: &dyn PayloadEditor,
    config: &mut ProjectConfig,
    kind: ScriptKind,
) -> Result<bool, FadeError> {
    let current = config.payload(kind);
    let edited = editor.edit(kind, current)?;

    let unchanged = match current {
        Some(current) => current == edited,
        None => edited.is_empty(),
    };
    if unchanged {
        tracing::info!("{} payload left unchanged", kind.file_name());
        return Ok(false);
    }

    config.set_payload(kind, Some(edited));
    Ok(true)
}

/// Reads a payload body from a file given on the command line.
pub fn read_payload_file(path: &Path) -> Result<String, FadeError> {
    std::fs::read_to_string(path).map_err(|e| FadeError::PayloadRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Splices the user payload into the fixed maintainer script template.
pub fn render_maintainer_script(kind: ScriptKind, config: &ProjectConfig) -> String {
    let mut script = String::from("#!/bin/sh\nset -e\n");
    let service = config.project_type == ProjectType::Service;
    let unit = config.service_unit_name();

    if kind == ScriptKind::PreRm && service {
        script.push_str(&format!(
            "\nif command -v systemctl >/dev/null 2>&1; then\n    \
             systemctl stop {unit} || true\n    \
             systemctl disable {unit} || true\n\
             fi\n"
        ));
    }

    if let Some(payload) = config.payload(kind).filter(|p| !p.trim().is_empty()) {
        script.push('\n');
        script.push_str(payload);
        if !payload.ends_with('\n') {
            script.push('\n');
        }
    }

    if kind == ScriptKind::PostInst && service {
        script.push_str(&format!(
            "\nif [ \"$1\" = \"configure\" ] && command -v systemctl >/dev/null 2>&1; then\n    \
             systemctl daemon-reload || true\n    \
             systemctl enable {unit} || true\n    \
             systemctl restart {unit} || true\n\
             fi\n"
        ));
    }

    script.push_str("\nexit 0\n");
    script
}
