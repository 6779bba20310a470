use crate::cli::args::{Command, ProjectOptions};
use crate::cli::params::{CreateDebParams, DebSink, EditParams, InitParams};
use crate::config::{PartialProjectConfig, import_partial};
use crate::error::FadeError;
use crate::merge::{ConfigUpdate, ListDelta};
use crate::payload::{ScriptKind, read_payload_file};
use crate::project::{self, ProjectPaths};
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Init(InitParams),
    Edit(EditParams),
    CreateDeb(CreateDebParams),
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    (!items.is_empty()).then_some(items)
}

impl ProjectOptions {
    /// Converts the flags into a sparse configuration, reading payload files.
    pub fn into_partial(self) -> Result<PartialProjectConfig, FadeError> {
        let postinst_payload = match self.input_postinst {
            Some(path) => Some(read_payload_file(&path)?),
            None => self.postinst_payload,
        };
        let prerm_payload = match self.input_prerm {
            Some(path) => Some(read_payload_file(&path)?),
            None => self.prerm_payload,
        };

        Ok(PartialProjectConfig {
            name: self.name,
            version: self.package_version,
            description: self.description,
            url: self.url,
            architecture: self.architecture,
            priority: self.priority,
            maintainer_name: self.maintainer_name,
            maintainer_email: self.maintainer_email,
            project_type: self.project_type,
            run: self.run,
            depends: non_empty(self.depends),
            blacklist: non_empty(self.blacklist),
            postinst_payload,
            prerm_payload,
        })
    }
}

fn parse_bind_address(bind: &str) -> Result<SocketAddr, FadeError> {
    bind.parse()
        .map_err(|e| FadeError::CliArgumentValidation {
            details: format!("--bind '{bind}' is not a socket address: {e}"),
        })
}

/// Checks arguments and loads everything a command needs before it runs.
pub fn resolve_command(command: Command) -> Result<ResolvedCommand, FadeError> {
    match command {
        Command::Init {
            path,
            input,
            options,
        } => {
            let paths = ProjectPaths::new(path);
            let imported = match input {
                Some(input) => {
                    tracing::info!("Importing configuration from {}", input);
                    import_partial(&input)?
                }
                None => PartialProjectConfig::default(),
            };
            let config = imported.overlay(options.into_partial()?).into_new_config()?;

            Ok(ResolvedCommand::Init(InitParams { paths, config }))
        }
        Command::Edit {
            path,
            options,
            depend_add,
            depend_rm,
            blacklist_add,
            blacklist_rm,
            edit_postinst,
            edit_prerm,
        } => {
            let paths = ProjectPaths::new(path);
            project::validate(&paths)?;

            let edit_scripts = ScriptKind::ALL
                .into_iter()
                .zip([edit_postinst, edit_prerm])
                .filter_map(|(kind, requested)| requested.then_some(kind))
                .collect();

            Ok(ResolvedCommand::Edit(EditParams {
                paths,
                update: ConfigUpdate {
                    fields: options.into_partial()?,
                    depends: ListDelta {
                        add: depend_add,
                        remove: depend_rm,
                    },
                    blacklist: ListDelta {
                        add: blacklist_add,
                        remove: blacklist_rm,
                    },
                },
                edit_scripts,
            }))
        }
        Command::CreateDeb {
            path,
            output,
            host,
            bind,
        } => {
            let paths = ProjectPaths::new(path);
            project::validate(&paths)?;

            let sink = if host {
                DebSink::Host(parse_bind_address(&bind)?)
            } else {
                DebSink::File(output)
            };

            Ok(ResolvedCommand::CreateDeb(CreateDebParams { paths, sink }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::try_parse_command;
    use crate::config::ProjectType;
    use crate::test_support::init_project;

    fn resolve(args: &[&str]) -> Result<ResolvedCommand, FadeError> {
        resolve_command(try_parse_command(args.iter().copied()).unwrap())
    }

    #[test]
    fn test_init_overlays_flags_on_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("other.json");
        std::fs::write(
            &input,
            r#"{"name": "imported", "version": "0.1", "desc": "Imported", "run": "./start",
                "maintainer_name": "A", "maintainer_email": "a@example.com",
                "type": "service", "depends": ["nodejs"]}"#,
        )
        .unwrap();
        let root = dir.path().to_str().unwrap();

        let resolved = resolve(&[
            "fade",
            "init",
            "--path",
            root,
            "--input",
            input.to_str().unwrap(),
            "--version",
            "0.2",
        ])
        .unwrap();

        let ResolvedCommand::Init(params) = resolved else {
            panic!("expected init");
        };
        assert_eq!(params.config.name, "imported");
        assert_eq!(params.config.version, "0.2");
        assert_eq!(params.config.project_type, ProjectType::Service);
    }

    #[test]
    fn test_init_reports_missing_field() {
        let dir = tempfile::tempdir().unwrap();

        let err = resolve(&[
            "fade",
            "init",
            "--path",
            dir.path().to_str().unwrap(),
            "--name",
            "demo",
        ])
        .unwrap_err();

        assert!(matches!(err, FadeError::Validation { field, .. } if field == "version"));
    }

    #[test]
    fn test_payload_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        init_project(dir.path());
        let script = dir.path().join("post.sh");
        std::fs::write(&script, "useradd demo\n").unwrap();

        let resolved = resolve(&[
            "fade",
            "edit",
            "--path",
            dir.path().to_str().unwrap(),
            "--input-postinst",
            script.to_str().unwrap(),
        ])
        .unwrap();

        let ResolvedCommand::Edit(params) = resolved else {
            panic!("expected edit");
        };
        assert_eq!(
            params.fields().postinst_payload.as_deref(),
            Some("useradd demo\n")
        );
    }

    #[test]
    fn test_missing_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        init_project(dir.path());

        let err = resolve(&[
            "fade",
            "edit",
            "--path",
            dir.path().to_str().unwrap(),
            "--input-prerm",
            dir.path().join("absent.sh").to_str().unwrap(),
        ])
        .unwrap_err();

        assert!(matches!(err, FadeError::PayloadRead { .. }));
    }

    #[test]
    fn test_edit_requires_project() {
        let dir = tempfile::tempdir().unwrap();

        let err = resolve(&["fade", "edit", "--path", dir.path().to_str().unwrap()]).unwrap_err();

        assert!(matches!(err, FadeError::ProjectNotInitialized { .. }));
    }

    #[test]
    fn test_host_sink_parses_bind_address() {
        let dir = tempfile::tempdir().unwrap();
        init_project(dir.path());
        let root = dir.path().to_str().unwrap();

        let ResolvedCommand::CreateDeb(params) =
            resolve(&["fade", "create-deb", "--path", root, "--host", "--bind", "127.0.0.1:9000"])
                .unwrap()
        else {
            panic!("expected create-deb");
        };
        assert_eq!(params.sink, DebSink::Host("127.0.0.1:9000".parse().unwrap()));

        let err = resolve(&["fade", "deb", "--path", root, "--host", "--bind", "nowhere"])
            .unwrap_err();
        assert!(matches!(err, FadeError::CliArgumentValidation { .. }));
    }
}
