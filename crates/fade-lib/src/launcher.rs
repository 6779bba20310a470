use crate::config::{ProjectConfig, ProjectType};
use crate::error::FadeError;
use crate::project::ProjectPaths;
use crate::utils::write_atomic;
use std::path::PathBuf;

pub const LAUNCHER_MODE: u32 = 0o755;

/// Renders the `/usr/bin/<name>` entry point for `config`.
///
/// The output only depends on the name, type and run command, so generating
/// twice from the same configuration yields identical bytes.
pub fn generate(config: &ProjectConfig) -> String {
    let install_dir = config.install_dir();
    let mut script = format!(
        "#!/bin/sh\n# {} launcher ({}), generated by fade\n",
        config.name, config.project_type
    );

    match config.project_type {
        ProjectType::Normal => {
            script.push_str(&format!("cd {install_dir} || exit 1\n"));
            script.push_str(&format!("exec {} \"$@\"\n", config.run));
        }
        ProjectType::Service => {
            // The unit runs the command; the launcher only drives systemd.
            script.push_str(&format!(
                "exec systemctl \"${{1:-start}}\" {}\n",
                config.service_unit_name()
            ));
        }
        ProjectType::Isolated => {
            script.push_str(&format!("cd {install_dir} || exit 1\n"));
            script.push_str(&format!(
                "exec unshare --mount --net --pid --fork --mount-proc --map-root-user \
                 /bin/sh -c {} {} \"$@\"\n",
                shell_quote(&format!("{} \"$@\"", config.run)),
                config.name
            ));
        }
    }

    script
}

/// Renders the systemd unit shipped with `service` projects.
pub fn render_service_unit(config: &ProjectConfig) -> String {
    let synopsis = config.description.lines().next().unwrap_or_default().trim();
    format!(
        "[Unit]\n\
         Description={synopsis}\n\
         After=network.target\n\
         \n\
         [Service]\n\
         Type=simple\n\
         WorkingDirectory={}\n\
         ExecStart=/bin/sh -c \"{}\"\n\
         Restart=on-failure\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        config.install_dir(),
        systemd_escape(&config.run)
    )
}

/// Escapes a value for a double-quoted systemd `ExecStart` argument.
fn systemd_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "$$")
        .replace('%', "%%")
}

/// Wraps `value` in single quotes for `sh`.
pub(crate) fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Writes a freshly generated launcher into the staged tree.
pub fn install_launcher(paths: &ProjectPaths, config: &ProjectConfig) -> Result<PathBuf, FadeError> {
    let path = paths.launcher(&config.name);
    write_atomic(&path, generate(config).as_bytes(), Some(LAUNCHER_MODE))?;
    tracing::debug!("Installed {} launcher at {}", config.project_type, path.display());
    Ok(path)
}

/// Removes the staged launcher of project `name`, if there is one.
pub fn remove_launcher(paths: &ProjectPaths, name: &str) -> Result<(), FadeError> {
    let path = paths.launcher(name);
    match std::fs::remove_file(&path) {
        Ok(()) => {
            tracing::debug!("Removed launcher {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_config;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_normal_launcher_execs_run_command() {
        let config = sample_config();

        let launcher = generate(&config);

        assert!(launcher.starts_with("#!/bin/sh\n"));
        assert!(launcher.contains("cd /usr/lib/demo || exit 1\n"));
        assert!(launcher.ends_with("exec echo hi \"$@\"\n"));
    }

    #[test]
    fn test_service_launcher_defers_to_systemd() {
        let mut config = sample_config();
        config.project_type = ProjectType::Service;

        let launcher = generate(&config);

        assert!(launcher.contains("exec systemctl \"${1:-start}\" demo.service\n"));
        assert!(!launcher.contains("echo hi"));
    }

    #[test]
    fn test_isolated_launcher_unshares_namespaces() {
        let mut config = sample_config();
        config.project_type = ProjectType::Isolated;
        config.run = "python3 -c 'print(1)'".to_string();

        let launcher = generate(&config);

        assert!(launcher.contains("exec unshare --mount --net --pid --fork"));
        assert!(launcher.contains(r#"/bin/sh -c 'python3 -c '\''print(1)'\'' "$@"' demo "$@""#));
    }

    #[test]
    fn test_service_unit_runs_command() {
        let mut config = sample_config();
        config.project_type = ProjectType::Service;
        config.run = "node server.js --port \"$PORT\"".to_string();

        let unit = render_service_unit(&config);

        assert!(unit.contains("Description=Demo project\n"));
        assert!(unit.contains("WorkingDirectory=/usr/lib/demo\n"));
        assert!(unit.contains(r#"ExecStart=/bin/sh -c "node server.js --port \"$$PORT\"""#));
        assert!(unit.ends_with("WantedBy=multi-user.target\n"));
    }

    #[test]
    fn test_generation_is_pure() {
        let config = sample_config();
        assert_eq!(generate(&config), generate(&config.clone()));
    }

    #[test]
    fn test_install_overwrites_previous_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path());
        let config = sample_config();
        let path = paths.launcher(&config.name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale launcher").unwrap();

        install_launcher(&paths, &config).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), generate(&config));
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, LAUNCHER_MODE);
    }

    #[test]
    fn test_remove_missing_launcher_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path());

        assert!(remove_launcher(&paths, "demo").is_ok());
    }
}
