use super::ProjectPaths;
use crate::config::ProjectConfig;
use crate::error::FadeError;
use crate::utils::write_atomic;

/// Fails fast when `paths` does not hold an initialized project.
pub fn validate(paths: &ProjectPaths) -> Result<(), FadeError> {
    if paths.is_initialized() {
        Ok(())
    } else {
        Err(FadeError::ProjectNotInitialized {
            path: paths.root().to_path_buf(),
        })
    }
}

pub fn load(paths: &ProjectPaths) -> Result<ProjectConfig, FadeError> {
    validate(paths)?;
    let path = paths.config_file();

    let content = std::fs::read_to_string(path).map_err(|e| FadeError::CorruptState {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: ProjectConfig =
        serde_json::from_str(&content).map_err(|e| FadeError::CorruptState {
            path: path.to_path_buf(),
            reason: format!("JSON parsing failed: {}", e),
        })?;

    tracing::debug!("Loaded configuration of {} from {}", config.name, path.display());
    Ok(config)
}

pub fn save(paths: &ProjectPaths, config: &ProjectConfig) -> Result<(), FadeError> {
    let mut json = serde_json::to_string_pretty(config)?;
    json.push('\n');
    write_atomic(paths.config_file(), json.as_bytes(), None)?;

    tracing::debug!("Saved configuration to {}", paths.config_file().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_config;

    #[test]
    fn test_validate_uninitialized_project() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path());

        assert!(matches!(
            validate(&paths),
            Err(FadeError::ProjectNotInitialized { .. })
        ));
        assert!(matches!(
            load(&paths),
            Err(FadeError::ProjectNotInitialized { .. })
        ));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path());
        let mut config = sample_config();
        config.blacklist = vec!["logs/".to_string(), "README.md".to_string()];
        config.postinst_payload = Some("echo installed\n".to_string());

        save(&paths, &config).unwrap();

        assert!(validate(&paths).is_ok());
        assert_eq!(load(&paths).unwrap(), config);
    }

    #[test]
    fn test_saved_json_is_pretty_printed_in_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path());

        save(&paths, &sample_config()).unwrap();

        let content = std::fs::read_to_string(paths.config_file()).unwrap();
        assert!(content.starts_with("{\n  \"name\": \"demo\",\n  \"version\": \"1.0\","));
        assert!(content.ends_with("}\n"));
    }

    #[test]
    fn test_load_rejects_malformed_state() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path());
        std::fs::create_dir_all(paths.work_dir()).unwrap();

        for content in [
            "{ not json",
            r#"{"name": "demo"}"#,
            r#"{"name": "demo", "version": "1.0", "desc": "d", "maintainer_name": "a",
                "maintainer_email": "a@b", "type": "daemon", "run": "x", "depends": []}"#,
        ] {
            std::fs::write(paths.config_file(), content).unwrap();
            assert!(matches!(load(&paths), Err(FadeError::CorruptState { .. })));
        }
    }
}
