use super::PartialProjectConfig;
use crate::error::FadeError;
use config::Config as ConfigBuilder;

/// Reads a partial project configuration, e.g. a `fade.json` from another project.
/// The format follows the file extension.
pub fn import_partial(input_path: &str) -> Result<PartialProjectConfig, FadeError> {
    let config_builder = ConfigBuilder::builder()
        .add_source(config::File::with_name(input_path))
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectType;

    #[test]
    fn test_import_partial_reads_fade_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fade.json");
        std::fs::write(
            &path,
            r#"{
                "name": "imported",
                "version": "0.3.1",
                "desc": "Imported project",
                "type": "service",
                "depends": ["nodejs", "npm"]
            }"#,
        )
        .unwrap();

        let partial = import_partial(path.to_str().unwrap()).unwrap();

        assert_eq!(partial.name.as_deref(), Some("imported"));
        assert_eq!(partial.description.as_deref(), Some("Imported project"));
        assert_eq!(partial.project_type, Some(ProjectType::Service));
        assert_eq!(
            partial.depends,
            Some(vec!["nodejs".to_string(), "npm".to_string()])
        );
        assert!(partial.run.is_none());
    }

    #[test]
    fn test_import_partial_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        assert!(matches!(
            import_partial(path.to_str().unwrap()),
            Err(FadeError::Config(_))
        ));
    }
}
