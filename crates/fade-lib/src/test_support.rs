use crate::config::{PartialProjectConfig, ProjectConfig, ProjectType};
use crate::project::{ProjectPaths, initialize};
use std::path::Path;

pub(crate) fn complete_partial() -> PartialProjectConfig {
    PartialProjectConfig {
        name: Some("demo".to_string()),
        version: Some("1.0".to_string()),
        description: Some("Demo project".to_string()),
        run: Some("echo hi".to_string()),
        maintainer_name: Some("Jane Doe".to_string()),
        maintainer_email: Some("jane@example.com".to_string()),
        project_type: Some(ProjectType::Normal),
        depends: Some(vec!["bash".to_string()]),
        ..Default::default()
    }
}

pub(crate) fn sample_config() -> ProjectConfig {
    complete_partial()
        .into_new_config()
        .expect("sample config is valid")
}

pub(crate) fn init_project(root: &Path) -> (ProjectPaths, ProjectConfig) {
    let paths = ProjectPaths::new(root);
    let config = sample_config();
    initialize(&paths, &config).expect("project initializes");
    (paths, config)
}
