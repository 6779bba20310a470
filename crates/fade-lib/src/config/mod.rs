mod loader;
mod model;
mod validation;

pub use loader::import_partial;
pub use model::{
    DEFAULT_ARCHITECTURE, DEFAULT_PRIORITY, DEFAULT_URL, PartialProjectConfig, ProjectConfig,
    ProjectType,
};
pub use validation::{ensure_complete, validate_config};
