mod init;
mod paths;
mod store;

pub use init::initialize;
pub use paths::{CONFIG_FILE_NAME, ProjectPaths, WORK_DIR_NAME};
pub use store::{load, save, validate};
