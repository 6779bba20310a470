use std::path::{Path, PathBuf};

pub const WORK_DIR_NAME: &str = ".fadework";
pub const CONFIG_FILE_NAME: &str = "fade.json";

/// On-disk layout of a project, computed once from its root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
    work_dir: PathBuf,
    config_file: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let work_dir = root.join(WORK_DIR_NAME);
        let config_file = work_dir.join(CONFIG_FILE_NAME);
        Self {
            root,
            work_dir,
            config_file,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Staged Debian filesystem tree; also holds `fade.json`.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn launcher_relative(name: &str) -> PathBuf {
        Path::new("usr").join("bin").join(name)
    }

    pub fn launcher(&self, name: &str) -> PathBuf {
        self.work_dir.join(Self::launcher_relative(name))
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = ProjectPaths::new("/srv/demo");

        assert_eq!(paths.work_dir(), Path::new("/srv/demo/.fadework"));
        assert_eq!(
            paths.config_file(),
            Path::new("/srv/demo/.fadework/fade.json")
        );
        assert_eq!(
            paths.launcher("demo"),
            PathBuf::from("/srv/demo/.fadework/usr/bin/demo")
        );
    }
}
