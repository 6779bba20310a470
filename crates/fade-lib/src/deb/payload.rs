use crate::config::ProjectConfig;
use crate::error::FadeError;
use crate::project::{CONFIG_FILE_NAME, ProjectPaths, WORK_DIR_NAME};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileContent {
    Data(Vec<u8>),
    Symlink(PathBuf),
}

/// A file destined for `data.tar.gz`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadFile {
    /// Path inside the package, relative to `/`
    pub archive_path: String,
    pub mode: u32,
    pub content: FileContent,
}

impl PayloadFile {
    pub fn data(archive_path: impl Into<String>, mode: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            archive_path: archive_path.into(),
            mode,
            content: FileContent::Data(data.into()),
        }
    }

    pub fn size(&self) -> u64 {
        match &self.content {
            FileContent::Data(data) => data.len() as u64,
            FileContent::Symlink(_) => 0,
        }
    }
}

#[derive(Clone, Debug)]
enum BlacklistRule {
    /// `logs/` excludes everything below `logs`
    Directory(String),
    Pattern(glob::Pattern),
    Exact(String),
}

/// Project-relative exclusion rules built from `ProjectConfig::blacklist`.
#[derive(Clone, Debug, Default)]
pub struct Blacklist {
    rules: Vec<BlacklistRule>,
}

impl Blacklist {
    pub fn new(entries: &[String]) -> Result<Self, FadeError> {
        let mut rules = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = entry.trim().trim_start_matches("./");
            let rule = if let Some(directory) = entry.strip_suffix('/') {
                BlacklistRule::Directory(directory.trim_end_matches('/').to_string())
            } else if entry.contains(['*', '?', '[']) {
                let pattern = glob::Pattern::new(entry).map_err(|e| {
                    FadeError::validation("blacklist", format!("'{entry}' is not a valid glob: {e}"))
                })?;
                BlacklistRule::Pattern(pattern)
            } else {
                BlacklistRule::Exact(entry.to_string())
            };
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    /// `relative` uses `/` separators and no leading `./`.
    pub fn is_excluded(&self, relative: &str) -> bool {
        self.rules.iter().any(|rule| match rule {
            BlacklistRule::Directory(directory) => {
                relative == directory
                    || relative
                        .strip_prefix(directory.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            BlacklistRule::Pattern(pattern) => pattern.matches(relative),
            BlacklistRule::Exact(path) => relative == path,
        })
    }
}

fn read_error(path: &Path, reason: impl ToString) -> FadeError {
    FadeError::PayloadRead {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn relative_str(path: &Path, base: &Path) -> Result<String, FadeError> {
    let relative = path
        .strip_prefix(base)
        .map_err(|e| read_error(path, e))?;
    relative
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| read_error(path, "path is not valid UTF-8"))
}

fn read_entry(path: &Path, archive_path: String) -> Result<PayloadFile, FadeError> {
    let metadata = std::fs::symlink_metadata(path).map_err(|e| read_error(path, e))?;
    let content = if metadata.file_type().is_symlink() {
        FileContent::Symlink(std::fs::read_link(path).map_err(|e| read_error(path, e))?)
    } else {
        FileContent::Data(std::fs::read(path).map_err(|e| read_error(path, e))?)
    };

    Ok(PayloadFile {
        archive_path,
        mode: metadata.permissions().mode() & 0o7777,
        content,
    })
}

/// Walks `base` and reads every regular file and symlink that `keep` accepts.
/// `keep` sees the path relative to `base`; directories it rejects are pruned.
fn walk(
    base: &Path,
    mut keep: impl FnMut(&str) -> bool,
    mut place: impl FnMut(&str) -> String,
) -> Result<Vec<PayloadFile>, FadeError> {
    let mut files = Vec::new();
    let mut walker = WalkDir::new(base)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(1)
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| base.to_path_buf());
            read_error(&path, e)
        })?;
        let relative = relative_str(entry.path(), base)?;

        if !keep(&relative) {
            tracing::trace!("Excluding {}", relative);
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        if entry.file_type().is_dir() {
            continue;
        }

        files.push(read_entry(entry.path(), place(&relative))?);
    }

    Ok(files)
}

/// Collects the files shipped in the package, excluding the generated launcher
/// and maintainer data.
///
/// Project files (everything under the root except the work directory) go to
/// `/usr/lib/<name>`; extra files staged in the work directory keep their
/// staged path. The blacklist applies to both trees, relative to their base.
/// Every file is read here, so a read failure aborts the build before
/// anything is written. Archive paths are UTF-8, so a file name that is not
/// valid UTF-8 fails with [`FadeError::PayloadRead`].
pub fn collect_payload(
    paths: &ProjectPaths,
    config: &ProjectConfig,
) -> Result<Vec<PayloadFile>, FadeError> {
    let blacklist = Blacklist::new(&config.blacklist)?;
    let install_dir = config.install_dir();
    let install_dir = install_dir.trim_start_matches('/');

    let mut files = walk(
        paths.root(),
        |relative| relative != WORK_DIR_NAME && !blacklist.is_excluded(relative),
        |relative| format!("{install_dir}/{relative}"),
    )?;

    if paths.work_dir().is_dir() {
        let launcher = ProjectPaths::launcher_relative(&config.name);
        let launcher = launcher.to_string_lossy();
        let staged = walk(
            paths.work_dir(),
            |relative| {
                relative != CONFIG_FILE_NAME
                    && relative != launcher
                    && !is_staging_leftover(relative)
                    && !blacklist.is_excluded(relative)
            },
            str::to_string,
        )?;
        files.extend(staged);
    }

    tracing::debug!("Collected {} payload files", files.len());
    Ok(files)
}

/// Temporary files left behind by an interrupted atomic write.
fn is_staging_leftover(relative: &str) -> bool {
    let file_name = relative.rsplit('/').next().unwrap_or(relative);
    file_name.starts_with(".fade-") && file_name.ends_with(".tmp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::init_project;

    fn blacklist(entries: &[&str]) -> Blacklist {
        let entries: Vec<String> = entries.iter().map(|s| s.to_string()).collect();
        Blacklist::new(&entries).unwrap()
    }

    #[test]
    fn test_directory_entry_excludes_by_prefix() {
        let blacklist = blacklist(&["logs/"]);

        assert!(blacklist.is_excluded("logs"));
        assert!(blacklist.is_excluded("logs/app.log"));
        assert!(blacklist.is_excluded("logs/2024/app.log"));
        assert!(!blacklist.is_excluded("logs.txt"));
        assert!(!blacklist.is_excluded("logsearch/app.log"));
    }

    #[test]
    fn test_file_entry_excludes_exact_path() {
        let blacklist = blacklist(&["README.md"]);

        assert!(blacklist.is_excluded("README.md"));
        assert!(!blacklist.is_excluded("docs/README.md"));
        assert!(!blacklist.is_excluded("README.md.bak"));
    }

    #[test]
    fn test_glob_entry() {
        let blacklist = blacklist(&["*.tmp", "./build/"]);

        assert!(blacklist.is_excluded("cache.tmp"));
        assert!(blacklist.is_excluded("build/out.o"));
        assert!(!blacklist.is_excluded("cache.txt"));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let entries = vec!["[".to_string()];
        assert!(matches!(
            Blacklist::new(&entries),
            Err(FadeError::Validation { .. })
        ));
    }

    #[test]
    fn test_collect_payload_applies_blacklist_and_skips_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, mut config) = init_project(dir.path());
        std::fs::create_dir_all(dir.path().join("logs")).unwrap();
        std::fs::write(dir.path().join("logs/app.log"), "log").unwrap();
        std::fs::write(dir.path().join("README.md"), "readme").unwrap();
        std::fs::write(dir.path().join("main.sh"), "echo hi").unwrap();
        std::fs::create_dir_all(paths.work_dir().join("etc/demo")).unwrap();
        std::fs::write(paths.work_dir().join("etc/demo/demo.conf"), "key=value").unwrap();
        config.blacklist = vec!["logs/".to_string(), "README.md".to_string()];

        let files = collect_payload(&paths, &config).unwrap();

        let archive_paths: Vec<_> = files.iter().map(|f| f.archive_path.as_str()).collect();
        assert_eq!(archive_paths, vec!["usr/lib/demo/main.sh", "etc/demo/demo.conf"]);
        assert_eq!(files[0].content, FileContent::Data(b"echo hi".to_vec()));
    }

    #[test]
    fn test_blacklist_applies_to_staged_tree() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, mut config) = init_project(dir.path());
        std::fs::create_dir_all(paths.work_dir().join("logs")).unwrap();
        std::fs::write(paths.work_dir().join("logs/app.log"), "log").unwrap();
        std::fs::write(paths.work_dir().join("README.md"), "readme").unwrap();
        std::fs::create_dir_all(paths.work_dir().join("etc/demo")).unwrap();
        std::fs::write(paths.work_dir().join("etc/demo/demo.conf"), "key=value").unwrap();
        config.blacklist = vec!["logs/".to_string(), "README.md".to_string()];

        let files = collect_payload(&paths, &config).unwrap();

        let archive_paths: Vec<_> = files.iter().map(|f| f.archive_path.as_str()).collect();
        assert_eq!(archive_paths, vec!["etc/demo/demo.conf"]);
    }

    #[test]
    fn test_collect_payload_keeps_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, config) = init_project(dir.path());
        std::os::unix::fs::symlink("main.sh", dir.path().join("start")).unwrap();

        let files = collect_payload(&paths, &config).unwrap();

        assert_eq!(
            files,
            vec![PayloadFile {
                archive_path: "usr/lib/demo/start".to_string(),
                mode: files[0].mode,
                content: FileContent::Symlink(PathBuf::from("main.sh")),
            }]
        );
    }
}
