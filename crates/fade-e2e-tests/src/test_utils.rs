use eyre::{Result, eyre};
use fade_lib::cli::{ResolvedCommand, resolve_command, run_init, try_parse_command};
use fade_lib::error::FadeError;
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

/// Parses and resolves a `fade` invocation the same way the binary does.
pub fn resolve<I, T>(args: I) -> Result<ResolvedCommand, FadeError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let command = try_parse_command(args).map_err(|e| FadeError::CliArgumentValidation {
        details: e.to_string(),
    })?;
    resolve_command(command)
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("fade_lib=debug,fade_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}

/// Initializes the demo project used across the tests, plus `extra` flags.
pub fn init_demo_project(root: &Path, extra: &[&str]) -> Result<(), FadeError> {
    let root = root.to_string_lossy();
    let mut args = vec![
        "fade",
        "init",
        "--path",
        root.as_ref(),
        "--name",
        "demo",
        "--version",
        "1.0",
        "--desc",
        "Demo project",
        "--run",
        "echo hi",
        "--maintainer-name",
        "Jane Doe",
        "--maintainer-email",
        "jane@example.com",
        "--type",
        "normal",
        "--depend",
        "bash",
    ];
    args.extend_from_slice(extra);

    match resolve(args)? {
        ResolvedCommand::Init(params) => run_init(params),
        _ => unreachable!("Resolved command type mismatch"),
    }
}

/// Creates a temporary project holding `files` and initializes it as the demo project.
pub fn setup_demo_project(files: &[(&str, &str)], extra: &[&str]) -> Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    for (relative, contents) in files {
        let path = temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
    }

    init_demo_project(temp_dir.path(), extra)
        .map_err(|e| eyre!("Failed to initialize demo project: {e}"))?;
    tracing::debug!(
        "Demo project with {} files ready in {}",
        files.len(),
        temp_dir.path().display()
    );
    Ok(temp_dir)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarEntry {
    pub mode: u32,
    pub is_dir: bool,
    pub data: Vec<u8>,
}

/// A `.deb` taken apart again.
#[derive(Debug, Default)]
pub struct DebContents {
    /// `ar` member names in archive order
    pub members: Vec<String>,
    pub debian_binary: Vec<u8>,
    pub control: BTreeMap<String, TarEntry>,
    pub data: BTreeMap<String, TarEntry>,
}

impl DebContents {
    pub fn control_text(&self, name: &str) -> Result<String> {
        let entry = self
            .control
            .get(name)
            .ok_or_else(|| eyre!("{name} missing from control.tar.gz"))?;
        Ok(String::from_utf8(entry.data.clone())?)
    }

    pub fn data_file(&self, path: &str) -> Result<&TarEntry> {
        self.data
            .get(path)
            .ok_or_else(|| eyre!("{path} missing from data.tar.gz"))
    }
}

fn read_tar_gz(bytes: &[u8]) -> Result<BTreeMap<String, TarEntry>> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut entries = BTreeMap::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.to_string_lossy().into_owned();
        let path = path
            .trim_start_matches("./")
            .trim_end_matches('/')
            .to_string();
        let header = entry.header();
        let mode = header.mode()?;
        let is_dir = header.entry_type().is_dir();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        entries.insert(path, TarEntry { mode, is_dir, data });
    }
    Ok(entries)
}

pub fn read_deb(bytes: &[u8]) -> Result<DebContents> {
    let mut archive = ar::Archive::new(bytes);
    let mut contents = DebContents::default();
    while let Some(member) = archive.next_entry() {
        let mut member = member?;
        let name = String::from_utf8(member.header().identifier().to_vec())?;
        let mut data = Vec::new();
        member.read_to_end(&mut data)?;
        match name.as_str() {
            "debian-binary" => contents.debian_binary = data,
            "control.tar.gz" => contents.control = read_tar_gz(&data)?,
            "data.tar.gz" => contents.data = read_tar_gz(&data)?,
            other => return Err(eyre!("unexpected member {other}")),
        }
        contents.members.push(name);
    }
    Ok(contents)
}
