use super::payload::{FileContent, PayloadFile};
use crate::config::ProjectConfig;
use crate::error::FadeError;
use debian_packaging::control::{ControlFile, ControlParagraph};
use digest::Digest;
use itertools::Itertools;
use md5::Md5;

/// Renders the `control` member of `control.tar.gz`.
pub fn render_control(config: &ProjectConfig, installed_size_kib: u64) -> Result<String, FadeError> {
    let depends = config
        .depends
        .iter()
        .map(|dependency| dependency.trim())
        .filter(|dependency| !dependency.is_empty())
        .join(", ");

    let fields = [
        ("Package", config.name.clone()),
        ("Version", config.version.clone()),
        ("Architecture", config.architecture.clone()),
        ("Maintainer", config.maintainer()),
        ("Installed-Size", installed_size_kib.to_string()),
        ("Depends", depends),
        ("Priority", config.priority.clone()),
        ("Homepage", config.url.clone()),
        ("Description", format_description(&config.description)),
    ];

    let mut paragraph = ControlParagraph::default();
    for (name, value) in fields {
        paragraph.set_field_from_string(name.into(), value.into());
    }
    let mut control_file = ControlFile::default();
    control_file.add_paragraph(paragraph);

    let mut buffer = Vec::new();
    control_file.write(&mut buffer).map_err(FadeError::Io)?;
    let rendered = String::from_utf8(buffer)
        .map_err(|e| eyre::eyre!("control file is not valid UTF-8: {e}"))?;

    Ok(format!("{}\n", rendered.trim_end_matches('\n')))
}

/// The first line becomes the synopsis; following lines are continuation
/// lines, with blank ones written as ` .`.
fn format_description(description: &str) -> String {
    let mut lines = description.trim().lines();
    let mut formatted = lines.next().unwrap_or_default().trim().to_string();
    for line in lines {
        formatted.push('\n');
        if line.trim().is_empty() {
            formatted.push_str(" .");
        } else {
            formatted.push(' ');
            formatted.push_str(line.trim_end());
        }
    }
    formatted
}

/// `md5sums` lists the digest of every regular file in the data archive.
pub fn render_md5sums(files: &[PayloadFile]) -> String {
    files
        .iter()
        .filter_map(|file| match &file.content {
            FileContent::Data(data) => Some(format!(
                "{}  {}\n",
                hex::encode(Md5::digest(data)),
                file.archive_path
            )),
            FileContent::Symlink(_) => None,
        })
        .collect()
}

pub fn installed_size_kib(files: &[PayloadFile]) -> u64 {
    files.iter().map(PayloadFile::size).sum::<u64>().div_ceil(1024)
}
