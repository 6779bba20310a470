//! Binary container format of a `.deb`.
//!
//! A package is an `ar` archive holding, in this order:
//! - `debian-binary`: format version `2.0\n`
//! - `control.tar.gz`: control metadata and maintainer scripts
//! - `data.tar.gz`: the files to install

use super::payload::{FileContent, PayloadFile};
use crate::error::FadeError;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::{BTreeMap, BTreeSet};
use tar::{EntryType, Header};

pub const DEBIAN_BINARY: &[u8] = b"2.0\n";
pub const CONTROL_MEMBER: &str = "control.tar.gz";
pub const DATA_MEMBER: &str = "data.tar.gz";

const DIRECTORY_MODE: u32 = 0o755;

fn base_header(entry_type: EntryType, mode: u32, mtime: u64) -> Result<Header, FadeError> {
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mode(mode);
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("root")?;
    header.set_groupname("root")?;
    header.set_mtime(mtime);
    header.set_size(0);
    Ok(header)
}

/// Builds a gzip-compressed tar stream owned by root.
///
/// Every parent directory gets its own entry, and entries are sorted by path
/// so each directory precedes its contents.
pub fn build_tar_gz(files: &[PayloadFile], mtime: u64) -> Result<Vec<u8>, FadeError> {
    let mut directories = BTreeSet::new();
    let mut entries = BTreeMap::new();
    for file in files {
        let path = file.archive_path.trim_start_matches("./").trim_start_matches('/');
        let mut parent = path;
        while let Some((dir, _)) = parent.rsplit_once('/') {
            directories.insert(dir);
            parent = dir;
        }
        if entries.insert(path, file).is_some() {
            return Err(FadeError::validation(
                "payload",
                format!("{path} is packaged more than once"),
            ));
        }
    }

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut all_paths: BTreeSet<&str> = directories.iter().copied().collect();
    all_paths.extend(entries.keys().copied());

    for path in all_paths {
        match entries.get(path) {
            None => {
                let mut header = base_header(EntryType::Directory, DIRECTORY_MODE, mtime)?;
                builder.append_data(&mut header, path, std::io::empty())?;
            }
            Some(file) => match &file.content {
                FileContent::Data(data) => {
                    let mut header = base_header(EntryType::Regular, file.mode, mtime)?;
                    header.set_size(data.len() as u64);
                    builder.append_data(&mut header, path, data.as_slice())?;
                }
                FileContent::Symlink(target) => {
                    let mut header = base_header(EntryType::Symlink, 0o777, mtime)?;
                    builder.append_link(&mut header, path, target)?;
                }
            },
        }
    }

    let encoder = builder.into_inner()?;
    Ok(encoder.finish()?)
}

/// Joins the three members into the final `ar` container.
pub fn build_deb(control_tar_gz: &[u8], data_tar_gz: &[u8], mtime: u64) -> Result<Vec<u8>, FadeError> {
    let mut archive = ar::Builder::new(Vec::new());

    // debian-binary must be first
    for (name, data) in [
        ("debian-binary", DEBIAN_BINARY),
        (CONTROL_MEMBER, control_tar_gz),
        (DATA_MEMBER, data_tar_gz),
    ] {
        let mut header = ar::Header::new(name.as_bytes().to_vec(), data.len() as u64);
        header.set_mode(0o100644);
        header.set_mtime(mtime);
        header.set_uid(0);
        header.set_gid(0);
        archive.append(&header, data)?;
    }

    Ok(archive.into_inner()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn tar_listing(tar_gz: &[u8]) -> Vec<(String, EntryType, u32)> {
        let mut archive = tar::Archive::new(GzDecoder::new(tar_gz));
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let entry = entry.unwrap();
                let header = entry.header();
                (
                    entry.path().unwrap().to_string_lossy().into_owned(),
                    header.entry_type(),
                    header.mode().unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_tar_contains_parent_directories_first() {
        let files = vec![
            PayloadFile::data("usr/lib/demo/main.sh", 0o644, "echo hi"),
            PayloadFile::data("usr/bin/demo", 0o755, "#!/bin/sh"),
        ];

        let listing = tar_listing(&build_tar_gz(&files, 0).unwrap());

        let paths: Vec<_> = listing
            .iter()
            .map(|(path, _, _)| path.trim_end_matches('/'))
            .collect();
        assert_eq!(
            paths,
            vec!["usr", "usr/bin", "usr/bin/demo", "usr/lib", "usr/lib/demo", "usr/lib/demo/main.sh"]
        );
        assert_eq!(listing[0].1, EntryType::Directory);
        assert_eq!(listing[2].1, EntryType::Regular);
        assert_eq!(listing[2].2, 0o755);
    }

    #[test]
    fn test_duplicate_paths_are_rejected() {
        let files = vec![
            PayloadFile::data("usr/bin/demo", 0o755, "a"),
            PayloadFile::data("./usr/bin/demo", 0o755, "b"),
        ];

        assert!(build_tar_gz(&files, 0).is_err());
    }

    #[test]
    fn test_deb_member_order() {
        let deb = build_deb(b"control", b"data", 0).unwrap();

        assert!(deb.starts_with(b"!<arch>\n"));
        let mut archive = ar::Archive::new(deb.as_slice());
        let mut members = Vec::new();
        while let Some(entry) = archive.next_entry() {
            let mut entry = entry.unwrap();
            let name = String::from_utf8(entry.header().identifier().to_vec()).unwrap();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            members.push((name, content));
        }

        assert_eq!(
            members,
            vec![
                ("debian-binary".to_string(), b"2.0\n".to_vec()),
                ("control.tar.gz".to_string(), b"control".to_vec()),
                ("data.tar.gz".to_string(), b"data".to_vec()),
            ]
        );
    }
}
