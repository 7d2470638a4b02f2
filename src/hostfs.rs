//! # Host file-list collaborator (A4)
//!
//! Walks a host directory tree and produces the ordered file-list [`crate::spartados::builder`]
//! consumes. Per directory level, subdirectories are listed before files, and both groups are
//! visited in a stable (sorted) traversal order; each subdirectory's own children are appended
//! after its siblings are declared. Byte sources are lazy host-file references: nothing is read
//! or staged here, only walked.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::spartados::builder::{ByteSource, FileListEntry};

fn join_atari_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// Walk `host_root`, producing a file-list rooted at `atari_prefix` (use `""` to build
/// directly under the image root, or an existing directory's Atari path when grafting a
/// host tree under it, as the `add` command does).
pub fn walk_host_dir(host_root: &Path, atari_prefix: &str) -> Result<Vec<FileListEntry>> {
    let mut out = Vec::new();
    walk_dir_into(host_root, atari_prefix, &mut out)?;
    Ok(out)
}

fn walk_dir_into(host_dir: &Path, atari_prefix: &str, out: &mut Vec<FileListEntry>) -> Result<()> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(host_dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries {
        if entry.path().is_dir() {
            dirs.push(entry);
        } else {
            files.push(entry);
        }
    }

    let mut subdirs: Vec<(PathBuf, String)> = Vec::with_capacity(dirs.len());
    for entry in &dirs {
        let name = entry.file_name().to_string_lossy().into_owned();
        let atari_path = join_atari_path(atari_prefix, &name);
        out.push(FileListEntry::dir(&atari_path));
        subdirs.push((entry.path(), atari_path));
    }
    for entry in &files {
        let name = entry.file_name().to_string_lossy().into_owned();
        let atari_path = join_atari_path(atari_prefix, &name);
        out.push(FileListEntry::file(&atari_path, ByteSource::HostFile(entry.path())));
    }
    for (host_path, atari_path) in subdirs {
        walk_dir_into(&host_path, &atari_path, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_directories_before_files_and_recurses() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("b.txt"), b"b").unwrap();
        fs::write(tmp.path().join("a.txt"), b"a").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub").join("inner.txt"), b"x").unwrap();

        let list = walk_host_dir(tmp.path(), "").unwrap();
        let paths: Vec<&str> = list.iter().map(|e| e.atari_path.as_str()).collect();
        assert_eq!(paths, vec!["sub", "a.txt", "b.txt", "sub/inner.txt"]);
    }

    #[test]
    fn roots_under_a_given_atari_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("f.txt"), b"x").unwrap();
        let list = walk_host_dir(tmp.path(), "EXISTING").unwrap();
        assert_eq!(list[0].atari_path, "EXISTING/f.txt");
    }
}
