//! # Path resolver (C4)
//!
//! Case-insensitive lookup of an Atari-style `/`-separated path within the directory
//! tree. Unlike the original tool, which smuggled a match out of the recursive walk
//! through a file-scope `find_result` structure, resolution here returns an explicit sum
//! type and carries no ambient state.

use crate::atr::AtrImage;
use crate::error::Result;
use crate::spartados::dir::list_entries;

/// Outcome of resolving a path.
pub enum Resolved {
    File { first_map: u16, size: u32 },
    Dir { first_map: u16 },
    NotFound,
}

/// Resolve `path` (no leading `/`) starting from `dir_first_map`.
pub fn resolve(image: &AtrImage, dir_first_map: u16, path: &str) -> Result<Resolved> {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return Ok(Resolved::Dir {
            first_map: dir_first_map,
        });
    }
    let (component, rest) = match path.split_once('/') {
        Some((c, r)) => (c, Some(r)),
        None => (path, None),
    };
    let wanted = component.to_ascii_uppercase();
    let entries = list_entries(image, dir_first_map)?;
    for entry in entries {
        if entry.name.to_ascii_uppercase() != wanted {
            continue;
        }
        return match rest {
            Some(rest) if !rest.is_empty() => {
                if entry.is_dir {
                    resolve(image, entry.first_map, rest)
                } else {
                    Ok(Resolved::NotFound)
                }
            }
            _ => {
                if entry.is_dir {
                    Ok(Resolved::Dir {
                        first_map: entry.first_map,
                    })
                } else {
                    Ok(Resolved::File {
                        first_map: entry.first_map,
                        size: entry.size,
                    })
                }
            }
        };
    }
    Ok(Resolved::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spartados::builder::{ByteSource, Builder, FileListEntry};

    #[test]
    fn resolves_nested_file_case_insensitively() {
        let file_list = vec![
            FileListEntry::dir("SUB"),
            FileListEntry::file("SUB/README", ByteSource::Buffer(b"x".repeat(100))),
        ];
        let image = Builder::new(256, 1440, 0).build(&file_list).unwrap();
        let root_map = image.root_map().unwrap();
        match resolve(&image, root_map, "sub/readme").unwrap() {
            Resolved::File { size, .. } => assert_eq!(size, 100),
            _ => panic!("expected a file"),
        }
    }

    #[test]
    fn reports_not_found_for_missing_component() {
        let file_list = vec![FileListEntry::dir("SUB")];
        let image = Builder::new(256, 1440, 0).build(&file_list).unwrap();
        let root_map = image.root_map().unwrap();
        assert!(matches!(
            resolve(&image, root_map, "NOPE").unwrap(),
            Resolved::NotFound
        ));
    }
}
