//! # CLI subcommands
//!
//! Each module implements one subcommand, dispatched from `main.rs`. Handlers return the
//! crate's own `Error` for anything that reaches the filesystem engine, or `CommandError`
//! for argument-parsing problems that never get that far.

pub mod add;
pub mod build;
pub mod catalog;
pub mod extract;
pub mod resize;
pub mod sectorsize;
pub mod stat;

use std::path::Path;

use log::info;

use crate::atr::AtrImage;
use crate::error::{Error, Result};
use crate::spartados::builder::{ByteSource, FileListEntry};
use crate::spartados::{dir, map};

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
    #[error("not a valid number: {0}")]
    InvalidNumber(String),
}

/// Top-level result type for subcommand entry points: either the crate's own closed
/// `Error`, or a `CommandError` for argument problems that never reach the filesystem
/// engine.
pub type STDRESULT = std::result::Result<(), Box<dyn std::error::Error>>;

/// Load and parse an ATR image from `path`.
pub fn load_image(path: &Path) -> Result<AtrImage> {
    let bytes = std::fs::read(path)?;
    AtrImage::load(&bytes)
}

/// Write `image` to `path`, first renaming any existing file at `path` to `<path>.bak`.
///
/// Per the no-in-place-mutation policy: every modifying operation is a whole-image
/// rebuild, and the previous file is preserved rather than overwritten destructively.
pub fn save_image_with_backup(image: &AtrImage, path: &Path) -> Result<()> {
    if path.exists() {
        let mut backup = path.as_os_str().to_owned();
        backup.push(".bak");
        std::fs::rename(path, &backup)?;
        info!("backed up {} to {}", path.display(), Path::new(&backup).display());
    }
    std::fs::write(path, image.emit())?;
    Ok(())
}

/// Require a SpartaDOS filesystem, converting the boot-magic mismatch into the closed
/// error type rather than leaving it implicit.
pub fn require_spartados(image: &AtrImage) -> Result<()> {
    if !image.is_spartados()? {
        return Err(Error::UnsupportedFilesystem);
    }
    Ok(())
}

/// Read the boot record's load-address field (offsets 0x0E-0x0F), stored there by
/// [`crate::spartados::builder::Builder`].
pub fn boot_address(image: &AtrImage) -> Result<u16> {
    let boot = image.boot_sector()?;
    Ok(u16::from_le_bytes([boot[0x0E], boot[0x0F]]))
}

/// Recursively extract every live file and directory under `first_map` into a file-list
/// of in-memory entries, for the `add` and `sectorsize` rebuild paths. Mirrors
/// [`crate::hostfs::walk_host_dir`]'s directories-then-files-in-order shape, but reads
/// from the image instead of the host filesystem.
pub fn extract_tree(
    image: &AtrImage,
    first_map: u16,
    atari_prefix: &str,
    out: &mut Vec<FileListEntry>,
) -> Result<()> {
    for entry in dir::list_entries(image, first_map)? {
        let atari_path = if atari_prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", atari_prefix, entry.name)
        };
        if entry.is_dir {
            out.push(FileListEntry::dir(&atari_path));
            extract_tree(image, entry.first_map, &atari_path, out)?;
        } else {
            let bytes = map::read_chain(image, entry.first_map, entry.size as usize, false)?;
            out.push(FileListEntry::file(&atari_path, ByteSource::Buffer(bytes)));
        }
    }
    Ok(())
}
