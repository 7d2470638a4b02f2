//! `build` - pack a host directory into a fresh SpartaDOS image.

use std::path::Path;

use clap::ArgMatches;

use crate::commands::{save_image_with_backup, CommandError, STDRESULT};
use crate::error::Result;
use crate::hostfs::walk_host_dir;
use crate::spartados::builder::{ByteSource, Builder, EntryKind, FileListEntry};
use crate::transcode::utf8_to_atascii_buffer;

fn parse_u16(s: &str, what: &'static str) -> std::result::Result<u16, CommandError> {
    s.parse::<u16>()
        .map_err(|_| CommandError::InvalidNumber(format!("{}: {}", what, s)))
}

fn parse_usize(s: &str, what: &'static str) -> std::result::Result<usize, CommandError> {
    s.parse::<usize>()
        .map_err(|_| CommandError::InvalidNumber(format!("{}: {}", what, s)))
}

/// Apply the UTF-8-to-ATASCII transcoder to every file entry's content, leaving
/// directory entries untouched. Used by both `build` and `add` when `--to-atascii`
/// is given.
pub fn transcode_file_list(list: Vec<FileListEntry>) -> Result<Vec<FileListEntry>> {
    let mut out = Vec::with_capacity(list.len());
    for entry in list {
        match entry.kind {
            EntryKind::Dir => out.push(entry),
            EntryKind::File => {
                let bytes = match &entry.byte_source {
                    Some(ByteSource::HostFile(p)) => std::fs::read(p)?,
                    Some(ByteSource::Buffer(b)) => b.clone(),
                    None => Vec::new(),
                };
                let converted = utf8_to_atascii_buffer(&bytes)?;
                out.push(FileListEntry::file(&entry.atari_path, ByteSource::Buffer(converted)));
            }
        }
    }
    Ok(out)
}

pub fn build(cmd: &ArgMatches) -> STDRESULT {
    let img_path = cmd
        .get_one::<String>("IMAGE")
        .ok_or(CommandError::MissingArgument("IMAGE"))?;
    let sector_size = parse_u16(
        cmd.get_one::<String>("sector-size")
            .ok_or(CommandError::MissingArgument("sector-size"))?,
        "sector-size",
    )?;
    let sector_count = parse_usize(
        cmd.get_one::<String>("sectors")
            .ok_or(CommandError::MissingArgument("sectors"))?,
        "sectors",
    )?;
    let from = cmd
        .get_one::<String>("from")
        .ok_or(CommandError::MissingArgument("from"))?;
    let boot_address = parse_u16(
        cmd.get_one::<String>("boot-address")
            .ok_or(CommandError::MissingArgument("boot-address"))?,
        "boot-address",
    )?;

    let mut file_list = walk_host_dir(Path::new(from), "")?;
    if cmd.get_flag("to-atascii") {
        file_list = transcode_file_list(file_list)?;
    }

    let image = Builder::new(sector_size, sector_count, boot_address).build(&file_list)?;
    save_image_with_backup(&image, Path::new(img_path))?;
    Ok(())
}
