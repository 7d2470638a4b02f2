//! `extract` - copy a file, or a whole directory subtree, from an image to the host.

use std::path::{Path, PathBuf};

use clap::ArgMatches;

use crate::commands::{load_image, require_spartados, CommandError, STDRESULT};
use crate::error::{Error, Result};
use crate::spartados::dir::list_entries;
use crate::spartados::map::read_chain;
use crate::spartados::path::{resolve, Resolved};
use crate::transcode::atascii_to_utf8_buffer;

fn write_host_file(host_path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = host_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(host_path, bytes)?;
    Ok(())
}

fn extract_file(
    image: &crate::atr::AtrImage,
    first_map: u16,
    size: u32,
    host_path: &Path,
    to_utf8: bool,
    seven_bit: bool,
) -> Result<()> {
    let bytes = read_chain(image, first_map, size as usize, false)?;
    let bytes = if to_utf8 {
        atascii_to_utf8_buffer(&bytes, seven_bit)
    } else {
        bytes
    };
    write_host_file(host_path, &bytes)
}

/// Recursively extract every live entry under `first_map` to `host_dir`, which is
/// created if it does not already exist.
fn extract_dir(
    image: &crate::atr::AtrImage,
    first_map: u16,
    host_dir: &Path,
    to_utf8: bool,
    seven_bit: bool,
) -> Result<()> {
    std::fs::create_dir_all(host_dir)?;
    for entry in list_entries(image, first_map)? {
        let child_host = host_dir.join(&entry.name);
        if entry.is_dir {
            extract_dir(image, entry.first_map, &child_host, to_utf8, seven_bit)?;
        } else {
            extract_file(image, entry.first_map, entry.size, &child_host, to_utf8, seven_bit)?;
        }
    }
    Ok(())
}

pub fn extract(cmd: &ArgMatches) -> STDRESULT {
    let img_path = cmd
        .get_one::<String>("IMAGE")
        .ok_or(CommandError::MissingArgument("IMAGE"))?;
    let atari_path = cmd
        .get_one::<String>("ATARI_PATH")
        .ok_or(CommandError::MissingArgument("ATARI_PATH"))?;
    let to_utf8 = cmd.get_flag("to-utf8");
    let seven_bit = cmd.get_flag("7bit");

    let image = load_image(Path::new(img_path))?;
    require_spartados(&image)?;
    let root_map = image.root_map()?;

    let default_name = atari_path.rsplit('/').next().unwrap_or(atari_path);
    let out: PathBuf = cmd
        .get_one::<String>("out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default_name));

    match resolve(&image, root_map, atari_path)? {
        Resolved::NotFound => return Err(Box::new(Error::NotFound(atari_path.clone()))),
        Resolved::File { first_map, size } => {
            extract_file(&image, first_map, size, &out, to_utf8, seven_bit)?;
        }
        Resolved::Dir { first_map } => {
            extract_dir(&image, first_map, &out, to_utf8, seven_bit)?;
        }
    }
    Ok(())
}
