//! `add` - load an existing image, add files from a host directory under it, and
//! rebuild. Per SPEC_FULL.md's resolved Open Question on the original's incomplete
//! "modatr" tool: implemented as load -> extract-all -> append -> rebuild, never as an
//! in-place patch.

use std::path::Path;

use clap::ArgMatches;

use crate::commands::{
    boot_address, extract_tree, load_image, require_spartados, save_image_with_backup,
    CommandError, STDRESULT,
};
use crate::hostfs::walk_host_dir;
use crate::spartados::builder::Builder;
use crate::spartados::path::{resolve, Resolved};

use super::build::transcode_file_list;

pub fn add(cmd: &ArgMatches) -> STDRESULT {
    let img_path = cmd
        .get_one::<String>("IMAGE")
        .ok_or(CommandError::MissingArgument("IMAGE"))?;
    let from = cmd
        .get_one::<String>("from")
        .ok_or(CommandError::MissingArgument("from"))?;
    let default_under = String::new();
    let under = cmd.get_one::<String>("under").unwrap_or(&default_under);

    let image = load_image(Path::new(img_path))?;
    require_spartados(&image)?;
    let root_map = image.root_map()?;

    // Resolved only to confirm `--under` exists and names a directory before the
    // (possibly expensive) full-tree extract and rebuild below.
    match resolve(&image, root_map, under)? {
        Resolved::Dir { .. } => {}
        Resolved::File { .. } => {
            return Err(Box::new(crate::error::Error::NotFound(format!(
                "{} is a file, not a directory",
                under
            ))))
        }
        Resolved::NotFound => return Err(Box::new(crate::error::Error::NotFound(under.clone()))),
    }

    let mut file_list = Vec::new();
    extract_tree(&image, root_map, "", &mut file_list)?;

    let mut new_entries = walk_host_dir(Path::new(from), under)?;
    if cmd.get_flag("to-atascii") {
        new_entries = transcode_file_list(new_entries)?;
    }
    file_list.extend(new_entries);

    let boot_addr = boot_address(&image)?;
    let rebuilt = Builder::new(image.sector_size, image.sector_count, boot_addr).build(&file_list)?;
    save_image_with_backup(&rebuilt, Path::new(img_path))?;
    Ok(())
}
