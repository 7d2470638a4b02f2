//! `sectorsize` - rebuild an image at a different sector size.
//!
//! When the image carries a SpartaDOS filesystem, map-chain capacity depends on sector
//! size (`spartados::builder::alloc_chain`'s `map_capacity`), so a byte-for-byte sector
//! recopy cannot work: the filesystem is fully extracted and rebuilt fresh at the new
//! size, keeping the same sector count. An image with no recognized filesystem falls
//! back to the raw container-level conversion in `spartados::builder::convert_sector_size`.

use std::path::Path;

use clap::ArgMatches;

use crate::commands::{boot_address, extract_tree, load_image, save_image_with_backup, CommandError, STDRESULT};
use crate::spartados::builder::{convert_sector_size, Builder};

pub fn sectorsize(cmd: &ArgMatches) -> STDRESULT {
    let img_path = cmd
        .get_one::<String>("IMAGE")
        .ok_or(CommandError::MissingArgument("IMAGE"))?;
    let to_str = cmd
        .get_one::<String>("to")
        .ok_or(CommandError::MissingArgument("to"))?;
    let new_size: u16 = to_str
        .parse()
        .map_err(|_| CommandError::InvalidNumber(to_str.clone()))?;

    let image = load_image(Path::new(img_path))?;

    let converted = if image.is_spartados()? {
        let root_map = image.root_map()?;
        let boot_addr = boot_address(&image)?;
        let mut file_list = Vec::new();
        extract_tree(&image, root_map, "", &mut file_list)?;
        Builder::new(new_size, image.sector_count, boot_addr).build(&file_list)?
    } else {
        convert_sector_size(&image, new_size)?
    };

    save_image_with_backup(&converted, Path::new(img_path))?;
    Ok(())
}
