//! `resize` - grow an image's sector count in place (container-level only; does not
//! touch the filesystem's bitmap or directory structure, see `spartados::builder::resize_grow`).

use std::path::Path;

use clap::ArgMatches;

use crate::commands::{load_image, save_image_with_backup, CommandError, STDRESULT};
use crate::spartados::builder::resize_grow;

pub fn resize(cmd: &ArgMatches) -> STDRESULT {
    let img_path = cmd
        .get_one::<String>("IMAGE")
        .ok_or(CommandError::MissingArgument("IMAGE"))?;
    let sectors_str = cmd
        .get_one::<String>("sectors")
        .ok_or(CommandError::MissingArgument("sectors"))?;
    let new_count: usize = sectors_str
        .parse()
        .map_err(|_| CommandError::InvalidNumber(sectors_str.clone()))?;

    let image = load_image(Path::new(img_path))?;
    let grown = resize_grow(&image, new_count)?;
    save_image_with_backup(&grown, Path::new(img_path))?;
    Ok(())
}
