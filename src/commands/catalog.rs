//! `catalog` - list a directory's contents.

use std::path::Path;

use clap::ArgMatches;

use crate::commands::{load_image, require_spartados, CommandError, STDRESULT};
use crate::error::Error;
use crate::spartados::dir::list_entries;
use crate::spartados::path::{resolve, Resolved};

pub fn catalog(cmd: &ArgMatches) -> STDRESULT {
    let img_path = cmd
        .get_one::<String>("IMAGE")
        .ok_or(CommandError::MissingArgument("IMAGE"))?;
    let default_path = String::new();
    let atari_path = cmd.get_one::<String>("ATARI_PATH").unwrap_or(&default_path);

    let image = load_image(Path::new(img_path))?;
    require_spartados(&image)?;
    let root_map = image.root_map()?;

    let first_map = match resolve(&image, root_map, atari_path)? {
        Resolved::Dir { first_map } => first_map,
        Resolved::File { .. } => {
            return Err(Box::new(Error::NotFound(format!(
                "{} is a file, not a directory",
                atari_path
            ))))
        }
        Resolved::NotFound => return Err(Box::new(Error::NotFound(atari_path.clone()))),
    };

    for entry in list_entries(&image, first_map)? {
        let kind = if entry.is_dir { 'D' } else { 'F' };
        println!("{}  {:>6}  {}", kind, entry.size, entry.name);
    }
    Ok(())
}
