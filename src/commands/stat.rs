//! `stat` - print image and filesystem identification.

use std::path::Path;

use clap::ArgMatches;

use crate::commands::{load_image, CommandError, STDRESULT};

pub fn stat(cmd: &ArgMatches) -> STDRESULT {
    let img_path = cmd
        .get_one::<String>("IMAGE")
        .ok_or(CommandError::MissingArgument("IMAGE"))?;
    let image = load_image(Path::new(img_path))?;

    println!("sector size    : {}", image.sector_size);
    println!("sector count   : {}", image.sector_count);
    let boot = image.boot_sector()?;
    println!("boot sector hex: {}", hex::encode(&boot[0..16]));
    println!("boot magic     : {:#04x}", boot[7]);
    if image.is_spartados()? {
        println!("filesystem     : SpartaDOS");
        println!("root map sector: {}", image.root_map()?);
    } else {
        println!("filesystem     : unrecognized (boot[7] = {:#04x})", boot[7]);
    }
    Ok(())
}
