//! # Command line interface
//!
//! Dispatches each subcommand to its handler in `commands`.

use spartafs::commands;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let main_cmd = cli::build_cli();
    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("extract") {
        return commands::extract::extract(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("build") {
        return commands::build::build(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("add") {
        return commands::add::add(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("resize") {
        return commands::resize::resize(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("sectorsize") {
        return commands::sectorsize::sectorsize(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("catalog") {
        return commands::catalog::catalog(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("stat") {
        return commands::stat::stat(cmd);
    }

    log::error!("No subcommand was found, try `spartafs --help`");
    Err("no subcommand given".into())
}
