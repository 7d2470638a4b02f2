use clap::{arg, crate_version, ArgAction, Command, ValueHint};

const IN_HELP: &str = "Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error";

pub fn build_cli() -> Command {
    let long_help = "spartafs manipulates Atari 8-bit ATR disk images holding a SpartaDOS
filesystem: it extracts files, builds fresh images from a host directory, grows images,
converts sector size, and can transcode text content between ATASCII and UTF-8 on the way
in or out.

Examples:
---------
Extract a file, converting to UTF-8:   `spartafs extract disk.atr AUTORUN.SYS -o run.bin`
Build a fresh image from a directory:  `spartafs build disk.atr --sector-size 256 --sectors 1440 --from ./files`
Add files to an existing image:        `spartafs add disk.atr --from ./more-files`
List a directory:                      `spartafs catalog disk.atr SUB`";

    Command::new("spartafs")
        .about("Reads and writes SpartaDOS filesystem images for Atari 8-bit computers.")
        .after_long_help(long_help)
        .version(crate_version!())
        .subcommand_required(true)
        .subcommand(
            Command::new("extract")
                .arg(arg!(<IMAGE> "path to the ATR image").value_hint(ValueHint::FilePath))
                .arg(arg!(<ATARI_PATH> "path inside the image to extract"))
                .arg(
                    arg!(-o --out <PATH> "host path to write to (defaults to the Atari name)")
                        .value_hint(ValueHint::AnyPath)
                        .required(false),
                )
                .arg(arg!(--"to-utf8" "transcode file contents from ATASCII to UTF-8").action(ArgAction::SetTrue))
                .arg(arg!(--"7bit" "when transcoding, mask to 7 bits instead of round-tripping high-bit bytes").action(ArgAction::SetTrue))
                .about("extract a file or directory subtree from an image to the host"),
        )
        .subcommand(
            Command::new("build")
                .arg(arg!(<IMAGE> "path to the ATR image to create").value_hint(ValueHint::FilePath))
                .arg(
                    arg!(--"sector-size" <SIZE> "sector size in bytes")
                        .value_parser(["128", "256"])
                        .default_value("128"),
                )
                .arg(arg!(--sectors <N> "total sector count"))
                .arg(
                    arg!(--from <PATH> "host directory to pack")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(arg!(--"to-atascii" "transcode file contents from UTF-8 to ATASCII").action(ArgAction::SetTrue))
                .arg(arg!(--"boot-address" <ADDR> "value stored in the boot record's load-address field").required(false).default_value("0"))
                .about("build a fresh SpartaDOS image from a host directory"),
        )
        .subcommand(
            Command::new("add")
                .arg(arg!(<IMAGE> "path to the existing ATR image").value_hint(ValueHint::FilePath))
                .arg(
                    arg!(--from <PATH> "host directory whose contents are added")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    arg!(--under <ATARI_PATH> "existing directory inside the image to add under")
                        .required(false)
                        .default_value(""),
                )
                .arg(arg!(--"to-atascii" "transcode file contents from UTF-8 to ATASCII").action(ArgAction::SetTrue))
                .about("load an image, add files from a host directory, and rebuild it"),
        )
        .subcommand(
            Command::new("resize")
                .arg(arg!(<IMAGE> "path to the ATR image").value_hint(ValueHint::FilePath))
                .arg(arg!(--sectors <N> "new, larger sector count"))
                .about("grow an image's sector count in place"),
        )
        .subcommand(
            Command::new("sectorsize")
                .arg(arg!(<IMAGE> "path to the ATR image").value_hint(ValueHint::FilePath))
                .arg(
                    arg!(--to <SIZE> "new sector size")
                        .value_parser(["128", "256"]),
                )
                .about("rebuild an image at a different sector size"),
        )
        .subcommand(
            Command::new("catalog")
                .arg(arg!(<IMAGE> "path to the ATR image").value_hint(ValueHint::FilePath))
                .arg(arg!([ATARI_PATH] "directory inside the image to list (defaults to root)"))
                .visible_alias("cat")
                .visible_alias("ls")
                .about("list a directory's contents")
                .after_help(IN_HELP),
        )
        .subcommand(
            Command::new("stat")
                .arg(arg!(<IMAGE> "path to the ATR image").value_hint(ValueHint::FilePath))
                .about("print image and filesystem identification")
                .after_help(IN_HELP),
        )
}
