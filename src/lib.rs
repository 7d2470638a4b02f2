//! # `spartafs`
//!
//! A library and CLI for manipulating Atari 8-bit ATR disk images holding a SpartaDOS
//! filesystem.
//!
//! ## Architecture
//!
//! * [`atr`] parses and emits the ATR container and presents its payload as indexable,
//!   fixed-size sectors (sectors 1-3 are always 128 bytes, the historical ATR quirk).
//! * [`spartados`] is the filesystem engine proper: `spartados::map` chases sector-map
//!   chains to reconstruct file content, `spartados::dir` walks directory streams,
//!   `spartados::path` resolves `/`-separated Atari paths, and `spartados::builder`
//!   packs a host file-list into a fresh image.
//! * [`transcode`] is a standalone ATASCII<->UTF-8 converter, applied only to file
//!   *contents*, never to filesystem metadata.
//! * [`hostfs`] walks a host directory into the ordered file-list the builder consumes.
//! * [`commands`] implements the CLI subcommands on top of the above.
//!
//! No operation mutates an image in place: every modifying command reads the whole
//! image, builds a complete replacement in memory, and only then writes it out
//! (preserving the previous file as `<name>.bak`).

pub mod atr;
pub mod commands;
pub mod error;
pub mod hostfs;
pub mod spartados;
pub mod transcode;

pub use error::{Error, Result};
