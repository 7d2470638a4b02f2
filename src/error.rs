//! # Error kinds
//!
//! A single closed set covering every failure mode the image container, the SpartaDOS
//! filesystem engine, and the text transcoder can report.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("bad image format: {0}")]
    ImageFormat(String),
    #[error("unsupported filesystem (boot[7] != 0x80)")]
    UnsupportedFilesystem,
    #[error("path not found: {0}")]
    NotFound(String),
    #[error("filesystem corruption: {0}")]
    Corruption(String),
    #[error("out of space: need {needed} sectors, have {available}")]
    OutOfSpace { needed: usize, available: usize },
    #[error("duplicate name in directory: {0}")]
    DuplicateName(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("conversion error: {0}")]
    ConversionError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
