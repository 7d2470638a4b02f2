//! # Sector-map reader (C2)
//!
//! Reconstructs a file's content by chasing a chain of map sectors, each of which lists
//! the data sectors for one span of the file plus a pointer to the next map sector.

use crate::atr::AtrImage;
use crate::error::{Error, Result};
use log::{trace, warn};

/// Follow the map chain starting at `first_map`, accumulating up to `max_bytes` of data.
///
/// Traversal is bounded by `image.sector_count` map-sector visits: any cycle or
/// out-of-range pointer terminates the walk rather than looping or erroring. When
/// `strict` is false (the ordinary read path) a short result is only logged as a
/// warning; when `strict` is true (verification) a short result is reported as
/// [`Error::Corruption`].
pub fn read_chain(image: &AtrImage, first_map: u16, max_bytes: usize, strict: bool) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(max_bytes.min(1 << 20));
    let mut pos = 0usize;
    let mut visited = 0usize;
    let max_visited = image.sector_count;
    let mut map = first_map as usize;

    while map != 0 && pos < max_bytes && visited < max_visited {
        visited += 1;
        let sec = image.sector(map)?;
        let sec_len = sec.len();
        let mut s = 4;
        while s + 1 < sec_len && pos < max_bytes {
            let index = u16::from_le_bytes([sec[s], sec[s + 1]]) as usize;
            if index != 0 && index >= 2 && index <= image.sector_count {
                let data = image.sector(index)?;
                let rem = (max_bytes - pos).min(data.len());
                out.extend_from_slice(&data[..rem]);
                pos += rem;
            }
            s += 2;
        }
        let next_map = u16::from_le_bytes([sec[0], sec[1]]) as usize;
        if next_map == 0 || next_map < 2 || next_map > image.sector_count {
            break;
        }
        map = next_map;
        trace!("map chain: advancing to sector {}", map);
    }

    if pos < max_bytes {
        let msg = format!(
            "short read from map sector {}: got {} of {} bytes",
            first_map, pos, max_bytes
        );
        if strict {
            return Err(Error::Corruption(msg));
        }
        warn!("{}", msg);
    }

    Ok(out)
}
