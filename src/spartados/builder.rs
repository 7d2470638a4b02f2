//! # Filesystem builder (C5)
//!
//! Packs an ordered list of host files and directories into a fresh SpartaDOS image:
//! allocates sectors lowest-free-first, builds map chains, populates directory streams,
//! and maintains the free-sector bitmap. Also hosts the two raw container-level
//! transformations that accompany a SpartaDOS image on disk but do not themselves touch
//! filesystem structure: grow-only resize and sector-size conversion.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use bit_vec::BitVec;
use log::debug;

use crate::atr::AtrImage;
use crate::error::{Error, Result};
use crate::spartados::{BOOT_MAGIC, DIR_ENTRY_LEN, FLAG_IN_USE, FLAG_SUBDIR, ROOT_MAP_OFFSET};

use a2kit_macro::DiskStruct;

use super::dir::RawEntry;

/// Where the bytes for one file-list entry come from.
#[derive(Clone)]
pub enum ByteSource {
    /// Read lazily from a host path; nothing is staged through a temp file.
    HostFile(PathBuf),
    /// Already-resident bytes, e.g. produced by the text transcoder.
    Buffer(Vec<u8>),
}

impl ByteSource {
    fn read(&self) -> Result<Vec<u8>> {
        match self {
            ByteSource::HostFile(p) => fs::read(p).map_err(Error::from),
            ByteSource::Buffer(b) => Ok(b.clone()),
        }
    }
}

#[derive(Clone)]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry of the builder's input: a host file or directory destined for a specific
/// path inside the new image. Order is significant: a directory's entry must appear
/// before any of its children's entries.
#[derive(Clone)]
pub struct FileListEntry {
    pub atari_path: String,
    pub kind: EntryKind,
    pub byte_source: Option<ByteSource>,
}

impl FileListEntry {
    pub fn dir(atari_path: &str) -> Self {
        Self {
            atari_path: atari_path.to_string(),
            kind: EntryKind::Dir,
            byte_source: None,
        }
    }
    pub fn file(atari_path: &str, src: ByteSource) -> Self {
        Self {
            atari_path: atari_path.to_string(),
            kind: EntryKind::File,
            byte_source: Some(src),
        }
    }
}

fn split_parent(path: &str) -> (String, String) {
    match path.rfind('/') {
        Some(i) => (path[..i].to_string(), path[i + 1..].to_string()),
        None => (String::new(), path.to_string()),
    }
}

/// Uppercase-fold, replace unsafe characters, drop spaces, split into an 8.3 stem and
/// extension on the last `.`, left-justify and space-pad. The safe character set beyond
/// `A-Z0-9` is `_` and `-`; everything else becomes `_`.
fn encode_name(input: &str) -> ([u8; 8], [u8; 3]) {
    let folded: String = input
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| c.to_ascii_uppercase())
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let (stem_src, ext_src) = match folded.rfind('.') {
        Some(i) => (&folded[..i], &folded[i + 1..]),
        None => (&folded[..], ""),
    };
    let mut stem = [b' '; 8];
    let mut ext = [b' '; 3];
    for (i, b) in stem_src.bytes().take(8).enumerate() {
        stem[i] = b;
    }
    for (i, b) in ext_src.bytes().take(3).enumerate() {
        ext[i] = b;
    }
    (stem, ext)
}

struct ChainPlan {
    map_secs: Vec<usize>,
    data_secs: Vec<usize>,
}

/// Sector allocator plus in-progress image buffer; owns every allocation made during one
/// `build` call and releases it naturally when the call returns (success or error).
struct BuildState {
    image: AtrImage,
    free: BitVec,
}

impl BuildState {
    fn new(sector_size: u16, sector_count: usize) -> Result<Self> {
        let bytes_len = if sector_count > 3 && sector_size == 256 {
            sector_count * 256 - 3 * 128
        } else {
            sector_count * sector_size as usize
        };
        let image = AtrImage::from_sectors(sector_size, sector_count, vec![0u8; bytes_len])?;
        // Sector 0 is the null sentinel, never allocated (alloc_one starts at index 1),
        // but its bitmap bit is always set per the on-disk convention.
        let free = BitVec::from_elem(sector_count + 1, true);
        Ok(Self { image, free })
    }

    fn reserve(&mut self, idx: usize) {
        self.free.set(idx, false);
    }

    fn alloc_one(&mut self) -> Result<usize> {
        for i in 1..=self.image.sector_count {
            if self.free.get(i) == Some(true) {
                self.free.set(i, false);
                return Ok(i);
            }
        }
        let available = self.free.iter().skip(1).filter(|b| *b).count();
        Err(Error::OutOfSpace {
            needed: 1,
            available,
        })
    }

    fn alloc_n(&mut self, n: usize) -> Result<Vec<usize>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.alloc_one()?);
        }
        Ok(out)
    }

    /// Allocate (but do not yet populate) the map and data sectors needed to hold `size`
    /// bytes, and write the map-sector pointer headers. The bitmap is updated before any
    /// pointer is written, per the allocation invariant in SPEC_FULL.md sec. 4.5.
    fn alloc_chain(&mut self, size: usize) -> Result<ChainPlan> {
        let sector_size = self.image.sector_size as usize;
        let data_sectors_count = if size == 0 {
            0
        } else {
            (size + sector_size - 1) / sector_size
        };
        let map_capacity = (sector_size - 4) / 2;
        let map_sectors_count = if data_sectors_count == 0 {
            1
        } else {
            (data_sectors_count + map_capacity - 1) / map_capacity
        };

        let map_secs = self.alloc_n(map_sectors_count)?;
        let data_secs = self.alloc_n(data_sectors_count)?;

        for (mi, &map_sec) in map_secs.iter().enumerate() {
            let next = if mi + 1 < map_secs.len() {
                map_secs[mi + 1] as u16
            } else {
                0
            };
            let prev = if mi > 0 { map_secs[mi - 1] as u16 } else { 0 };
            let lo = mi * map_capacity;
            let hi = ((mi + 1) * map_capacity).min(data_secs.len());
            let chunk = if lo < hi { &data_secs[lo..hi] } else { &[] };
            let sec = self.image.sector_mut(map_sec)?;
            sec[0..2].copy_from_slice(&next.to_le_bytes());
            sec[2..4].copy_from_slice(&prev.to_le_bytes());
            for (j, &d) in chunk.iter().enumerate() {
                let off = 4 + j * 2;
                sec[off..off + 2].copy_from_slice(&(d as u16).to_le_bytes());
            }
        }

        Ok(ChainPlan { map_secs, data_secs })
    }

    fn write_chain_data(&mut self, chain: &ChainPlan, bytes: &[u8]) -> Result<()> {
        let sector_size = self.image.sector_size as usize;
        let mut pos = 0;
        for &d in &chain.data_secs {
            let sec = self.image.sector_mut(d)?;
            let n = (bytes.len() - pos).min(sector_size);
            sec[..n].copy_from_slice(&bytes[pos..pos + n]);
            pos += n;
        }
        Ok(())
    }
}

/// Builds a fresh SpartaDOS image from an ordered host file-list.
pub struct Builder {
    sector_size: u16,
    sector_count: usize,
    boot_address: u16,
}

impl Builder {
    pub fn new(sector_size: u16, sector_count: usize, boot_address: u16) -> Self {
        Self {
            sector_size,
            sector_count,
            boot_address,
        }
    }

    pub fn build(&self, file_list: &[FileListEntry]) -> Result<AtrImage> {
        if self.sector_size != 128 && self.sector_size != 256 {
            return Err(Error::ImageFormat(format!(
                "unsupported sector size {}",
                self.sector_size
            )));
        }
        if self.sector_count == 0 || self.sector_count > 65535 {
            return Err(Error::ImageFormat(format!(
                "sector count {} out of range",
                self.sector_count
            )));
        }

        let mut st = BuildState::new(self.sector_size, self.sector_count)?;
        st.reserve(1);
        st.reserve(2);
        st.reserve(3);

        let bitmap_bits = self.sector_count + 1;
        let bitmap_bytes = (bitmap_bits + 7) / 8;
        let bitmap_sectors = (bitmap_bytes + self.sector_size as usize - 1) / self.sector_size as usize;
        let bitmap_secs = st.alloc_n(bitmap_sectors)?;

        // Group file-list entries by the parent directory path they live under.
        // Entries with an empty atari_path are treated as an optional explicit root
        // marker and contribute no child of their own.
        let mut children: HashMap<String, Vec<&FileListEntry>> = HashMap::new();
        for entry in file_list {
            if entry.atari_path.is_empty() {
                continue;
            }
            let (parent, _name) = split_parent(&entry.atari_path);
            children.entry(parent).or_default().push(entry);
        }

        let root_children = children.get("").cloned().unwrap_or_default();
        let (root_first_map, _root_size) = build_dir(&mut st, &root_children, &children)?;

        debug!(
            "built SpartaDOS image: {} sectors at {} bytes, root map sector {}",
            self.sector_count, self.sector_size, root_first_map
        );

        // Boot sectors 1-3.
        {
            let boot = st.image.sector_mut(1)?;
            boot[7] = BOOT_MAGIC;
            boot[ROOT_MAP_OFFSET..ROOT_MAP_OFFSET + 2].copy_from_slice(&root_first_map.to_le_bytes());
            boot[0x0E..0x10].copy_from_slice(&self.boot_address.to_le_bytes());
        }

        // Pack the bitmap: bit i (LSB of byte i/8) is set when sector i is free.
        let mut bitmap_bytes_buf = vec![0u8; bitmap_sectors * self.sector_size as usize];
        for i in 0..bitmap_bits {
            if st.free.get(i) == Some(true) {
                bitmap_bytes_buf[i / 8] |= 1 << (i % 8);
            }
        }
        let mut pos = 0;
        for &sec in &bitmap_secs {
            let sector = st.image.sector_mut(sec)?;
            let n = sector.len();
            sector.copy_from_slice(&bitmap_bytes_buf[pos..pos + n]);
            pos += n;
        }

        Ok(st.image)
    }
}

/// Recursively build one directory's content (and, transitively, its subdirectories'
/// content), returning `(first_map, content_len)` for use in the parent's own entry.
fn build_dir(
    st: &mut BuildState,
    own_children: &[&FileListEntry],
    tree: &HashMap<String, Vec<&FileListEntry>>,
) -> Result<(u16, u32)> {
    let mut seen_names: Vec<([u8; 8], [u8; 3])> = Vec::new();
    let mut built: Vec<(String, bool, u16, u32)> = Vec::new(); // (name, is_dir, first_map, size)

    for entry in own_children {
        let (_parent, name) = split_parent(&entry.atari_path);
        let encoded = encode_name(&name);
        if seen_names.contains(&encoded) {
            return Err(Error::DuplicateName(name));
        }
        seen_names.push(encoded);

        match entry.kind {
            EntryKind::Dir => {
                let kids = tree.get(&entry.atari_path).cloned().unwrap_or_default();
                let (first_map, size) = build_dir(st, &kids, tree)?;
                built.push((name, true, first_map, size));
            }
            EntryKind::File => {
                let src = entry
                    .byte_source
                    .as_ref()
                    .expect("file entry must carry a byte source");
                let bytes = src.read()?;
                let chain = st.alloc_chain(bytes.len())?;
                st.write_chain_data(&chain, &bytes)?;
                built.push((name, false, chain.map_secs[0] as u16, bytes.len() as u32));
            }
        }
    }

    let content_len = (built.len() + 1) * DIR_ENTRY_LEN;
    let chain = st.alloc_chain(content_len)?;
    let first_map = chain.map_secs[0] as u16;

    let mut content = Vec::with_capacity(content_len);
    let mut header = RawEntry::new();
    header.flags = FLAG_IN_USE;
    header.first_map = first_map.to_le_bytes();
    header.size = [
        (content_len & 0xff) as u8,
        ((content_len >> 8) & 0xff) as u8,
        ((content_len >> 16) & 0xff) as u8,
    ];
    content.extend_from_slice(&header.to_bytes());

    for (name, is_dir, child_map, child_size) in &built {
        let (stem, ext) = encode_name(name);
        let mut e = RawEntry::new();
        e.flags = FLAG_IN_USE | if *is_dir { FLAG_SUBDIR } else { 0 };
        e.first_map = child_map.to_le_bytes();
        e.size = [
            (*child_size & 0xff) as u8,
            ((*child_size >> 8) & 0xff) as u8,
            ((*child_size >> 16) & 0xff) as u8,
        ];
        e.name = stem;
        e.ext = ext;
        content.extend_from_slice(&e.to_bytes());
    }

    st.write_chain_data(&chain, &content)?;

    Ok((first_map, content_len as u32))
}

/// Grow-only resize: copies every existing sector verbatim into a larger image and
/// zero-pads the new tail. Shrinking is rejected. Does not touch directory structure or
/// the bitmap; the newly added tail sectors are not yet reflected as free space there
/// (see DESIGN.md).
pub fn resize_grow(image: &AtrImage, new_sector_count: usize) -> Result<AtrImage> {
    if new_sector_count < image.sector_count {
        return Err(Error::ImageFormat(
            "cannot shrink an image (would lose data)".into(),
        ));
    }
    if new_sector_count > 65535 {
        return Err(Error::ImageFormat("maximum sector count is 65535".into()));
    }
    let sector_size = image.sector_size;
    let bytes_len = if new_sector_count > 3 && sector_size == 256 {
        new_sector_count * 256 - 3 * 128
    } else {
        new_sector_count * sector_size as usize
    };
    let mut data = vec![0u8; bytes_len];
    let mut pos = 0;
    for i in 1..=image.sector_count {
        let src = image.sector(i)?;
        data[pos..pos + src.len()].copy_from_slice(src);
        pos += src.len();
    }
    AtrImage::from_sectors(sector_size, new_sector_count, data)
}

/// Raw sector-size conversion (128<->256): recomputes the byte-accurate sector count for
/// the new size and recopies each old sector's bytes into the correspondingly indexed new
/// sector, truncating or zero-padding. This is a structural container transcoding only;
/// it does not rebuild map chains (their capacity depends on sector size), so it is only
/// meaningful for an image with no populated filesystem, or as the raw primitive behind a
/// full extract/rebuild for a populated one (see SPEC_FULL.md sec. 4.5).
pub fn convert_sector_size(image: &AtrImage, new_sector_size: u16) -> Result<AtrImage> {
    if new_sector_size != 128 && new_sector_size != 256 {
        return Err(Error::ImageFormat(format!(
            "unsupported sector size {}",
            new_sector_size
        )));
    }
    if new_sector_size == image.sector_size {
        return Ok(AtrImage::from_sectors(
            image.sector_size,
            image.sector_count,
            image.bytes().to_vec(),
        )?);
    }

    let old_total_bytes = image.bytes().len();
    let new_sector_count = (old_total_bytes + new_sector_size as usize - 1) / new_sector_size as usize;
    if new_sector_count > 65535 {
        return Err(Error::ImageFormat(
            "resulting image would exceed maximum size".into(),
        ));
    }
    let new_bytes_len = if new_sector_count > 3 && new_sector_size == 256 {
        new_sector_count * 256 - 3 * 128
    } else {
        new_sector_count * new_sector_size as usize
    };
    let mut data = vec![0u8; new_bytes_len];

    let copy_count = image.sector_count.min(new_sector_count);
    let mut out_offset = 0usize;
    for i in 1..=copy_count {
        let src = image.sector(i)?;
        let new_len = if i <= 3 && new_sector_size == 256 {
            128
        } else {
            new_sector_size as usize
        };
        let n = src.len().min(new_len);
        data[out_offset..out_offset + n].copy_from_slice(&src[..n]);
        out_offset += new_len;
    }
    AtrImage::from_sectors(new_sector_size, new_sector_count, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gets_one_all_zero_map_sector() {
        let file_list = vec![FileListEntry::file("EMPTY", ByteSource::Buffer(vec![]))];
        let image = Builder::new(128, 40, 0).build(&file_list).unwrap();
        let root_map = image.root_map().unwrap();
        let entries = crate::spartados::dir::list_entries(&image, root_map).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].size, 0);
        let map_sec = image.sector(entries[0].first_map as usize).unwrap();
        assert_eq!(&map_sec[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn builds_nested_directory_and_resolves_via_c2_c3() {
        let file_list = vec![
            FileListEntry::dir("SUB"),
            FileListEntry::file("SUB/README", ByteSource::Buffer(b"x".repeat(100))),
        ];
        let image = Builder::new(256, 1440, 0).build(&file_list).unwrap();
        assert!(image.is_spartados().unwrap());
        let root_map = image.root_map().unwrap();
        let root_entries = crate::spartados::dir::list_entries(&image, root_map).unwrap();
        assert_eq!(root_entries.len(), 1);
        assert!(root_entries[0].is_dir);
        let sub_entries = crate::spartados::dir::list_entries(&image, root_entries[0].first_map).unwrap();
        assert_eq!(sub_entries.len(), 1);
        assert_eq!(sub_entries[0].size, 100);
        let bytes = crate::spartados::map::read_chain(
            &image,
            sub_entries[0].first_map,
            sub_entries[0].size as usize,
            true,
        )
        .unwrap();
        assert_eq!(bytes, b"x".repeat(100));
    }

    #[test]
    fn rejects_duplicate_encoded_sibling_names() {
        let file_list = vec![
            FileListEntry::file("readme.txt", ByteSource::Buffer(b"a".to_vec())),
            FileListEntry::file("README.TXT", ByteSource::Buffer(b"b".to_vec())),
        ];
        let result = Builder::new(128, 40, 0).build(&file_list);
        assert!(matches!(result, Err(Error::DuplicateName(_))));
    }

    #[test]
    fn out_of_space_is_reported() {
        let file_list = vec![FileListEntry::file(
            "BIG",
            ByteSource::Buffer(vec![0u8; 100_000]),
        )];
        let result = Builder::new(128, 10, 0).build(&file_list);
        assert!(matches!(result, Err(Error::OutOfSpace { .. })));
    }

    #[test]
    fn bitmap_marks_exactly_the_allocated_sectors() {
        let file_list = vec![FileListEntry::file("A", ByteSource::Buffer(b"hi".to_vec()))];
        let image = Builder::new(128, 40, 0).build(&file_list).unwrap();
        let root_map = image.root_map().unwrap();

        // With 40 sectors the bitmap needs ceil(41/8)=6 bytes, one 128-byte sector at
        // index 4. Read it as a flat bit array indexed by sector number.
        let bitmap_sector = image.sector(4).unwrap();
        let bit = |sector: usize| (bitmap_sector[sector / 8] >> (sector % 8)) & 1;

        assert_eq!(bit(0), 1, "sector 0 is the null sentinel, its bit is always set");
        assert_eq!(bit(1), 0, "boot sector 1 must be marked allocated");
        assert_eq!(bit(2), 0, "boot sector 2 must be marked allocated");
        assert_eq!(bit(3), 0, "boot sector 3 must be marked allocated");
        assert_eq!(bit(4), 0, "the bitmap sector itself must be marked allocated");
        assert_eq!(bit(root_map as usize), 0, "root directory map sector must be marked allocated");

        // A sector that was never allocated (well past everything this tiny build
        // could have used) must remain free.
        assert_eq!(bit(39), 1, "untouched tail sector must remain free");
    }

    #[test]
    fn resize_grow_preserves_existing_sectors_and_pads_tail() {
        let file_list = vec![FileListEntry::file("A", ByteSource::Buffer(b"hi".to_vec()))];
        let image = Builder::new(128, 40, 0).build(&file_list).unwrap();
        let grown = resize_grow(&image, 80).unwrap();
        assert_eq!(grown.sector_count, 80);
        assert_eq!(grown.sector(1).unwrap(), image.sector(1).unwrap());
        assert_eq!(grown.sector(40).unwrap(), image.sector(40).unwrap());
        assert_eq!(grown.sector(80).unwrap(), &[0u8; 128][..]);
    }

    #[test]
    fn resize_grow_rejects_shrink() {
        let file_list = vec![FileListEntry::file("A", ByteSource::Buffer(b"hi".to_vec()))];
        let image = Builder::new(128, 40, 0).build(&file_list).unwrap();
        assert!(resize_grow(&image, 10).is_err());
    }

    #[test]
    fn sector_size_conversion_round_trips_content() {
        let file_list = vec![FileListEntry::file("A", ByteSource::Buffer(b"hi".to_vec()))];
        let image = Builder::new(128, 40, 0).build(&file_list).unwrap();
        let converted = convert_sector_size(&image, 256).unwrap();
        assert_eq!(converted.sector_size, 256);
        let back = convert_sector_size(&converted, 128).unwrap();
        assert_eq!(back.sector(1).unwrap(), image.sector(1).unwrap());
    }
}
