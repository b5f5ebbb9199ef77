/// Minimal, portable reader for the resources embedded in PE executables.
///
/// Only what the metadata extractor needs is supported: locating the
/// `.rsrc` section, walking the three-level resource directory
/// (type → name → language), reading `FileDescription` from the
/// `VS_VERSIONINFO` block tree, and re-assembling the first icon group into
/// a standalone `.ico` image.
///
/// Every offset read from the file is bounds-checked; malformed images
/// produce [`PeError`] or `None`, never a panic. The section is read with a
/// bounded length and the file handle is released before returning.
use crate::model::ExeIcon;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use thiserror::Error;

/// Largest `.rsrc` section we are willing to load.
///
/// Resource sections of real games are usually well under a megabyte; the
/// cap protects against corrupt headers claiming gigabytes.
pub const MAX_RESOURCE_SECTION_BYTES: u64 = 16 * 1024 * 1024;

/// Upper bound on entries in a single resource directory.
const MAX_DIRECTORY_ENTRIES: usize = 4_096;

/// Upper bound on section headers (the PE loader itself refuses more).
const MAX_SECTIONS: usize = 96;

const RT_ICON: u32 = 3;
const RT_GROUP_ICON: u32 = 14;
const RT_VERSION: u32 = 16;

const PE32_MAGIC: u16 = 0x10b;
const PE32_PLUS_MAGIC: u16 = 0x20b;
const RESOURCE_DIRECTORY_INDEX: usize = 2;
const SECTION_HEADER_LEN: usize = 40;

/// High bit of a directory entry's offset: the entry points at a subdirectory.
const SUBDIRECTORY_FLAG: u32 = 0x8000_0000;
/// High bit of a directory entry's name: the entry is named, not numbered.
const NAMED_ENTRY_FLAG: u32 = 0x8000_0000;

const VERSION_INFO_KEY: &str = "VS_VERSION_INFO";
const STRING_FILE_INFO_KEY: &str = "StringFileInfo";
const FILE_DESCRIPTION_KEY: &str = "FileDescription";

#[derive(Debug, Error)]
pub enum PeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a PE image")]
    NotPe,

    #[error("unsupported optional header magic {0:#x}")]
    UnsupportedMagic(u16),

    #[error("image has no resource section")]
    NoResources,

    #[error("header data is truncated")]
    Truncated,

    #[error("resource section of {0} bytes exceeds the read limit")]
    TooLarge(u64),
}

/// The raw `.rsrc` section of an executable.
#[derive(Debug, Clone)]
pub struct ResourceSection {
    data: Vec<u8>,
    /// RVA at which `data` is mapped.
    virtual_address: u32,
    /// Offset of the root resource directory inside `data`.
    directory_offset: usize,
}

/// Open `path` and load its resource section.
pub fn read_resources(path: &Path) -> Result<ResourceSection, PeError> {
    let mut file = File::open(path)?;
    ResourceSection::read_from(&mut file)
}

enum Node {
    Directory(usize),
    Data(usize),
}

struct DirectoryEntry {
    /// `None` for named entries.
    id: Option<u32>,
    node: Node,
}

impl ResourceSection {
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, PeError> {
        let mut dos = [0u8; 64];
        read_header(reader, &mut dos)?;
        if &dos[..2] != b"MZ" {
            return Err(PeError::NotPe);
        }
        let nt_offset = read_u32(&dos, 0x3c).ok_or(PeError::Truncated)?;

        reader.seek(SeekFrom::Start(u64::from(nt_offset)))?;
        let mut nt = [0u8; 24];
        read_header(reader, &mut nt)?;
        if &nt[..4] != b"PE\0\0" {
            return Err(PeError::NotPe);
        }
        let section_count = read_u16(&nt, 6).ok_or(PeError::Truncated)? as usize;
        let optional_len = read_u16(&nt, 20).ok_or(PeError::Truncated)? as usize;
        if section_count > MAX_SECTIONS {
            return Err(PeError::Truncated);
        }

        let mut optional = vec![0u8; optional_len];
        read_header(reader, &mut optional)?;
        let magic = read_u16(&optional, 0).ok_or(PeError::Truncated)?;
        let (count_offset, directories_offset) = match magic {
            PE32_MAGIC => (92, 96),
            PE32_PLUS_MAGIC => (108, 112),
            other => return Err(PeError::UnsupportedMagic(other)),
        };
        let directory_count = read_u32(&optional, count_offset).ok_or(PeError::Truncated)?;
        if (directory_count as usize) <= RESOURCE_DIRECTORY_INDEX {
            return Err(PeError::NoResources);
        }
        let entry = directories_offset + RESOURCE_DIRECTORY_INDEX * 8;
        let resource_rva = read_u32(&optional, entry).ok_or(PeError::Truncated)?;
        let resource_size = read_u32(&optional, entry + 4).ok_or(PeError::Truncated)?;
        if resource_rva == 0 || resource_size == 0 {
            return Err(PeError::NoResources);
        }

        // The section table follows the optional header directly.
        let mut table = vec![0u8; section_count * SECTION_HEADER_LEN];
        read_header(reader, &mut table)?;

        for header in table.chunks_exact(SECTION_HEADER_LEN) {
            let virtual_size = read_u32(header, 8).ok_or(PeError::Truncated)?;
            let virtual_address = read_u32(header, 12).ok_or(PeError::Truncated)?;
            let raw_size = read_u32(header, 16).ok_or(PeError::Truncated)?;
            let raw_offset = read_u32(header, 20).ok_or(PeError::Truncated)?;

            let span = virtual_size.max(raw_size);
            if resource_rva < virtual_address || resource_rva - virtual_address >= span {
                continue;
            }

            let length = u64::from(raw_size);
            if length > MAX_RESOURCE_SECTION_BYTES {
                return Err(PeError::TooLarge(length));
            }
            reader.seek(SeekFrom::Start(u64::from(raw_offset)))?;
            let mut data = Vec::with_capacity(raw_size as usize);
            reader.by_ref().take(length).read_to_end(&mut data)?;

            return Ok(Self {
                data,
                virtual_address,
                directory_offset: (resource_rva - virtual_address) as usize,
            });
        }

        Err(PeError::NoResources)
    }

    /// The `FileDescription` string of the first version resource, trimmed.
    /// Blank descriptions count as absent.
    pub fn file_description(&self) -> Option<String> {
        let data = self.find(RT_VERSION, None)?;
        version_string(data, FILE_DESCRIPTION_KEY)
    }

    /// The first icon group, re-assembled into a standalone `.ico` file.
    ///
    /// Windows shows the first `RT_GROUP_ICON` as the executable's icon, so
    /// that is the one taken. Group entries whose image is missing, or that
    /// repeat an image id already taken, are skipped. A group with no
    /// resolvable image, or whose `.ico` would exceed
    /// [`MAX_RESOURCE_SECTION_BYTES`], yields `None`.
    pub fn icon(&self) -> Option<ExeIcon> {
        let group = self.find(RT_GROUP_ICON, None)?;
        if read_u16(group, 2)? != 1 {
            return None;
        }
        let count = read_u16(group, 4)? as usize;

        let mut seen = HashSet::new();
        let mut images: Vec<(&[u8], &[u8])> = Vec::new();
        for i in 0..count {
            let at = 6 + i * 14;
            let entry = group.get(at..at + 14)?;
            let id = u32::from(read_u16(entry, 12)?);
            if !seen.insert(id) {
                continue;
            }
            if let Some(image) = self.find(RT_ICON, Some(id)) {
                images.push((entry, image));
            }
        }
        if images.is_empty() {
            return None;
        }

        let header_len = 6 + 16 * images.len();
        let total = images
            .iter()
            .try_fold(header_len, |acc, (_, img)| acc.checked_add(img.len()))?;
        if total as u64 > MAX_RESOURCE_SECTION_BYTES {
            tracing::debug!("Icon group of {total} bytes exceeds limit; skipped");
            return None;
        }

        let mut ico = Vec::with_capacity(total);
        ico.extend_from_slice(&0u16.to_le_bytes());
        ico.extend_from_slice(&1u16.to_le_bytes());
        ico.extend_from_slice(&(images.len() as u16).to_le_bytes());

        let mut image_offset = u32::try_from(header_len).ok()?;
        for (entry, image) in &images {
            let image_len = u32::try_from(image.len()).ok()?;
            // width, height, colour count, reserved, planes, bit count
            ico.extend_from_slice(&entry[..8]);
            ico.extend_from_slice(&image_len.to_le_bytes());
            ico.extend_from_slice(&image_offset.to_le_bytes());
            image_offset = image_offset.checked_add(image_len)?;
        }
        for (_, image) in &images {
            ico.extend_from_slice(image);
        }

        let (width, height) = images
            .iter()
            .map(|(entry, _)| (icon_dimension(entry[0]), icon_dimension(entry[1])))
            .max_by_key(|(w, h)| w * h)?;

        Some(ExeIcon { width, height, ico })
    }

    /// Resource bytes for `type_id`, picking `name_id` (or the first entry)
    /// at the name level and the first language.
    fn find(&self, type_id: u32, name_id: Option<u32>) -> Option<&[u8]> {
        let by_type = self
            .entries(0)?
            .into_iter()
            .find(|e| e.id == Some(type_id))?;
        let Node::Directory(names_dir) = by_type.node else {
            return None;
        };

        let names = self.entries(names_dir)?;
        let by_name = match name_id {
            Some(id) => names.into_iter().find(|e| e.id == Some(id))?,
            None => names.into_iter().next()?,
        };
        let Node::Directory(languages_dir) = by_name.node else {
            return None;
        };

        let language = self.entries(languages_dir)?.into_iter().next()?;
        match language.node {
            Node::Data(at) => self.data_entry(at),
            Node::Directory(_) => None,
        }
    }

    fn tree(&self) -> &[u8] {
        self.data.get(self.directory_offset..).unwrap_or_default()
    }

    fn entries(&self, directory: usize) -> Option<Vec<DirectoryEntry>> {
        let tree = self.tree();
        let named = read_u16(tree, directory + 12)? as usize;
        let numbered = read_u16(tree, directory + 14)? as usize;
        let count = named + numbered;
        if count > MAX_DIRECTORY_ENTRIES {
            return None;
        }

        let mut entries = Vec::with_capacity(count);
        for i in 0..count {
            let at = directory + 16 + i * 8;
            let name = read_u32(tree, at)?;
            let target = read_u32(tree, at + 4)?;
            let id = (name & NAMED_ENTRY_FLAG == 0).then_some(name & 0xffff);
            let node = if target & SUBDIRECTORY_FLAG != 0 {
                Node::Directory((target & !SUBDIRECTORY_FLAG) as usize)
            } else {
                Node::Data(target as usize)
            };
            entries.push(DirectoryEntry { id, node });
        }
        Some(entries)
    }

    fn data_entry(&self, at: usize) -> Option<&[u8]> {
        let tree = self.tree();
        let rva = read_u32(tree, at)?;
        let size = read_u32(tree, at + 4)? as usize;
        let start = rva.checked_sub(self.virtual_address)? as usize;
        self.data.get(start..start.checked_add(size)?)
    }
}

/// One node of a `VS_VERSIONINFO` tree.
struct VersionBlock<'a> {
    key: String,
    value: &'a [u8],
    children_start: usize,
    end: usize,
}

impl<'a> VersionBlock<'a> {
    /// Parse the block at `at`, never reading past `limit`.
    fn parse(data: &'a [u8], at: usize, limit: usize) -> Option<Self> {
        let limit = limit.min(data.len());
        let length = read_u16(data, at)? as usize;
        let value_length = read_u16(data, at + 2)? as usize;
        let is_text = read_u16(data, at + 4)? == 1;
        if length < 6 {
            return None;
        }
        let end = at.checked_add(length)?.min(limit);

        let (key, key_end) = read_utf16z(data, at + 6, end);
        let value_start = align4(key_end).min(end);
        let value_bytes = if is_text { value_length * 2 } else { value_length };
        let value_end = value_start.saturating_add(value_bytes).min(end);

        Some(Self {
            key,
            value: data.get(value_start..value_end)?,
            children_start: align4(value_end),
            end,
        })
    }

    fn children(&self, data: &'a [u8]) -> Vec<VersionBlock<'a>> {
        let mut children = Vec::new();
        let mut offset = self.children_start;
        while offset + 6 <= self.end {
            let Some(length) = read_u16(data, offset) else {
                break;
            };
            if length == 0 {
                break;
            }
            let Some(child) = Self::parse(data, offset, self.end) else {
                break;
            };
            children.push(child);
            offset = align4(offset + length as usize);
        }
        children
    }

    fn text(&self) -> String {
        let units: Vec<u16> = self
            .value
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|&unit| unit != 0)
            .collect();
        String::from_utf16_lossy(&units)
    }
}

/// Look up `key` in every string table of a `VS_VERSIONINFO` blob and
/// return the first non-blank value.
fn version_string(data: &[u8], key: &str) -> Option<String> {
    let root = VersionBlock::parse(data, 0, data.len())?;
    if root.key != VERSION_INFO_KEY {
        return None;
    }

    root.children(data)
        .into_iter()
        .filter(|block| block.key == STRING_FILE_INFO_KEY)
        .flat_map(|info| info.children(data))
        .flat_map(|table| table.children(data))
        .filter(|entry| entry.key == key)
        .map(|entry| entry.text().trim().to_owned())
        .find(|text| !text.is_empty())
}

/// `read_exact` that reports a short file as [`PeError::Truncated`].
fn read_header<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), PeError> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => PeError::Truncated,
        _ => PeError::Io(err),
    })
}

/// NUL-terminated UTF-16 string starting at `at`. Returns the text and the
/// offset just past the terminator (or `limit` when there is none).
fn read_utf16z(data: &[u8], at: usize, limit: usize) -> (String, usize) {
    let mut units = Vec::new();
    let mut offset = at;
    while offset + 2 <= limit {
        let Some(unit) = read_u16(data, offset) else {
            break;
        };
        offset += 2;
        if unit == 0 {
            return (String::from_utf16_lossy(&units), offset);
        }
        units.push(unit);
    }
    (String::from_utf16_lossy(&units), limit)
}

fn icon_dimension(raw: u8) -> u32 {
    if raw == 0 {
        256
    } else {
        u32::from(raw)
    }
}

#[inline]
fn align4(offset: usize) -> usize {
    (offset + 3) & !3
}

#[inline]
fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

#[inline]
fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
