//! Shared fixtures for the integration tests: minimal but well-formed PE32
//! images carrying a version resource and/or an icon group, and helpers to
//! lay them out on disk.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

const RT_ICON: u32 = 3;
const RT_GROUP_ICON: u32 = 14;
const RT_VERSION: u32 = 16;

const SECTION_RVA: u32 = 0x1000;
const SECTION_FILE_OFFSET: usize = 0x200;
const NT_OFFSET: usize = 0x40;
const OPTIONAL_HEADER_LEN: usize = 96 + 16 * 8;

/// Width and height of the fixture icon.
pub const ICON_SIZE: u8 = 32;

// ── Version resource ─────────────────────────────────────────────────────────

fn utf16z(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

fn pad4(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

fn block(key: &str, is_text: bool, value: &[u8], value_len: u16, children: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0u8; 6];
    out.extend(utf16z(key));
    pad4(&mut out);
    out.extend_from_slice(value);
    for child in children {
        pad4(&mut out);
        out.extend_from_slice(child);
    }
    let len = out.len() as u16;
    out[0..2].copy_from_slice(&len.to_le_bytes());
    out[2..4].copy_from_slice(&value_len.to_le_bytes());
    out[4..6].copy_from_slice(&u16::from(is_text).to_le_bytes());
    out
}

/// A `VS_VERSIONINFO` blob whose only string table holds `strings`.
pub fn version_info(strings: &[(&str, &str)]) -> Vec<u8> {
    let entries: Vec<Vec<u8>> = strings
        .iter()
        .map(|(key, value)| {
            let units = value.encode_utf16().count() as u16 + 1;
            block(key, true, &utf16z(value), units, &[])
        })
        .collect();
    let table = block("040904b0", true, &[], 0, &entries);
    let info = block("StringFileInfo", true, &[], 0, &[table]);
    let mut fixed = vec![0u8; 52];
    fixed[..4].copy_from_slice(&0xfeef_04bdu32.to_le_bytes());
    block("VS_VERSION_INFO", false, &fixed, 52, &[info])
}

// ── Icons ────────────────────────────────────────────────────────────────────

/// A `GRPICONDIR` with one entry pointing at `RT_ICON` `icon_id`.
pub fn icon_group(icon_id: u16, image_len: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&[ICON_SIZE, ICON_SIZE, 0, 0]);
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&32u16.to_le_bytes());
    out.extend_from_slice(&image_len.to_le_bytes());
    out.extend_from_slice(&icon_id.to_le_bytes());
    out
}

// ── Resource section ─────────────────────────────────────────────────────────

/// A resource type with its `(name id, payload)` entries.
pub type ResourceType = (u32, Vec<(u32, Vec<u8>)>);

fn write_u16(out: &mut [u8], at: usize, value: u16) {
    out[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn write_u32(out: &mut [u8], at: usize, value: u32) {
    out[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn write_directory(out: &mut [u8], at: usize, entries: &[(u32, u32)]) {
    write_u16(out, at + 14, entries.len() as u16);
    for (i, (id, target)) in entries.iter().enumerate() {
        write_u32(out, at + 16 + i * 8, *id);
        write_u32(out, at + 20 + i * 8, *target);
    }
}

/// Lay out a three-level resource tree (type → name → one language) with
/// the payloads after it. Offsets are relative to the section start.
pub fn build_rsrc(types: &[ResourceType]) -> Vec<u8> {
    const SUBDIRECTORY: u32 = 0x8000_0000;
    let dir_len = |entries: usize| 16 + 8 * entries;

    let mut offset = dir_len(types.len());
    let mut name_dirs = Vec::new();
    for (_, names) in types {
        name_dirs.push(offset);
        offset += dir_len(names.len());
    }
    let all_names: Vec<&(u32, Vec<u8>)> = types.iter().flat_map(|(_, names)| names).collect();
    let mut language_dirs = Vec::new();
    for _ in &all_names {
        language_dirs.push(offset);
        offset += dir_len(1);
    }
    let mut data_entries = Vec::new();
    for _ in &all_names {
        data_entries.push(offset);
        offset += 16;
    }
    let mut payloads = Vec::new();
    for (_, payload) in &all_names {
        offset = (offset + 3) & !3;
        payloads.push(offset);
        offset += payload.len();
    }

    let mut out = vec![0u8; offset];
    let root: Vec<(u32, u32)> = types
        .iter()
        .zip(&name_dirs)
        .map(|((type_id, _), &dir)| (*type_id, dir as u32 | SUBDIRECTORY))
        .collect();
    write_directory(&mut out, 0, &root);

    let mut flat = 0;
    for ((_, names), &dir) in types.iter().zip(&name_dirs) {
        let mut entries = Vec::new();
        for (name_id, payload) in names {
            entries.push((*name_id, language_dirs[flat] as u32 | SUBDIRECTORY));
            write_directory(&mut out, language_dirs[flat], &[(0x409, data_entries[flat] as u32)]);
            write_u32(&mut out, data_entries[flat], SECTION_RVA + payloads[flat] as u32);
            write_u32(&mut out, data_entries[flat] + 4, payload.len() as u32);
            out[payloads[flat]..payloads[flat] + payload.len()].copy_from_slice(payload);
            flat += 1;
        }
        write_directory(&mut out, dir, &entries);
    }
    out
}

/// A resource tree whose icon group lists `group_ids` in order, where every
/// distinct id is an `RT_ICON` entry aliasing the one shared `image`
/// payload. Real linkers never emit this; hostile files can.
pub fn aliased_icon_rsrc(group_ids: &[u16], image: &[u8]) -> Vec<u8> {
    const SUBDIRECTORY: u32 = 0x8000_0000;
    let dir_len = |entries: usize| 16 + 8 * entries;

    let mut icon_ids: Vec<u16> = group_ids.to_vec();
    icon_ids.sort_unstable();
    icon_ids.dedup();

    let icon_names = dir_len(2);
    let group_names = icon_names + dir_len(icon_ids.len());
    let icon_language = group_names + dir_len(1);
    let group_language = icon_language + dir_len(1);
    let icon_data = group_language + dir_len(1);
    let group_data = icon_data + 16;

    let mut group = Vec::new();
    group.extend_from_slice(&0u16.to_le_bytes());
    group.extend_from_slice(&1u16.to_le_bytes());
    group.extend_from_slice(&(group_ids.len() as u16).to_le_bytes());
    for id in group_ids {
        group.extend_from_slice(&[ICON_SIZE, ICON_SIZE, 0, 0]);
        group.extend_from_slice(&1u16.to_le_bytes());
        group.extend_from_slice(&32u16.to_le_bytes());
        group.extend_from_slice(&(image.len() as u32).to_le_bytes());
        group.extend_from_slice(&id.to_le_bytes());
    }

    let group_payload = (group_data + 16 + 3) & !3;
    let image_payload = (group_payload + group.len() + 3) & !3;
    let mut out = vec![0u8; image_payload + image.len()];

    write_directory(
        &mut out,
        0,
        &[
            (RT_ICON, icon_names as u32 | SUBDIRECTORY),
            (RT_GROUP_ICON, group_names as u32 | SUBDIRECTORY),
        ],
    );
    let shared: Vec<(u32, u32)> = icon_ids
        .iter()
        .map(|&id| (u32::from(id), icon_language as u32 | SUBDIRECTORY))
        .collect();
    write_directory(&mut out, icon_names, &shared);
    write_directory(&mut out, group_names, &[(101, group_language as u32 | SUBDIRECTORY)]);
    write_directory(&mut out, icon_language, &[(0x409, icon_data as u32)]);
    write_directory(&mut out, group_language, &[(0x409, group_data as u32)]);

    write_u32(&mut out, icon_data, SECTION_RVA + image_payload as u32);
    write_u32(&mut out, icon_data + 4, image.len() as u32);
    write_u32(&mut out, group_data, SECTION_RVA + group_payload as u32);
    write_u32(&mut out, group_data + 4, group.len() as u32);

    out[group_payload..group_payload + group.len()].copy_from_slice(&group);
    out[image_payload..].copy_from_slice(image);
    out
}

// ── PE image ─────────────────────────────────────────────────────────────────

/// A PE32 image with a single `.rsrc` section holding `rsrc`.
pub fn build_pe(rsrc: &[u8]) -> Vec<u8> {
    let mut image = vec![0u8; SECTION_FILE_OFFSET];
    image[..2].copy_from_slice(b"MZ");
    write_u32(&mut image, 0x3c, NT_OFFSET as u32);

    let nt = NT_OFFSET;
    image[nt..nt + 4].copy_from_slice(b"PE\0\0");
    write_u16(&mut image, nt + 4, 0x14c);
    write_u16(&mut image, nt + 6, 1);
    write_u16(&mut image, nt + 20, OPTIONAL_HEADER_LEN as u16);

    let optional = nt + 24;
    write_u16(&mut image, optional, 0x10b);
    write_u32(&mut image, optional + 92, 16);
    write_u32(&mut image, optional + 96 + 2 * 8, SECTION_RVA);
    write_u32(&mut image, optional + 96 + 2 * 8 + 4, rsrc.len() as u32);

    let section = optional + OPTIONAL_HEADER_LEN;
    image[section..section + 8].copy_from_slice(b".rsrc\0\0\0");
    write_u32(&mut image, section + 8, rsrc.len() as u32);
    write_u32(&mut image, section + 12, SECTION_RVA);
    write_u32(&mut image, section + 16, rsrc.len() as u32);
    write_u32(&mut image, section + 20, SECTION_FILE_OFFSET as u32);

    image.extend_from_slice(rsrc);
    image
}

/// A PE image with an optional `FileDescription` and an optional icon whose
/// image payload is `icon_image`.
pub fn exe_image(description: Option<&str>, icon_image: Option<&[u8]>) -> Vec<u8> {
    let mut types: Vec<ResourceType> = Vec::new();
    if let Some(image) = icon_image {
        types.push((RT_ICON, vec![(1, image.to_vec())]));
        types.push((RT_GROUP_ICON, vec![(101, icon_group(1, image.len() as u32))]));
    }
    if let Some(description) = description {
        let info = version_info(&[
            ("CompanyName", "Fixture Studio"),
            ("FileDescription", description),
        ]);
        types.push((RT_VERSION, vec![(1, info)]));
    }
    build_pe(&build_rsrc(&types))
}

// ── Filesystem ───────────────────────────────────────────────────────────────

/// Write a PE executable at `path`, creating parent directories.
pub fn write_exe(path: &Path, description: Option<&str>, icon_image: Option<&[u8]>) {
    write_file(path, &exe_image(description, icon_image));
}

/// Write a two-byte non-PE stub at `path`.
pub fn touch(path: &Path) {
    write_file(path, b"MZ");
}

fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}
