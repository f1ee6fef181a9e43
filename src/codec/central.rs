//! Direct walk of the stored central directory.
//!
//! The zip crate folds records that repeat a name into one: the data of the
//! last occurrence is exposed at the position of the first. Reading the
//! record names straight from the central directory recovers every
//! record's ordinal, duplicates included, so the entry layer can resolve
//! them itself.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

const EOCD_SIG: u32 = 0x0605_4b50;
const EOCD64_LOC_SIG: u32 = 0x0706_4b50;
const EOCD64_SIG: u32 = 0x0606_4b50;
const CD_SIG: u32 = 0x0201_4b50;

const EOCD_LEN: usize = 22;
const EOCD64_LOC_LEN: usize = 20;
const EOCD64_LEN: usize = 56;
const CD_HEADER_LEN: usize = 46;

/// Reads the raw name of every central directory record, in stored order.
///
/// Returns `Ok(None)` if the layout is not one this walk understands, for
/// example trailing data after the central directory.
pub(crate) fn raw_names(path: &Path) -> io::Result<Option<Vec<Vec<u8>>>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let tail_len = len.min((EOCD_LEN + u16::MAX as usize) as u64);
    let tail_start = len - tail_len;
    let tail = read_at(&mut file, tail_start, tail_len as usize)?;

    let Some(eocd) = find_eocd(&tail) else {
        return Ok(None);
    };
    let eocd_abs = tail_start + eocd as u64;
    let entries = r16(&tail, eocd + 10);
    let cd_size = r32(&tail, eocd + 12);
    let cd_offset = r32(&tail, eocd + 16);

    let bounds = if entries == u16::MAX || cd_size == u32::MAX || cd_offset == u32::MAX {
        zip64_bounds(&mut file, eocd_abs, len)?
    } else {
        Some((eocd_abs, cd_size as u64))
    };
    // the directory ends where the (zip64) end record starts
    let Some((cd_end, cd_size)) = bounds else {
        return Ok(None);
    };
    let Some(cd_start) = cd_end.checked_sub(cd_size) else {
        return Ok(None);
    };
    let Ok(cd_size) = usize::try_from(cd_size) else {
        return Ok(None);
    };

    let cd = read_at(&mut file, cd_start, cd_size)?;
    Ok(walk(&cd))
}

/// Scans backwards for the end of central directory signature.
fn find_eocd(tail: &[u8]) -> Option<usize> {
    let last = tail.len().checked_sub(EOCD_LEN)?;
    (0..=last).rev().find(|&i| r32(tail, i) == EOCD_SIG)
}

/// Returns the offset and size of a zip64 central directory.
fn zip64_bounds(file: &mut File, eocd_abs: u64, len: u64) -> io::Result<Option<(u64, u64)>> {
    let Some(locator_abs) = eocd_abs.checked_sub(EOCD64_LOC_LEN as u64) else {
        return Ok(None);
    };
    let locator = read_at(file, locator_abs, EOCD64_LOC_LEN)?;
    if r32(&locator, 0) != EOCD64_LOC_SIG {
        return Ok(None);
    }

    let record_abs = r64(&locator, 8);
    if record_abs.saturating_add(EOCD64_LEN as u64) > len {
        return Ok(None);
    }
    let record = read_at(file, record_abs, EOCD64_LEN)?;
    if r32(&record, 0) != EOCD64_SIG {
        return Ok(None);
    }
    Ok(Some((record_abs, r64(&record, 40))))
}

/// Splits central directory bytes into record names.
fn walk(cd: &[u8]) -> Option<Vec<Vec<u8>>> {
    let mut names = Vec::new();
    let mut pos = 0;
    while pos < cd.len() {
        let header = cd.get(pos..pos + CD_HEADER_LEN)?;
        if r32(header, 0) != CD_SIG {
            return None;
        }
        let name_len = r16(header, 28) as usize;
        let extra_len = r16(header, 30) as usize;
        let comment_len = r16(header, 32) as usize;

        let name_start = pos + CD_HEADER_LEN;
        names.push(cd.get(name_start..name_start + name_len)?.to_vec());
        pos = name_start + name_len + extra_len + comment_len;
    }
    Some(names)
}

fn read_at(file: &mut File, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

#[inline]
fn r16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

#[inline]
fn r32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

#[inline]
fn r64(b: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&b[at..at + 8]);
    u64::from_le_bytes(bytes)
}
