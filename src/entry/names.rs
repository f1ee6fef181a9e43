//! Name collisions and implied directories.
//!
//! The central directory of a zip file may list the same name more than
//! once and is free to omit directory records for the parents of its files.
//! The table holds neither duplicates nor gaps, so both are resolved when an
//! archive is opened.

use std::collections::{HashMap, HashSet};

use super::record::EntryRecord;
use crate::{EntryName, Result};

/// Drops all but the last occurrence of every name.
///
/// Surviving records keep their relative order. Returns the survivors and
/// the number of records dropped.
pub(crate) fn dedup_last_wins(records: Vec<EntryRecord>) -> (Vec<EntryRecord>, usize) {
    let mut last: HashMap<String, usize> = HashMap::with_capacity(records.len());
    for (pos, record) in records.iter().enumerate() {
        last.insert(record.name.as_str().to_string(), pos);
    }

    let total = records.len();
    let kept: Vec<EntryRecord> = records
        .into_iter()
        .enumerate()
        .filter(|(pos, record)| {
            let keep = last.get(record.name.as_str()) == Some(pos);
            if !keep {
                log::warn!(
                    "dropping duplicate record {} for '{}'",
                    record.index,
                    record.name
                );
            }
            keep
        })
        .map(|(_, record)| record)
        .collect();

    let dropped = total - kept.len();
    (kept, dropped)
}

/// Returns the directory names implied by `records` but not present in it,
/// in order of first appearance.
pub(crate) fn missing_directories(records: &[EntryRecord]) -> Result<Vec<EntryName>> {
    let mut known: HashSet<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let mut missing = Vec::new();
    for record in records {
        for prefix in record.name.ancestors() {
            if known.insert(prefix) {
                missing.push(EntryName::new(prefix)?);
            }
        }
    }
    Ok(missing)
}
