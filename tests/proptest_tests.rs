//! Property-based tests using proptest.
//!
//! These tests check the entry table invariants of zipedit against randomly
//! generated names and payloads.

mod common;

use common::*;
use proptest::prelude::*;
use zipedit::{EntryKinds, EntryName};

/// Strategy for generating file entry names.
///
/// - 1-4 components separated by '/'
/// - each component is 1-8 characters, never ending in '/'
fn file_name_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-zA-Z0-9][a-zA-Z0-9_.-]{0,7}", 1..5).prop_map(|parts| parts.join("/"))
}

fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..2048)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Adding a name always makes it visible.
    #[test]
    fn add_then_has(name in file_name_strategy()) {
        let (_dir, path) = scratch("prop-add.zip");
        let mut archive = create_archive(&path);
        archive.add_entry(&name).unwrap();
        prop_assert!(archive.has_entry(&name).unwrap());
    }

    /// Deleting a previously added name always removes it, and only it.
    #[test]
    fn delete_then_not_has(names in proptest::collection::vec(file_name_strategy(), 1..6)) {
        let (_dir, path) = scratch("prop-delete.zip");
        let mut archive = create_archive(&path);
        for name in &names {
            archive.add_entry(name).unwrap();
        }
        let victim = &names[0];
        archive.delete_entry(victim).unwrap();
        prop_assert!(!archive.has_entry(victim).unwrap());
        for name in names.iter().filter(|n| *n != victim) {
            prop_assert!(archive.has_entry(name).unwrap());
        }
    }

    /// Every implied parent directory exists and is never listed as a file.
    #[test]
    fn parents_are_synthesized(name in file_name_strategy()) {
        let (_dir, path) = scratch("prop-parents.zip");
        let mut archive = create_archive(&path);
        archive.add_entry(&name).unwrap();

        let files = archive.entry_names(EntryKinds::Files).unwrap();
        let entry_name = EntryName::new(&name).unwrap();
        for parent in entry_name.ancestors() {
            prop_assert!(archive.has_entry(parent).unwrap());
            prop_assert!(!files.iter().any(|f| f == parent));
        }
        prop_assert_eq!(files, vec![name]);
    }

    /// Minted indices are strictly increasing across any sequence of adds.
    #[test]
    fn indices_increase(names in proptest::collection::vec(file_name_strategy(), 1..12)) {
        let (_dir, path) = scratch("prop-index.zip");
        let mut archive = create_archive(&path);
        let mut max_seen: Option<u64> = None;
        for name in &names {
            let handle = archive.add_entry(name).unwrap();
            if let Some(max) = max_seen {
                prop_assert!(handle.index() > max);
            }
            max_seen = archive.max_index().unwrap();
        }
    }

    /// Data survives save, close and reopen unchanged.
    #[test]
    fn save_round_trip(name in file_name_strategy(), data in payload_strategy()) {
        let (_dir, path) = scratch("prop-roundtrip.zip");
        let mut archive = create_archive(&path);
        archive.add_entry_with_data(&name, data.clone()).unwrap();
        archive.save().unwrap();
        archive.close();

        archive.open(&path).unwrap();
        prop_assert_eq!(read_entry(&mut archive, &name), data);
    }

    /// Writing the same name twice keeps exactly one record with the second payload.
    #[test]
    fn overwrite_keeps_last(
        name in file_name_strategy(),
        first in payload_strategy(),
        second in payload_strategy(),
    ) {
        let (_dir, path) = scratch("prop-overwrite.zip");
        let mut archive = create_archive(&path);
        archive.add_entry_with_data(&name, first).unwrap();
        archive.add_entry_with_data(&name, second.clone()).unwrap();

        let files = archive.entry_names(EntryKinds::Files).unwrap();
        prop_assert_eq!(files.iter().filter(|f| **f == name).count(), 1);
        prop_assert_eq!(read_entry(&mut archive, &name), second);
    }

    /// Names with NUL bytes are always rejected.
    #[test]
    fn nul_bytes_rejected(prefix in "[a-z]{0,5}", suffix in "[a-z]{0,5}") {
        let name = format!("{}\0{}", prefix, suffix);
        prop_assert!(EntryName::new(&name).is_err());
    }
}
