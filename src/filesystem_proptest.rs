//! Property-based tests for the in-memory filesystem and the staging steps
//! built on it.
//!
//! These tests use proptest to generate random trees and verify that
//! invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::fetch::tests::{entry, FakeRemote};
    use crate::fetch::{download_files, RemoteFile};
    use crate::filesystem::{FileSystem, MemoryFS};
    use crate::remote::{ContentOptions, EntryType};
    use crate::stage::{create_dir, stage_files};
    use proptest::collection::{btree_map, btree_set, vec};
    use proptest::prelude::*;
    use std::path::Path;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,7}"
    }

    fn relative_path() -> impl Strategy<Value = String> {
        vec(segment(), 1..4).prop_map(|parts| parts.join("/"))
    }

    // ============================================================================
    // create_dir property tests
    // ============================================================================

    proptest! {
        /// Property: creating a directory twice leaves the same tree as once
        #[test]
        fn create_dir_is_idempotent(path in relative_path()) {
            let mut once = MemoryFS::new();
            create_dir(&mut once, Path::new(&path)).unwrap();

            let mut twice = MemoryFS::new();
            create_dir(&mut twice, Path::new(&path)).unwrap();
            create_dir(&mut twice, Path::new(&path)).unwrap();

            let once: Vec<_> = once.entries().collect();
            let twice: Vec<_> = twice.entries().collect();
            prop_assert_eq!(once, twice);
        }

        /// Property: the last write to a path is what a read returns
        #[test]
        fn write_then_read_returns_last_write(
            path in relative_path(),
            first in vec(any::<u8>(), 0..64),
            second in vec(any::<u8>(), 0..64),
        ) {
            let mut fs = MemoryFS::new();
            fs.write(Path::new(&path), &first).unwrap();
            fs.write(Path::new(&path), &second).unwrap();
            prop_assert_eq!(fs.read(Path::new(&path)).unwrap(), second);
        }
    }

    // ============================================================================
    // stage_files property tests
    // ============================================================================

    proptest! {
        /// Property: every staged file holds exactly its source bytes
        #[test]
        fn staged_files_hold_their_content(
            files in btree_map("[a-z]{1,6}(/[a-z]{1,6}){0,2}\\.txt", vec(any::<u8>(), 0..32), 1..8)
        ) {
            let mut fs = MemoryFS::new();
            let remote_files: Vec<RemoteFile> = files
                .iter()
                .map(|(name, content)| RemoteFile::from_bytes(name.clone(), content.clone()))
                .collect();

            stage_files(&mut fs, remote_files, Path::new("staging")).unwrap();

            prop_assert!(fs.is_dir(Path::new("staging")));
            for (name, content) in &files {
                let staged = fs.read(&Path::new("staging").join(name)).unwrap();
                prop_assert_eq!(&staged, content);
            }
        }
    }

    // ============================================================================
    // download_files property tests
    // ============================================================================

    proptest! {
        /// Property: one artifact per wanted path that exists, NotFound otherwise
        #[test]
        fn download_returns_exactly_the_wanted_files(
            present in btree_set("[a-z]{1,6}\\.md", 1..8),
            extra in btree_set("[A-Z]{1,6}\\.md", 0..3),
            pick in vec(any::<bool>(), 8),
        ) {
            let entries = present
                .iter()
                .map(|name| entry(EntryType::File, &format!("chart/{}", name)))
                .collect();
            let mut remote = FakeRemote::default().with_dir("chart", entries);
            for name in &present {
                remote = remote.with_file(&format!("chart/{}", name), name);
            }

            let mut wanted: Vec<String> = present
                .iter()
                .zip(pick.iter())
                .filter(|(_, keep)| **keep)
                .map(|(name, _)| format!("chart/{}", name))
                .collect();
            let expected = wanted.clone();
            wanted.extend(extra.iter().map(|name| format!("chart/{}", name)));

            let result = download_files(
                &remote,
                "deis",
                "charts",
                &ContentOptions::default(),
                wanted.as_slice(),
            );

            if extra.is_empty() {
                let files = result.unwrap();
                let names: Vec<String> = files.into_iter().map(|f| f.file_name).collect();
                prop_assert_eq!(names, expected);
            } else {
                prop_assert!(result.unwrap_err().is_not_found());
            }
        }
    }
}
