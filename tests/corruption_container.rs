//! Malformed, foreign and future-version archive files

use bdmp_rs::{Archive, ArchiveError, ArchiveOptions, OpenMode, FORMAT_VERSION};
use engram_rs::{ArchiveWriter, CompressionMethod};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn options(dir: &TempDir) -> ArchiveOptions {
    ArchiveOptions {
        staging_root: dir.path().join("staging"),
        ..ArchiveOptions::default()
    }
}

/// Write a raw container with the given entries
fn write_raw(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let mut writer = ArchiveWriter::create(path).unwrap();
    for (name, bytes) in entries {
        writer
            .add_file_with_compression(name, bytes, CompressionMethod::None)
            .unwrap();
    }
    writer.finalize().unwrap();
}

fn payload(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

fn valid_entries() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("data", payload(json!({"version": FORMAT_VERSION, "sections": {}}))),
        ("info", payload(json!({"version": FORMAT_VERSION, "name": "raw", "files": {}}))),
    ]
}

fn all_modes() -> [OpenMode; 3] {
    [OpenMode::Read, OpenMode::Write, OpenMode::ReadWrite]
}

fn staging_is_empty(dir: &TempDir) -> bool {
    let root: PathBuf = dir.path().join("staging");
    !root.exists() || fs::read_dir(root).unwrap().next().is_none()
}

#[test]
fn test_raw_container_opens() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("raw.bdm");
    write_raw(&path, &valid_entries());

    let archive = Archive::open(&path, OpenMode::Read).unwrap();
    assert_eq!(archive.display_name(), "raw");
    assert!(archive.document().is_empty().unwrap());
}

#[test]
fn test_not_a_container_in_every_mode() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, b"plain text, no container here").unwrap();

    for mode in all_modes() {
        match Archive::open_with_options(&path, mode, options(&dir)) {
            Err(ArchiveError::InvalidFile { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("mode {}: expected invalid file, got {:?}", mode, other),
        }
    }
    assert!(staging_is_empty(&dir));
    assert_eq!(fs::read(&path).unwrap(), b"plain text, no container here");
}

#[test]
fn test_missing_required_entries() {
    let dir = TempDir::new().unwrap();

    for missing in ["data", "info"] {
        let path = dir.path().join(format!("no-{}.bdm", missing));
        let entries: Vec<_> = valid_entries()
            .into_iter()
            .filter(|(name, _)| *name != missing)
            .collect();
        write_raw(&path, &entries);

        match Archive::open(&path, OpenMode::Read) {
            Err(ArchiveError::InvalidFile { reason, .. }) => {
                assert!(reason.contains(missing), "reason: {}", reason)
            }
            other => panic!("expected invalid file, got {:?}", other),
        }
    }
}

#[test]
fn test_newer_version_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.bdm");
    let newer = u64::from(FORMAT_VERSION) + 1;
    write_raw(
        &path,
        &[
            ("data", payload(json!({"version": newer, "sections": {}}))),
            ("info", payload(json!({"version": FORMAT_VERSION, "name": "x", "files": {}}))),
        ],
    );

    for mode in all_modes() {
        match Archive::open_with_options(&path, mode, options(&dir)) {
            Err(ArchiveError::VersionMismatch {
                supported, found, ..
            }) => {
                assert_eq!(supported, FORMAT_VERSION);
                assert_eq!(found, newer);
            }
            other => panic!("mode {}: expected version mismatch, got {:?}", mode, other),
        }
    }
}

#[test]
fn test_undecodable_payload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbled.bdm");
    write_raw(
        &path,
        &[
            ("data", b"\x00\x01 not json".to_vec()),
            ("info", payload(json!({"version": FORMAT_VERSION, "name": "x"}))),
        ],
    );

    assert!(matches!(
        Archive::open(&path, OpenMode::Read),
        Err(ArchiveError::InvalidFile { .. })
    ));
}

#[test]
fn test_index_pointing_at_missing_entry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dangling.bdm");
    write_raw(
        &path,
        &[
            ("data", payload(json!({"version": FORMAT_VERSION, "sections": {}}))),
            (
                "info",
                payload(json!({"version": FORMAT_VERSION, "name": "x", "files": {"img": "gone.png"}})),
            ),
        ],
    );

    // Read sessions open lazily and fail on access
    let archive = Archive::open(&path, OpenMode::Read).unwrap();
    assert!(matches!(
        archive.read_file("img"),
        Err(ArchiveError::InvalidFile { .. })
    ));

    // Writable sessions extract up front and fail on open
    assert!(matches!(
        Archive::open_with_options(&path, OpenMode::ReadWrite, options(&dir)),
        Err(ArchiveError::InvalidFile { .. })
    ));
    assert!(staging_is_empty(&dir));
}

#[test]
fn test_unindexed_resource_entries_are_staged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("orphan.bdm");
    let mut entries = valid_entries();
    entries.push(("files/orphan.bin", b"left behind".to_vec()));
    entries.push(("notes.txt", b"not a resource".to_vec()));
    write_raw(&path, &entries);

    let archive = Archive::open_with_options(&path, OpenMode::ReadWrite, options(&dir)).unwrap();
    let files = archive.staging_dir().unwrap().join("files");
    assert_eq!(fs::read(files.join("orphan.bin")).unwrap(), b"left behind");
    assert!(!files.join("notes.txt").exists());
    assert_eq!(archive.file_ids().count(), 0);
    archive.close().unwrap();
}
