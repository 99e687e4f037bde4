//! Open-mode and ownership enforcement through the public API

use bdmp_rs::{Archive, ArchiveError, ArchiveOptions, Capability, FileAccess, OpenMode};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn options(dir: &TempDir) -> ArchiveOptions {
    ArchiveOptions {
        staging_root: dir.path().join("staging"),
        ..ArchiveOptions::default()
    }
}

fn seed(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("doc.bdm");
    let src = dir.path().join("r.txt");
    fs::write(&src, b"resource").unwrap();

    let mut archive = Archive::open_with_options(&path, OpenMode::Write, options(dir)).unwrap();
    archive.add_file(&src, "r", None).unwrap();
    archive
        .document_mut()
        .add_section("s", "chapter", "desc")
        .unwrap()
        .add_item(Some("i"), "Title", "Body", "r", 2)
        .unwrap();
    archive.save().unwrap();
    path
}

fn is_denied(result: Result<impl Sized, ArchiveError>, wanted: Capability) -> bool {
    matches!(result, Err(ArchiveError::PermissionDenied { capability, .. }) if capability == wanted)
}

#[test]
fn test_read_mode_rejects_every_mutation() {
    let dir = TempDir::new().unwrap();
    let path = seed(&dir);
    let before = fs::read(&path).unwrap();
    let src = dir.path().join("r.txt");

    let mut archive = Archive::open(&path, OpenMode::Read).unwrap();
    assert!(archive.staging_dir().is_none());

    assert!(is_denied(archive.add_file(&src, "other", None), Capability::Write));
    assert!(is_denied(archive.write_file("r", b"x"), Capability::Write));
    assert!(is_denied(archive.remove_file("r"), Capability::Write));
    assert!(is_denied(archive.open_file("r", FileAccess::Append), Capability::Write));
    assert!(is_denied(archive.set_display_name("x"), Capability::Write));
    assert!(is_denied(archive.save(), Capability::Write));

    let mut doc = archive.document_mut();
    assert!(is_denied(doc.add_section("t", "k", "d"), Capability::Write));
    assert!(is_denied(doc.remove_section("s"), Capability::Write));
    assert!(is_denied(doc.section_mut("s"), Capability::Write));

    // Reads still work
    let item = archive
        .document()
        .section("s")
        .unwrap()
        .unwrap()
        .item("i")
        .unwrap()
        .unwrap();
    assert_eq!(item.level(), 2);
    assert_eq!(archive.read_file("r").unwrap(), b"resource");

    drop(archive);
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_write_mode_rejects_reads() {
    let dir = TempDir::new().unwrap();
    let path = seed(&dir);

    let mut archive = Archive::open_with_options(&path, OpenMode::Write, options(&dir)).unwrap();
    assert!(is_denied(archive.read_file("r"), Capability::Read));
    assert!(is_denied(archive.document().section("s"), Capability::Read));
    assert!(is_denied(archive.document().section_count(), Capability::Read));
    assert!(archive.document().contains_section("s"));

    // Existing content is kept and still writable
    archive
        .document_mut()
        .add_section("more", "chapter", "")
        .unwrap();
    archive.save().unwrap();
    archive.close().unwrap();

    let reopened = Archive::open(&path, OpenMode::Read).unwrap();
    assert_eq!(reopened.document().section_count().unwrap(), 2);
    assert_eq!(reopened.read_file("r").unwrap(), b"resource");
}

#[test]
fn test_nodes_cannot_cross_sessions() {
    let dir = TempDir::new().unwrap();
    let path = seed(&dir);

    let mut first = Archive::open_with_options(&path, OpenMode::ReadWrite, options(&dir)).unwrap();
    let second = Archive::open_with_options(&path, OpenMode::ReadWrite, options(&dir)).unwrap();
    assert_ne!(first.owner().archive(), second.owner().archive());
    let first_owner = first.owner().clone();

    let stolen = second
        .document()
        .section("s")
        .unwrap()
        .unwrap()
        .item("i")
        .unwrap()
        .unwrap()
        .clone();

    let mut doc = first.document_mut();
    let mut section = doc.section_mut("s").unwrap().unwrap();
    assert!(matches!(
        section.insert_item("copy", stolen),
        Err(ArchiveError::OwnershipMismatch { .. })
    ));
    assert!(!section.contains("copy").unwrap());

    // Mutable access only exposes checked setters; the stored item stays native
    section.item_mut("i").unwrap().unwrap().set_title("Renamed").unwrap();
    assert_eq!(section.item("i").unwrap().unwrap().owner(), &first_owner);
    assert!(matches!(
        doc.insert_section("s", second.new_section("chapter", "foreign")),
        Err(ArchiveError::OwnershipMismatch { .. })
    ));
    drop(doc);

    let native = first.new_item("Own", "", "r", 0);
    first
        .document_mut()
        .section_mut("s")
        .unwrap()
        .unwrap()
        .insert_item("own", native)
        .unwrap();
}

#[test]
fn test_mode_tags() {
    let dir = TempDir::new().unwrap();
    let path = seed(&dir);

    for (tag, readable, writable) in [("r", true, false), ("w", false, true), ("r+", true, true)] {
        let mode: OpenMode = tag.parse().unwrap();
        let archive = Archive::open_with_options(&path, mode, options(&dir)).unwrap();
        assert_eq!(archive.is_readable(), readable, "mode {}", tag);
        assert_eq!(archive.is_writable(), writable, "mode {}", tag);
        assert_eq!(archive.staging_dir().is_some(), writable, "mode {}", tag);
    }

    assert!(matches!(
        "a".parse::<OpenMode>(),
        Err(ArchiveError::InvalidMode(_))
    ));
}
