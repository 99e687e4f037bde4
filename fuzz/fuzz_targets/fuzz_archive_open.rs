#![no_main]
use bdmp_rs::{Archive, ArchiveOptions, OpenMode};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes on disk must be rejected with an error, never a panic
fuzz_target!(|data: &[u8]| {
    let dir = match tempfile::TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let path = dir.path().join("fuzz.bdm");
    if std::fs::write(&path, data).is_err() {
        return;
    }

    if let Ok(archive) = Archive::open(&path, OpenMode::Read) {
        let ids: Vec<String> = archive.file_ids().map(str::to_string).collect();
        for id in ids {
            let _ = archive.read_file(&id);
        }
    }

    let options = ArchiveOptions {
        staging_root: dir.path().join("staging"),
        ..ArchiveOptions::default()
    };
    if let Ok(archive) = Archive::open_with_options(&path, OpenMode::ReadWrite, options) {
        let _ = archive.close();
    }
});
