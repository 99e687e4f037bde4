//! Staging directory for writable archive sessions
//!
//! A writable session works on plain files: every resource is materialized
//! under `<root>/<random>/files/<storage name>` and `save` streams them back
//! into a fresh container. The directory is owned by [`Staging`] and removed
//! when it is closed or dropped.

use crate::container::ContainerReader;
use crate::error::{ArchiveError, Result};
use crate::validation::StorageName;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

const FILES_DIR: &str = "files";

pub struct Staging {
    root: TempDir,
    files_dir: PathBuf,
}

impl Staging {
    /// Create a fresh staging directory under `staging_root`
    pub fn create(staging_root: &Path) -> Result<Self> {
        fs::create_dir_all(staging_root)?;
        let root = tempfile::Builder::new()
            .prefix("bdmp-")
            .tempdir_in(staging_root)?;
        let files_dir = root.path().join(FILES_DIR);
        fs::create_dir(&files_dir)?;

        debug!("Created staging directory {:?}", root.path());
        Ok(Staging { root, files_dir })
    }

    /// Copy the given resources out of a container into the staging area
    pub fn extract<'a, I>(&self, container: &mut ContainerReader, names: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a StorageName>,
    {
        let mut count = 0;
        for name in names {
            let bytes = container.read_resource(name)?;
            fs::write(self.path_for(name), bytes)?;
            count += 1;
        }
        debug!("Extracted {} resources into {:?}", count, self.root.path());
        Ok(count)
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    pub fn path_for(&self, name: &StorageName) -> PathBuf {
        self.files_dir.join(name.as_str())
    }

    pub fn read(&self, name: &StorageName) -> Result<Vec<u8>> {
        let path = self.path_for(name);
        fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ArchiveError::NotFound(format!("staged resource {:?}", path))
            }
            _ => e.into(),
        })
    }

    pub fn write(&self, name: &StorageName, bytes: &[u8]) -> Result<()> {
        Ok(fs::write(self.path_for(name), bytes)?)
    }

    pub fn remove(&self, name: &StorageName) -> Result<()> {
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the staging tree, reporting failures instead of ignoring them
    pub fn close(self) -> Result<()> {
        let path = self.root.path().to_path_buf();
        self.root.close().map_err(|e| {
            warn!("Failed to remove staging directory {:?}: {}", path, e);
            e
        })?;
        debug!("Removed staging directory {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_write_read() {
        let base = TempDir::new().unwrap();
        let staging = Staging::create(base.path()).unwrap();
        assert!(staging.files_dir().is_dir());
        assert!(staging.root().starts_with(base.path()));

        let name = StorageName::new("a.bin").unwrap();
        staging.write(&name, b"abc").unwrap();
        assert_eq!(staging.read(&name).unwrap(), b"abc");

        staging.remove(&name).unwrap();
        assert!(!staging.path_for(&name).exists());
        // Removing twice is fine
        staging.remove(&name).unwrap();
    }

    #[test]
    fn test_sessions_are_private() {
        let base = TempDir::new().unwrap();
        let a = Staging::create(base.path()).unwrap();
        let b = Staging::create(base.path()).unwrap();
        assert_ne!(a.root(), b.root());
    }

    #[test]
    fn test_close_removes_tree() {
        let base = TempDir::new().unwrap();
        let staging = Staging::create(base.path()).unwrap();
        let root = staging.root().to_path_buf();
        staging
            .write(&StorageName::new("x").unwrap(), b"1")
            .unwrap();

        staging.close().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_drop_removes_tree() {
        let base = TempDir::new().unwrap();
        let root = {
            let staging = Staging::create(base.path()).unwrap();
            staging.root().to_path_buf()
        };
        assert!(!root.exists());
    }
}
