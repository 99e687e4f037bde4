//! Replace-file transaction used by `save`
//!
//! 1. [`ReplaceTransaction::begin`] moves an existing target aside to
//!    `<name>.old`.
//! 2. The caller writes the new file at the target path.
//! 3. [`ReplaceTransaction::commit`] deletes the `.old` file. A leftover
//!    backup is only logged, since the new file is already in place. If the
//!    transaction is dropped without being committed, the partial target is
//!    deleted and the `.old` file is moved back.
//!
//! Because the restore runs in `Drop`, it also runs when the write phase
//! returns early through `?` or unwinds.

use crate::error::Result;
use crate::validation::backup_path;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct ReplaceTransaction {
    target: PathBuf,
    backup: Option<PathBuf>,
    committed: bool,
}

impl ReplaceTransaction {
    pub fn begin(target: &Path) -> Result<Self> {
        let backup = if target.exists() {
            let backup = backup_path(target)?;
            fs::rename(target, &backup)?;
            debug!("Moved {:?} aside to {:?}", target, backup);
            Some(backup)
        } else {
            None
        };

        Ok(ReplaceTransaction {
            target: target.to_path_buf(),
            backup,
            committed: false,
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn backup(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    /// Keep the new file and delete the backup
    pub fn commit(mut self) -> Result<()> {
        self.committed = true;
        if let Some(backup) = self.backup.take() {
            if let Err(e) = fs::remove_file(&backup) {
                warn!("Saved {:?} but failed to remove backup {:?}: {}", self.target, backup, e);
            }
        }
        Ok(())
    }

    fn rollback(&mut self) {
        if self.target.exists() {
            if let Err(e) = fs::remove_file(&self.target) {
                warn!("Failed to remove partial file {:?}: {}", self.target, e);
            }
        }

        if let Some(backup) = self.backup.take() {
            match fs::rename(&backup, &self.target) {
                Ok(()) => debug!("Restored {:?} from {:?}", self.target, backup),
                Err(e) => warn!(
                    "Failed to restore {:?} from {:?}: {}",
                    self.target, backup, e
                ),
            }
        }
    }
}

impl Drop for ReplaceTransaction {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}
