//! Temp file that is removed unless committed.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::StorageError;

/// Bytes staged at `<final>.part`. Dropping an uncommitted `StagedFile`
/// deletes the temp file, so a failed save never leaves a partial image behind.
pub struct StagedFile {
    file: Option<File>,
    temp_path: PathBuf,
    committed: bool,
}

impl StagedFile {
    pub fn create(temp_path: &Path) -> Result<Self, StorageError> {
        let file = File::create(temp_path).map_err(|e| StorageError::io(temp_path, e))?;
        Ok(Self {
            file: Some(file),
            temp_path: temp_path.to_path_buf(),
            committed: false,
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), StorageError> {
        let Some(file) = self.file.as_mut() else {
            return Err(StorageError::io(
                &self.temp_path,
                std::io::Error::other("staged file already closed"),
            ));
        };
        file.write_all(data)
            .map_err(|e| StorageError::io(&self.temp_path, e))
    }

    /// Sync and rename to `final_path`. The temp file is gone afterwards either way.
    pub fn commit(mut self, final_path: &Path) -> Result<(), StorageError> {
        if let Some(file) = self.file.take() {
            file.sync_all()
                .map_err(|e| StorageError::io(&self.temp_path, e))?;
        }
        std::fs::rename(&self.temp_path, final_path)
            .map_err(|e| StorageError::io(final_path, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        self.file.take();
        if !self.committed {
            if let Err(e) = std::fs::remove_file(&self.temp_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.temp_path.display(), "could not remove temp file: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_renames() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("a.png.part");
        let fp = dir.path().join("a.png");
        let mut staged = StagedFile::create(&tp).unwrap();
        staged.write_all(b"png-bytes").unwrap();
        staged.commit(&fp).unwrap();
        assert!(!tp.exists());
        assert_eq!(std::fs::read(&fp).unwrap(), b"png-bytes");
    }

    #[test]
    fn drop_without_commit_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("b.png.part");
        {
            let mut staged = StagedFile::create(&tp).unwrap();
            staged.write_all(b"partial").unwrap();
            assert!(tp.exists());
        }
        assert!(!tp.exists());
    }

    #[test]
    fn failed_commit_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("c.png.part");
        let missing_parent = dir.path().join("nope").join("c.png");
        let mut staged = StagedFile::create(&tp).unwrap();
        staged.write_all(b"x").unwrap();
        assert!(staged.commit(&missing_parent).is_err());
        assert!(!tp.exists());
    }
}
