//! Download destination.
//!
//! Images are staged as `<name>.part` and atomically renamed into place.
//! Relative names may carry a folder prefix (`cats/cat001.png`); absolute
//! paths and `..` components are refused.

mod staged;

pub use staged::StagedFile;

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid download path: {0}")]
    InvalidPath(String),
    #[error("storage error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where downloaded bytes go.
pub trait ImageSink {
    /// Persist `bytes` under `relative_name`; returns the path actually written.
    /// `save_as` mirrors the browser's "ask where to save" flag.
    fn save(&self, relative_name: &str, bytes: &[u8], save_as: bool) -> Result<PathBuf, StorageError>;
}

/// What to do when the target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictAction {
    /// Pick `name (1).ext`, `name (2).ext`, ...
    #[default]
    Uniquify,
    Overwrite,
}

/// Saves into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    conflict: ConflictAction,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            conflict: ConflictAction::default(),
        }
    }

    pub fn with_conflict_action(mut self, conflict: ConflictAction) -> Self {
        self.conflict = conflict;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target_path(&self, relative_name: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(relative_name);
        if relative_name.is_empty() {
            return Err(StorageError::InvalidPath("empty file name".to_string()));
        }
        for component in rel.components() {
            match component {
                Component::Normal(_) => {}
                _ => return Err(StorageError::InvalidPath(relative_name.to_string())),
            }
        }
        let path = self.root.join(rel);
        Ok(match self.conflict {
            ConflictAction::Overwrite => path,
            ConflictAction::Uniquify => uniquify(path),
        })
    }
}

impl ImageSink for DirectorySink {
    fn save(&self, relative_name: &str, bytes: &[u8], save_as: bool) -> Result<PathBuf, StorageError> {
        if save_as {
            tracing::debug!(name = relative_name, "no save dialog available; saving to download dir");
        }
        let final_path = self.target_path(relative_name)?;
        if let Some(parent) = final_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let mut staged = StagedFile::create(&temp_path(&final_path))?;
        staged.write_all(bytes)?;
        staged.commit(&final_path)?;

        tracing::debug!(path = %final_path.display(), bytes = bytes.len(), "saved image");
        Ok(final_path)
    }
}

/// Path for the temp file: appends `.part` to the final path (e.g. `a.png` → `a.png.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

fn uniquify(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
    (1u32..)
        .map(|n| {
            let name = match &ext {
                Some(ext) => format!("{} ({}).{}", stem, n, ext),
                None => format!("{} ({})", stem, n),
            };
            parent.join(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or(path)
}
