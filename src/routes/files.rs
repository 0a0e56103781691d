//! Serving-directory access for the `/files/` endpoints.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncReadExt;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file name {0:?} is not a plain relative path")]
    InvalidName(String),

    #[error("{} not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {}", .path.display(), .source)]
    Write { path: PathBuf, source: io::Error },
}

/// Files under one serving directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a request file name onto a path inside the serving directory.
    ///
    /// Only names made entirely of normal components are accepted: empty
    /// names, `.`/`..` segments and absolute paths are rejected, so a name
    /// can never point outside the directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, FileError> {
        let relative = Path::new(name);
        let mut components = relative.components().peekable();

        let plain = components.peek().is_some()
            && components.all(|c| matches!(c, Component::Normal(_)));

        if !plain || name.contains('\\') {
            return Err(FileError::InvalidName(name.to_string()));
        }

        Ok(self.root.join(relative))
    }

    /// Reads the whole file. The handle is closed before returning on every
    /// path.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, FileError> {
        let path = self.resolve(name)?;

        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FileError::NotFound { path });
            }
            Err(source) => return Err(FileError::Read { path, source }),
        };

        let mut contents = Vec::new();
        match file.read_to_end(&mut contents).await {
            Ok(_) => Ok(contents),
            Err(source) => Err(FileError::Read { path, source }),
        }
    }

    /// Creates or truncates the file and writes `contents` to it.
    pub async fn write(&self, name: &str, contents: &[u8]) -> Result<(), FileError> {
        let path = self.resolve(name)?;

        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| FileError::Write { path, source })
    }
}
