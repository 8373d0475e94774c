//! Key-addressed persistence for trained model artifacts.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::model::{ArtifactKey, TrainedModelArtifact};

/// Storage for the single current artifact under each [`ArtifactKey`].
pub trait ModelArtifactStore: Send + Sync {
    fn load(&self, key: ArtifactKey) -> Result<Option<TrainedModelArtifact>, ArtifactStoreError>;

    /// Replaces any artifact already stored under `artifact.key`.
    fn save(&self, artifact: &TrainedModelArtifact) -> Result<(), ArtifactStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactStoreError {
    #[error("artifact io failure at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("artifact at {path} is not valid: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("artifact at {path} holds {found:?}, expected {expected:?}")]
    KeyMismatch {
        path: PathBuf,
        expected: ArtifactKey,
        found: ArtifactKey,
    },
    #[error("artifact store unavailable: {0}")]
    Unavailable(String),
}

/// JSON artifacts in a single directory, one file per key.
pub struct FsModelStore {
    root: PathBuf,
}

impl FsModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn artifact_path(&self, key: ArtifactKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    fn staging_path(&self, key: ArtifactKey) -> PathBuf {
        self.root.join(format!(".{}.tmp", key.file_name()))
    }
}

impl ModelArtifactStore for FsModelStore {
    fn load(&self, key: ArtifactKey) -> Result<Option<TrainedModelArtifact>, ArtifactStoreError> {
        let path = self.artifact_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ArtifactStoreError::Io { path, source }),
        };

        let artifact: TrainedModelArtifact = serde_json::from_slice(&bytes)
            .map_err(|source| ArtifactStoreError::Corrupt {
                path: path.clone(),
                source,
            })?;

        if artifact.key != key {
            return Err(ArtifactStoreError::KeyMismatch {
                path,
                expected: key,
                found: artifact.key,
            });
        }

        Ok(Some(artifact))
    }

    fn save(&self, artifact: &TrainedModelArtifact) -> Result<(), ArtifactStoreError> {
        fs::create_dir_all(&self.root).map_err(|source| ArtifactStoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let staging = self.staging_path(artifact.key);
        let payload =
            serde_json::to_vec_pretty(artifact).map_err(|source| ArtifactStoreError::Corrupt {
                path: staging.clone(),
                source,
            })?;

        let mut file = fs::File::create(&staging).map_err(io_failure(&staging))?;
        file.write_all(&payload).map_err(io_failure(&staging))?;
        file.sync_all().map_err(io_failure(&staging))?;
        drop(file);

        // Rename within one directory replaces the previous artifact in a single step.
        let target = self.artifact_path(artifact.key);
        fs::rename(&staging, &target).map_err(io_failure(&target))?;
        Ok(())
    }
}

fn io_failure(path: &Path) -> impl FnOnce(io::Error) -> ArtifactStoreError {
    let path = path.to_path_buf();
    move |source| ArtifactStoreError::Io { path, source }
}
