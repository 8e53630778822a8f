use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
    time::SystemTime,
};

use murmur_config::ArtifactConfig;
use sha2::{Digest, Sha256};
use tempfile::{NamedTempFile, TempDir};

use crate::types::{ProviderKind, SynthesisRequest};

const STAGING_PREFIX: &str = ".staging-";
const ARTIFACT_EXTENSION: &str = "wav";

/// Scratch directory holding generated audio
///
/// Artifacts are written to a staging file first and renamed into place, so
/// a reader never sees a half-written WAV. Names are derived from the full
/// request; identical requests overwrite each other, last writer wins.
///
/// A commit hands back an open handle to the artifact, taken before any
/// eviction can run, so a bounded store never pulls a file out from under
/// the request that produced it.
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    max_files: Option<usize>,
    // Serializes rename, open and eviction
    commit_lock: Mutex<()>,
    // Removes the directory on drop when the store owns it
    _owned: Option<TempDir>,
}

impl ArtifactStore {
    /// Create a fresh temporary directory that is removed on drop
    pub fn temporary(max_files: Option<usize>) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("murmur-").tempdir()?;

        Ok(Self {
            root: dir.path().to_path_buf(),
            max_files,
            commit_lock: Mutex::new(()),
            _owned: Some(dir),
        })
    }

    /// Use a fixed directory, creating it if needed; contents outlive the process
    pub fn at(root: impl Into<PathBuf>, max_files: Option<usize>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            max_files,
            commit_lock: Mutex::new(()),
            _owned: None,
        })
    }

    pub fn from_config(config: &ArtifactConfig) -> io::Result<Self> {
        match config.directory {
            Some(ref directory) => Self::at(directory, config.max_files),
            None => Self::temporary(config.max_files),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic file name for a request rendered by `kind`
    pub fn artifact_name(kind: ProviderKind, request: &SynthesisRequest) -> String {
        let mut hasher = Sha256::new();
        hasher.update(kind.as_str().as_bytes());
        hasher.update([0x1f]);
        hasher.update(request.language.as_bytes());
        hasher.update([0x1f]);
        hasher.update(request.speed.to_bits().to_le_bytes());
        hasher.update(request.text.as_bytes());

        let digest = format!("{:x}", hasher.finalize());

        format!("{kind}_{}.{ARTIFACT_EXTENSION}", &digest[..16])
    }

    /// Open an empty staging file inside the store
    pub fn stage(&self) -> io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(".wav")
            .tempfile_in(&self.root)
    }

    /// Move a staged file to its final name, open it, then apply the size bound
    pub fn commit(&self, staged: NamedTempFile, name: &str) -> io::Result<Artifact> {
        let path = self.root.join(name);

        let _guard = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);

        staged.persist(&path).map_err(|e| e.error)?;
        let file = fs::File::open(&path)?;

        if let Some(max_files) = self.max_files {
            self.evict(max_files, &path)?;
        }

        Ok(Artifact { path, file })
    }

    /// Committed artifacts, oldest first
    pub fn artifacts(&self) -> io::Result<Vec<PathBuf>> {
        let mut entries: Vec<(SystemTime, PathBuf)> = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();

            let is_artifact = path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION)
                && !entry.file_name().to_string_lossy().starts_with('.');

            if !is_artifact {
                continue;
            }

            // Raced with a concurrent eviction
            let Ok(metadata) = entry.metadata() else {
                continue;
            };

            entries.push((metadata.modified()?, path));
        }

        entries.sort();

        Ok(entries.into_iter().map(|(_, path)| path).collect())
    }

    fn evict(&self, max_files: usize, keep: &Path) -> io::Result<()> {
        let artifacts = self.artifacts()?;
        let excess = artifacts.len().saturating_sub(max_files);

        for path in artifacts.iter().filter(|path| path.as_path() != keep).take(excess) {
            match fs::remove_file(path) {
                Ok(()) => tracing::debug!("evicted artifact {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("failed to evict artifact {}: {e}", path.display()),
            }
        }

        Ok(())
    }
}

/// A committed file and a handle opened on it before eviction could run
#[derive(Debug)]
pub struct Artifact {
    pub path: PathBuf,
    pub file: fs::File,
}
