//! Persistence boundary: one named slot holding the JSON snapshot.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Context, Result};

pub trait SaveStore: Send {
    /// Returns `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<String>>;
    fn save(&mut self, blob: &str) -> Result<()>;
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read save {}", self.path.display()))
            }
        }
    }

    fn save(&mut self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        // Staged write plus rename: the slot never holds a partial snapshot.
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, blob)
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("Failed to replace save {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory slot; clones share the same contents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        let guard = self
            .slot
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&mut self, blob: &str) -> Result<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        *guard = Some(blob.to_string());
        Ok(())
    }
}
