//! Document persistence.
//!
//! A [`DocumentStore`] maps document ids to their content. [`FileStore`]
//! keeps every document in a single TOML file under ~/.quill/.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Maximum size of the documents file (16 MB).
const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Documents file too large")]
    FileTooLarge,
}

/// Read/write access to documents by id.
pub trait DocumentStore {
    /// Returns a document's content, or `None` if it does not exist.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read.
    fn read(&self, id: &str) -> Result<Option<String>, StoreError>;

    /// Creates or replaces a document.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written.
    fn write(&mut self, id: &str, content: &str) -> Result<(), StoreError>;

    /// Deletes a document. Returns whether it existed.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written.
    fn remove(&mut self, id: &str) -> Result<bool, StoreError>;

    /// Lists document ids in ascending order.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read.
    fn list(&self) -> Result<Vec<String>, StoreError>;
}

/// Volatile store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.documents.get(id).cloned())
    }

    fn write(&mut self, id: &str, content: &str) -> Result<(), StoreError> {
        self.documents.insert(id.to_string(), content.to_string());
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(self.documents.remove(id).is_some())
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self.documents.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// On-disk layout of the documents file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DocumentsFile {
    #[serde(default)]
    documents: BTreeMap<String, String>,
}

/// Store persisting all documents into one TOML file.
///
/// Every write rewrites the file through a temporary sibling and a rename,
/// so readers never see a partial file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store at the default path (`~/.quill/documents.toml`).
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quill")
            .join("documents.toml")
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<DocumentsFile, StoreError> {
        if !self.path.exists() {
            return Ok(DocumentsFile::default());
        }
        if fs::metadata(&self.path)?.len() > MAX_FILE_SIZE {
            return Err(StoreError::FileTooLarge);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn save(&self, file: &DocumentsFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(file)?;
        let temp_path = self.path.with_extension("tmp");
        {
            let mut temp = fs::File::create(&temp_path)?;
            temp.write_all(content.as_bytes())?;
            temp.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), count = file.documents.len(), "documents saved");
        Ok(())
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for FileStore {
    fn read(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.documents.remove(id))
    }

    fn write(&mut self, id: &str, content: &str) -> Result<(), StoreError> {
        let mut file = self.load()?;
        file.documents.insert(id.to_string(), content.to_string());
        self.save(&file)
    }

    fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut file = self.load()?;
        if file.documents.remove(id).is_none() {
            return Ok(false);
        }
        self.save(&file)?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load()?.documents.into_keys().collect())
    }
}
