//! Corpus snapshot loading, validation and memoization

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};

/// One entry of the on-disk snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub filename: String,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// On-disk snapshot written by the embedding generation job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSnapshot {
    pub files: Vec<SnapshotFile>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

/// A knowledge base document with its precomputed embedding
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusDocument {
    /// Source filename, used as the stable key
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Validated, immutable corpus
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<CorpusDocument>,
    dimensions: usize,
    generated_at: Option<String>,
    loaded_at: DateTime<Utc>,
}

impl Corpus {
    /// Validate a parsed snapshot.
    ///
    /// Every entry needs a non-empty filename, content and embedding of finite
    /// values, and all embeddings must share one dimensionality. An empty `files` list is valid.
    pub fn from_snapshot(snapshot: CorpusSnapshot) -> Result<Self> {
        let mut dimensions = None;
        let mut documents = Vec::with_capacity(snapshot.files.len());

        for (index, file) in snapshot.files.into_iter().enumerate() {
            if file.filename.trim().is_empty() {
                return Err(Error::CorpusCorrupt(format!("entry {} has an empty filename", index)));
            }
            if file.content.is_empty() {
                return Err(Error::CorpusCorrupt(format!("'{}' has empty content", file.filename)));
            }
            if file.embedding.is_empty() {
                return Err(Error::CorpusCorrupt(format!("'{}' has an empty embedding", file.filename)));
            }
            if file.embedding.iter().any(|v| !v.is_finite()) {
                return Err(Error::CorpusCorrupt(format!(
                    "'{}' has a non-finite embedding component",
                    file.filename
                )));
            }

            match dimensions {
                None => dimensions = Some(file.embedding.len()),
                Some(expected) if expected != file.embedding.len() => {
                    return Err(Error::CorpusCorrupt(format!(
                        "'{}' has {} dimensions, expected {}",
                        file.filename,
                        file.embedding.len(),
                        expected
                    )));
                }
                Some(_) => {}
            }

            documents.push(CorpusDocument {
                id: file.filename,
                text: file.content,
                embedding: file.embedding,
            });
        }

        Ok(Self {
            documents,
            dimensions: dimensions.unwrap_or(0),
            generated_at: snapshot.generated_at,
            loaded_at: Utc::now(),
        })
    }

    /// Parse and validate snapshot JSON
    pub fn from_json(raw: &str) -> Result<Self> {
        let snapshot: CorpusSnapshot = serde_json::from_str(raw)
            .map_err(|e| Error::CorpusCorrupt(format!("Invalid embeddings file format: {}", e)))?;
        Self::from_snapshot(snapshot)
    }

    /// Read a snapshot file
    pub fn read_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::CorpusNotFound(path.to_path_buf()),
            _ => Error::CorpusCorrupt(format!("Failed to read {}: {}", path.display(), e)),
        })?;
        Self::from_json(&raw)
    }

    pub fn documents(&self) -> &[CorpusDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Shared embedding dimensionality (0 for an empty corpus)
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn generated_at(&self) -> Option<&str> {
        self.generated_at.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Load-once owner of the corpus snapshot.
///
/// The first `load` reads and validates the file; later calls hand out the same
/// `Arc` until `invalidate` is called. Concurrent first loads are serialized so
/// the file is read once.
pub struct CorpusStore {
    path: PathBuf,
    cached: RwLock<Option<Arc<Corpus>>>,
    load_lock: Mutex<()>,
}

impl CorpusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    /// Return the memoized corpus, reading the snapshot on first use
    pub fn load(&self) -> Result<Arc<Corpus>> {
        if let Some(corpus) = self.cached.read().as_ref() {
            return Ok(Arc::clone(corpus));
        }

        let _guard = self.load_lock.lock();
        if let Some(corpus) = self.cached.read().as_ref() {
            return Ok(Arc::clone(corpus));
        }

        let corpus = Arc::new(Corpus::read_from(&self.path)?);
        tracing::info!(
            "Loaded {} KB documents ({} dimensions) from {}",
            corpus.len(),
            corpus.dimensions(),
            self.path.display()
        );
        *self.cached.write() = Some(Arc::clone(&corpus));
        Ok(corpus)
    }

    /// Drop the memoized corpus so the next `load` re-reads the snapshot
    pub fn invalidate(&self) {
        let _guard = self.load_lock.lock();
        if self.cached.write().take().is_some() {
            tracing::debug!("Corpus cache cleared");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.read().is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
