//! Memoization of loaded datasets, keyed by source identity.
//!
//! A disk source is identified by both paths plus their modification time and
//! length, so editing either file produces a new key. An upload pair is
//! identified by a hash of its file names and contents.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::{LoadError, Result};

use super::loader::Upload;
use super::model::Dataset;

/// Path plus the metadata that changes when the file does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileStamp {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl FileStamp {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| LoadError::io(path, e))?;
        Ok(FileStamp {
            path: path.to_path_buf(),
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Identity of a loaded source pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Disk {
        companies: FileStamp,
        rounds: FileStamp,
    },
    Upload(u64),
}

impl SourceKey {
    pub fn disk(companies: &Path, rounds: &Path) -> Result<Self> {
        Ok(SourceKey::Disk {
            companies: FileStamp::of(companies)?,
            rounds: FileStamp::of(rounds)?,
        })
    }

    pub fn upload(companies: &Upload, rounds: &Upload) -> Self {
        let mut hasher = DefaultHasher::new();
        companies.hash(&mut hasher);
        rounds.hash(&mut hasher);
        SourceKey::Upload(hasher.finish())
    }
}

/// Loaded datasets by source identity.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<SourceKey, Arc<Dataset>>,
    hits: usize,
}

impl DatasetCache {
    pub fn get(&mut self, key: &SourceKey) -> Option<Arc<Dataset>> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
        }
        found
    }

    /// Store a dataset and hand back the shared handle.
    pub fn insert(&mut self, key: SourceKey, dataset: Dataset) -> Arc<Dataset> {
        let shared = Arc::new(dataset);
        self.entries.insert(key, Arc::clone(&shared));
        shared
    }

    /// Drop every dataset read from disk, keeping uploads.
    pub fn evict_disk(&mut self) {
        self.entries.retain(|key, _| !matches!(key, SourceKey::Disk { .. }));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered from memory.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_key_tracks_content() {
        let companies = Upload::new("startups.csv", b"name\nPayFlex\n".to_vec());
        let rounds = Upload::new("rounds.csv", b"name,round_date\n".to_vec());
        let edited = Upload::new("startups.csv", b"name\nPayFlex\nEduPlus\n".to_vec());

        assert_eq!(
            SourceKey::upload(&companies, &rounds),
            SourceKey::upload(&companies.clone(), &rounds.clone())
        );
        assert_ne!(
            SourceKey::upload(&companies, &rounds),
            SourceKey::upload(&edited, &rounds)
        );
    }
}
