//! Reading-position persistence
//!
//! Positions are keyed by document path and written as pretty JSON. An
//! ephemeral store keeps everything in memory; callers that want durability
//! point the store at a file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::types::ReadingPosition;

/// One saved position for a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPosition {
    pub current_page: usize,
    pub total_pages: usize,
    /// Fraction of the document read, in [0, 1]
    pub progress: f32,
    pub last_read: chrono::DateTime<chrono::Utc>,
}

impl SavedPosition {
    #[must_use]
    pub fn position(&self) -> ReadingPosition {
        ReadingPosition {
            current_page: self.current_page,
            total_pages: self.total_pages,
            progress: self.progress,
        }
    }
}

/// Position persistence seam. The session saves through this; tests swap in
/// whatever they need.
pub trait PositionStore {
    fn get(&self, document: &str) -> Option<SavedPosition>;
    fn update(&mut self, document: &str, position: ReadingPosition);
    fn flush(&mut self) -> anyhow::Result<()>;
}

/// JSON-file-backed position store.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonPositionStore {
    documents: HashMap<String, SavedPosition>,
    #[serde(skip)]
    file_path: Option<String>,
}

impl JsonPositionStore {
    /// In-memory only; flush is a no-op.
    pub fn ephemeral() -> Self {
        Self {
            documents: HashMap::new(),
            file_path: None,
        }
    }

    pub fn with_file(file_path: &str) -> Self {
        Self {
            documents: HashMap::new(),
            file_path: Some(file_path.to_string()),
        }
    }

    pub fn load_or_ephemeral(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("failed to load positions from {path}: {e}");
                Self::with_file(path)
            }),
            None => Self::ephemeral(),
        }
    }

    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(file_path);
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut store: Self = serde_json::from_str(&content)?;
            store.file_path = Some(file_path.to_string());
            Ok(store)
        } else {
            Ok(Self::with_file(file_path))
        }
    }

    /// Most recently read document, if any.
    #[must_use]
    pub fn most_recent(&self) -> Option<(&str, &SavedPosition)> {
        self.documents
            .iter()
            .max_by_key(|(_, saved)| saved.last_read)
            .map(|(path, saved)| (path.as_str(), saved))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SavedPosition)> {
        self.documents.iter()
    }
}

impl PositionStore for JsonPositionStore {
    fn get(&self, document: &str) -> Option<SavedPosition> {
        self.documents.get(document).cloned()
    }

    fn update(&mut self, document: &str, position: ReadingPosition) {
        self.documents.insert(
            document.to_string(),
            SavedPosition {
                current_page: position.current_page,
                total_pages: position.total_pages,
                progress: position.progress,
                last_read: chrono::Utc::now(),
            },
        );
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        match &self.file_path {
            Some(path) => {
                let content = serde_json::to_string_pretty(self)?;
                fs::write(path, content)?;
                Ok(())
            }
            // Ephemeral stores don't write to disk
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(page: usize, total: usize) -> ReadingPosition {
        ReadingPosition::at_page(page, total)
    }

    #[test]
    fn ephemeral_store_keeps_positions_in_memory() {
        let mut store = JsonPositionStore::ephemeral();
        store.update("/books/a.pdf", position(4, 20));

        let saved = store.get("/books/a.pdf").expect("saved");
        assert_eq!(saved.current_page, 4);
        assert_eq!(saved.total_pages, 20);
        assert!(store.flush().is_ok());
    }

    #[test]
    fn file_store_roundtrips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("positions.json");
        let path_str = path.to_str().expect("utf8 path");

        let mut store = JsonPositionStore::with_file(path_str);
        store.update("/books/a.pdf", position(7, 30));
        store.flush().expect("flush");

        let reloaded = JsonPositionStore::load_from_file(path_str).expect("load");
        let saved = reloaded.get("/books/a.pdf").expect("saved");
        assert_eq!(saved.current_page, 7);
        assert!((saved.progress - 8.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn missing_file_loads_as_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.json");
        let store =
            JsonPositionStore::load_from_file(path.to_str().expect("utf8 path")).expect("load");
        assert!(store.get("/books/a.pdf").is_none());
    }

    #[test]
    fn corrupt_file_falls_back_to_fresh_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("positions.json");
        fs::write(&path, "not json").expect("write");

        let store = JsonPositionStore::load_or_ephemeral(path.to_str());
        assert!(store.get("/books/a.pdf").is_none());
    }

    #[test]
    fn most_recent_picks_latest_update() {
        let mut store = JsonPositionStore::ephemeral();
        store.update("/books/a.pdf", position(1, 10));
        store.update("/books/b.pdf", position(2, 10));

        let (doc, _) = store.most_recent().expect("has entries");
        assert_eq!(doc, "/books/b.pdf");
    }
}
