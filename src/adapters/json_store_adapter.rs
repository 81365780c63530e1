//! JSON file strategy store.
//!
//! The whole book is one versioned document:
//! `{"version": 1, "lists": {...}, "indicator_usage": [...]}`.

use crate::domain::error::DayTraderError;
use crate::domain::selector::StrategyBook;
use crate::ports::strategy_store_port::StrategyStorePort;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct Document<'a> {
    version: u32,
    #[serde(flatten)]
    book: &'a StrategyBook,
}

#[derive(Deserialize)]
struct StoredDocument {
    version: u32,
    #[serde(flatten)]
    book: StrategyBook,
}

pub struct JsonStoreAdapter {
    path: PathBuf,
}

impl JsonStoreAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn store_error(&self, reason: impl std::fmt::Display) -> DayTraderError {
        DayTraderError::Store {
            reason: format!("{}: {}", self.path.display(), reason),
        }
    }
}

impl StrategyStorePort for JsonStoreAdapter {
    fn load(&self) -> Result<StrategyBook, DayTraderError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no strategy store yet");
                return Ok(StrategyBook::default());
            }
            Err(e) => return Err(self.store_error(e)),
        };
        let stored: StoredDocument =
            serde_json::from_str(&content).map_err(|e| self.store_error(e))?;
        if stored.version != FORMAT_VERSION {
            return Err(self.store_error(format!(
                "unsupported format version {}",
                stored.version
            )));
        }
        Ok(stored.book)
    }

    fn save(&self, book: &StrategyBook) -> Result<(), DayTraderError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.store_error(e))?;
        }
        let json = serde_json::to_string_pretty(&Document {
            version: FORMAT_VERSION,
            book,
        })
        .map_err(|e| self.store_error(e))?;
        std::fs::write(&self.path, json).map_err(|e| self.store_error(e))?;
        debug!(path = %self.path.display(), lists = book.lists.len(), "strategy store saved");
        Ok(())
    }
}
