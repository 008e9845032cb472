//! In-memory table store

use super::traits::{StorageResult, TableStore, Tables};
use std::sync::Mutex;

/// Keeps tables in memory; `save_all` replaces the held copy.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: Mutex::new(tables),
        }
    }

    /// Copy of the current tables
    pub fn snapshot(&self) -> Tables {
        self.tables
            .lock()
            .map(|t| t.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl TableStore for MemoryStore {
    fn load_all(&self) -> StorageResult<Tables> {
        Ok(self.snapshot())
    }

    fn save_all(&self, tables: &Tables) -> StorageResult<()> {
        let mut guard = self
            .tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = tables.clone();
        Ok(())
    }
}
