use std::cell::RefCell;
use std::rc::Rc;

use aquarium_core::ManualClock;
use aquarium_engine::{AquariumContext, AquariumEngine, EngineConfig};
use aquarium_storage::{SqliteStorage, StorageError};
use tempfile::TempDir;

/// An on-disk SQLite database in a temporary directory, shared as both the
/// inventory and the layout store.
pub struct SqliteFixture {
    _dir: TempDir,
    path: String,
    pub storage: Rc<RefCell<SqliteStorage>>,
}

impl SqliteFixture {
    pub fn new() -> Result<Self, StorageError> {
        let dir = tempfile::tempdir().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let path = dir.path().join("aquarium.db").to_string_lossy().into_owned();
        let storage = SqliteStorage::open(&path)?;
        Ok(Self {
            _dir: dir,
            path,
            storage: Rc::new(RefCell::new(storage)),
        })
    }

    /// Close and reopen the database file, as a new session would.
    pub fn reopen(&mut self) -> Result<(), StorageError> {
        let storage = SqliteStorage::open(&self.path)?;
        self.storage = Rc::new(RefCell::new(storage));
        Ok(())
    }

    pub fn engine(&self, config: EngineConfig, clock: &ManualClock) -> AquariumEngine {
        let ctx = AquariumContext::new(Box::new(self.storage.clone()), Box::new(self.storage.clone()))
            .with_clock(Box::new(clock.clone()));
        AquariumEngine::new(config, ctx)
    }
}
