//! Snapshot storage for restart recovery.

use super::engine::{TournamentSession, TournamentState};
use crate::clock::TimerState;
use crate::errors::PersistenceError;
use crate::roster::Player;
use crate::structure::{StructureCatalog, TournamentStructure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted session: the read model, the roster and the timer.
///
/// The structure travels inside `tournament`, so edits made during the
/// session survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub tournament: TournamentState,
    pub players: Vec<Player>,
    pub timer_state: TimerState,
}

impl Snapshot {
    /// Encode as pretty JSON
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Durable home of the latest snapshot
pub trait SnapshotStore: Send + Sync {
    /// Read the latest snapshot, or `None` if nothing was ever saved
    fn load(&self) -> Result<Option<Snapshot>, PersistenceError>;

    /// Replace the stored snapshot
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;
}

/// Single JSON document on disk.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a crash mid-save leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Snapshot::from_json(&json).map(Some)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        fs::write(&temp, snapshot.to_json()?)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw stored text, which need not be a valid snapshot
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// Raw stored text
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        match self.contents() {
            Some(json) => Snapshot::from_json(&json).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let json = snapshot.to_json()?;
        *self.contents.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        Ok(())
    }
}

/// Load the stored session, falling back to a fresh one on `fallback`.
///
/// A missing snapshot is normal on first launch. An unreadable or invalid
/// one is logged and replaced by the fresh session on the next save.
pub fn load_session(
    store: &dyn SnapshotStore,
    catalog: Arc<StructureCatalog>,
    fallback: &TournamentStructure,
) -> TournamentSession {
    match store.load() {
        Ok(Some(snapshot)) => match TournamentSession::restore(catalog.clone(), snapshot) {
            Ok(session) => {
                log::info!(
                    "Restored session on structure '{}' with {} players",
                    session.structure().id,
                    session.players().len()
                );
                return session;
            }
            Err(e) => log::warn!("Discarding invalid snapshot: {}", e),
        },
        Ok(None) => log::info!("No snapshot found, starting fresh session"),
        Err(e) => log::warn!("Failed to load snapshot, starting fresh session: {}", e),
    }

    log::info!("Fresh session on structure '{}'", fallback.id);
    TournamentSession::with_structure(catalog, fallback.clone())
}
