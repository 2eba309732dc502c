//! Persistence of the session snapshot.
//!
//! The stored form is a small JSON object, `{"board": [[..]], "score": n,
//! "playable": bool}`. Decoding validates the board, so a store never hands
//! back a grid with the wrong shape or an illegal tile.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{Board, Score};
use crate::game::SessionSnapshot;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where a session's snapshot lives between runs.
pub trait SnapshotStore {
    /// Read the saved snapshot. `Ok(None)` means nothing has been saved yet.
    fn load(&mut self) -> Result<Option<SessionSnapshot>, StoreError>;

    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<(), StoreError>;
}

/// On-disk layout of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Persisted {
    board: Board,
    score: Score,
    playable: bool,
}

impl From<&SessionSnapshot> for Persisted {
    fn from(s: &SessionSnapshot) -> Self {
        Persisted { board: s.board, score: s.score, playable: !s.over }
    }
}

impl From<Persisted> for SessionSnapshot {
    fn from(p: Persisted) -> Self {
        SessionSnapshot { board: p.board, score: p.score, over: !p.playable }
    }
}

pub fn encode_snapshot(snapshot: &SessionSnapshot) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&Persisted::from(snapshot))?)
}

pub fn decode_snapshot(text: &str) -> Result<SessionSnapshot, StoreError> {
    let persisted: Persisted = serde_json::from_str(text)?;
    Ok(persisted.into())
}

/// Snapshot kept in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileStore { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<SessionSnapshot>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode_snapshot(&text).map(Some)
    }

    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let data = encode_snapshot(snapshot)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        // Write a sibling file, then rename it over the target.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Snapshot held in memory as its encoded text. Used when no state file is
/// configured, and by tests to count saves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Option<String>,
    saves: usize,
    loads: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with raw text, valid or not.
    pub fn with_contents(text: impl Into<String>) -> Self {
        MemoryStore { slot: Some(text.into()), ..Self::default() }
    }

    pub fn contents(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn loads(&self) -> usize {
        self.loads
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&mut self) -> Result<Option<SessionSnapshot>, StoreError> {
        self.loads += 1;
        self.slot.as_deref().map(decode_snapshot).transpose()
    }

    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        self.slot = Some(encode_snapshot(snapshot)?);
        self.saves += 1;
        Ok(())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load(&mut self) -> Result<Option<SessionSnapshot>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        (**self).save(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> SessionSnapshot {
        let rows = [[2, 4, 0, 0], [0; 4], [0, 0, 8, 0], [0, 0, 0, 2]];
        let board = Board::from_rows(rows).unwrap();
        SessionSnapshot { board, score: 36, over: false }
    }

    #[test]
    fn encodes_playable_flag() {
        let text = encode_snapshot(&sample()).unwrap();
        assert_eq!(
            text,
            r#"{"board":[[2,4,0,0],[0,0,0,0],[0,0,8,0],[0,0,0,2]],"score":36,"playable":true}"#
        );
        assert_eq!(decode_snapshot(&text).unwrap(), sample());
    }

    #[test]
    fn rejects_malformed_snapshots() {
        let cases = [
            "",
            "not json",
            r#"{"board":[[2,4,0,0],[0,0,0,0],[0,0,8,0]],"score":0,"playable":true}"#,
            r#"{"board":[[2,4,0],[0,0,0,0],[0,0,8,0],[0,0,0,2]],"score":0,"playable":true}"#,
            r#"{"board":[[2,4,0,0],[0,0,0,0],[0,0,6,0],[0,0,0,2]],"score":0,"playable":true}"#,
            r#"{"board":[[1,4,0,0],[0,0,0,0],[0,0,8,0],[0,0,0,2]],"score":0,"playable":true}"#,
            r#"{"board":[[-2,4,0,0],[0,0,0,0],[0,0,8,0],[0,0,0,2]],"score":0,"playable":true}"#,
            r#"{"board":[[2,4,0,0],[0,0,0,0],[0,0,8,0],[0,0,0,2]],"score":-5,"playable":true}"#,
            r#"{"board":[[2,4,0,0],[0,0,0,0],[0,0,8,0],[0,0,0,2]],"playable":true}"#,
            r#"{"board":[[2,4,0,0],[0,0,0,0],[0,0,8,0],[0,0,0,2]],"score":0}"#,
            r#"{"score":0,"playable":true}"#,
            r#"{"board":[[2147483648,2147483648,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]],"score":0,"playable":true}"#,
            r#"{"board":[[262144,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]],"score":0,"playable":true}"#,
        ];
        for text in cases {
            assert!(decode_snapshot(text).is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested").join("state.json"));
        assert!(store.load().unwrap().is_none());

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));

        let over = SessionSnapshot { over: true, ..sample() };
        store.save(&over).unwrap();
        assert_eq!(store.load().unwrap(), Some(over));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn file_store_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{\"board\": 7}").unwrap();
        let mut store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn memory_store_counts() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(&sample()).unwrap();
        store.save(&sample()).unwrap();
        assert_eq!(store.saves(), 2);
        assert_eq!(store.loads(), 1);
        assert_eq!(store.load().unwrap(), Some(sample()));

        let mut junk = MemoryStore::with_contents("[]");
        assert!(junk.load().is_err());
    }
}
