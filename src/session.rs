//! A game bound to a snapshot store.
//!
//! The store is read once, when the session starts, and written once after
//! every executed turn and every new game. A saved snapshot that cannot be
//! read is logged and replaced by a new game.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::Rng;

use crate::engine::Direction;
use crate::game::{Game, Rules, SessionSnapshot};
use crate::input;
use crate::store::{SnapshotStore, StoreError};

pub struct Session<S, R = StdRng> {
    game: Game<R>,
    store: S,
}

impl<S: SnapshotStore, R: Rng> Session<S, R> {
    /// Resume the stored game, or start a new one if nothing usable is stored.
    ///
    /// ```
    /// use puzzle_2048::game::Rules;
    /// use puzzle_2048::session::Session;
    /// use puzzle_2048::store::MemoryStore;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let rng = StdRng::seed_from_u64(1);
    /// let mut session = Session::start(MemoryStore::new(), rng, Rules::default()).unwrap();
    /// assert_eq!(session.store().saves(), 1);
    /// assert!(session.handle_key("Escape").unwrap().is_none());
    /// assert!(session.handle_key("ArrowLeft").unwrap().is_some());
    /// assert_eq!(session.store().saves(), 2);
    /// ```
    pub fn start(mut store: S, rng: R, rules: Rules) -> Result<Self, StoreError> {
        let loaded = match store.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("discarding saved game: {e}");
                None
            }
        };
        match loaded {
            Some(snapshot) => {
                info!("resumed game: score {}, over: {}", snapshot.score, snapshot.over);
                let game = Game::from_snapshot(snapshot, rng, rules);
                Ok(Session { game, store })
            }
            None => {
                let game = Game::new(rng, rules);
                let mut session = Session { game, store };
                session.save()?;
                Ok(session)
            }
        }
    }

    pub fn new_game(&mut self) -> Result<SessionSnapshot, StoreError> {
        self.game.new_game();
        self.save()
    }

    /// Play `direction`, saving only if a turn was actually executed.
    pub fn apply_direction(&mut self, direction: Direction) -> Result<SessionSnapshot, StoreError> {
        match self.game.turn(direction) {
            Some(_) => self.save(),
            None => Ok(self.game.snapshot()),
        }
    }

    /// Play the direction bound to `key`; unknown keys return `Ok(None)`.
    pub fn handle_key(&mut self, key: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        match input::direction_for_key(key) {
            Some(direction) => self.apply_direction(direction).map(Some),
            None => Ok(None),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.game.snapshot()
    }

    pub fn game(&self) -> &Game<R> {
        &self.game
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn save(&mut self) -> Result<SessionSnapshot, StoreError> {
        let snapshot = self.game.snapshot();
        self.store.save(&snapshot)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Board;
    use crate::store::{encode_snapshot, MemoryStore};
    use rand::SeedableRng;
    use std::io;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    fn stored(rows: [[u32; 4]; 4], score: u64, over: bool) -> MemoryStore {
        let snap = SessionSnapshot { board: Board::from_rows(rows).unwrap(), score, over };
        MemoryStore::with_contents(encode_snapshot(&snap).unwrap())
    }

    #[test]
    fn empty_store_starts_and_saves_new_game() {
        let session = Session::start(MemoryStore::new(), rng(), Rules::default()).unwrap();
        let store = session.store();
        assert_eq!(store.loads(), 1);
        assert_eq!(store.saves(), 1);
        let snap = session.snapshot();
        assert_eq!(snap.score, 0);
        assert!(!snap.over);
        assert_eq!(snap.board.count_empty(), 14);
    }

    #[test]
    fn corrupt_store_falls_back_to_new_game() {
        let cases = [
            "{",
            r#"{"board":[[3,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]],"score":5,"playable":true}"#,
            r#"{"board":[[2147483648,2147483648,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]],"score":0,"playable":true}"#,
            r#"{"board":[[262144,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]],"score":0,"playable":true}"#,
        ];
        for junk in cases {
            let store = MemoryStore::with_contents(junk);
            let session = Session::start(store, rng(), Rules::default()).unwrap();
            assert_eq!(session.store().saves(), 1);
            assert_eq!(session.snapshot().score, 0);
            assert_eq!(session.snapshot().board.count_empty(), 14);
        }
    }

    /// Store whose reads always fail with an IO error.
    struct UnreadableStore(MemoryStore);

    impl SnapshotStore for UnreadableStore {
        fn load(&mut self) -> Result<Option<SessionSnapshot>, StoreError> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "state file locked").into())
        }

        fn save(&mut self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
            self.0.save(snapshot)
        }
    }

    #[test]
    fn unreadable_store_falls_back_to_new_game() {
        let mut session =
            Session::start(UnreadableStore(MemoryStore::new()), rng(), Rules::default()).unwrap();
        assert_eq!(session.store().0.saves(), 1);
        let snap = session.snapshot();
        assert_eq!(snap.score, 0);
        assert!(!snap.over);
        assert_eq!(snap.board.count_empty(), 14);
        assert_eq!(session.store().0.contents(), Some(encode_snapshot(&snap).unwrap().as_str()));

        session.apply_direction(Direction::Left).unwrap();
        assert_eq!(session.store().0.saves(), 2);
    }

    #[test]
    fn valid_store_resumes_without_saving() {
        let store = stored([[2, 2, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]], 48, false);
        let mut session = Session::start(store, rng(), Rules::default()).unwrap();
        assert_eq!(session.store().saves(), 0);
        assert_eq!(session.snapshot().score, 48);

        let snap = session.apply_direction(Direction::Left).unwrap();
        assert_eq!(snap.score, 52);
        assert_eq!(snap.board.get(0, 0), 4);
        assert_eq!(session.store().saves(), 1);
        assert_eq!(session.store().loads(), 1);
    }

    #[test]
    fn every_turn_saves_once_and_unknown_keys_do_nothing() {
        let mut session = Session::start(MemoryStore::new(), rng(), Rules::default()).unwrap();
        let before = session.snapshot();
        for key in ["Enter", "x", "Shift"] {
            assert_eq!(session.handle_key(key).unwrap(), None);
        }
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.store().saves(), 1);

        let mut turns = 0;
        for key in ["ArrowLeft", "ArrowUp", "ArrowRight", "ArrowDown"] {
            if session.snapshot().over {
                break;
            }
            let snap = session.handle_key(key).unwrap().unwrap();
            turns += 1;
            assert_eq!(session.store().contents(), Some(encode_snapshot(&snap).unwrap().as_str()));
        }
        assert_eq!(session.store().saves(), 1 + turns);
    }

    #[test]
    fn finished_game_ignores_moves_but_allows_new_game() {
        let store = stored([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]], 120, false);
        let mut session = Session::start(store, rng(), Rules::default()).unwrap();
        assert!(session.snapshot().over);

        let snap = session.apply_direction(Direction::Down).unwrap();
        assert!(snap.over);
        assert_eq!(snap.score, 120);
        assert_eq!(session.store().saves(), 0);

        let fresh = session.new_game().unwrap();
        assert!(!fresh.over);
        assert_eq!(fresh.score, 0);
        assert_eq!(session.store().saves(), 1);
    }

    #[test]
    fn strict_policy_skips_saving_noop_moves() {
        let rules = Rules { spawn_on_noop: false, ..Rules::default() };
        let store = stored([[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]], 0, false);
        let mut session = Session::start(store, rng(), rules).unwrap();
        session.apply_direction(Direction::Left).unwrap();
        session.apply_direction(Direction::Up).unwrap();
        assert_eq!(session.store().saves(), 0);
        session.apply_direction(Direction::Right).unwrap();
        assert_eq!(session.store().saves(), 1);
    }
}
