//! Game state and turn orchestration.
//!
//! A [`Game`] owns the board, the cumulative score and the active/over
//! status. One turn is: shift the board, spawn one tile, re-check whether any
//! move is left. Randomness comes only from the RNG the game was built with,
//! so a seeded `StdRng` gives fully reproducible games.
//!
//! ```
//! use puzzle_2048::engine::Direction;
//! use puzzle_2048::game::{Game, Rules};
//!
//! let mut game = Game::seeded(42, Rules::default());
//! assert_eq!(game.board().count_empty(), 14);
//! let snap = game.apply_direction(Direction::Left);
//! assert!(!snap.over);
//! ```

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::engine::{Board, Direction, MergeRule, Score};

/// Gameplay rules that can be chosen per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub merge: MergeRule,
    /// Spawn (and count as a turn) even when the move did not change the board.
    #[serde(default = "defaults::spawn_on_noop")]
    pub spawn_on_noop: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self { merge: MergeRule::default(), spawn_on_noop: defaults::spawn_on_noop() }
    }
}

mod defaults {
    pub fn spawn_on_noop() -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    /// No move can change the board. Only `new_game` leaves this state.
    Over,
}

/// Immutable view of a game after a turn, handed to renderers and stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub board: Board,
    pub score: Score,
    pub over: bool,
}

/// What a single executed turn did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    pub direction: Direction,
    pub score_delta: Score,
    /// Whether the shift itself moved or merged anything.
    pub changed: bool,
    /// Cell that received the new tile, if any was free.
    pub spawned: Option<(usize, usize)>,
}

pub struct Game<R = StdRng> {
    board: Board,
    score: Score,
    status: Status,
    rules: Rules,
    rng: R,
    last_turn: Option<TurnReport>,
}

impl Game<StdRng> {
    /// Start a fresh game with a deterministic RNG.
    pub fn seeded(seed: u64, rules: Rules) -> Self {
        Game::new(StdRng::seed_from_u64(seed), rules)
    }

    /// Start a fresh game seeded from OS entropy.
    pub fn from_entropy(rules: Rules) -> Self {
        Game::new(StdRng::from_entropy(), rules)
    }
}

impl<R: Rng> Game<R> {
    /// Start a fresh game: empty board plus two spawned tiles.
    pub fn new(rng: R, rules: Rules) -> Self {
        let mut game = Game {
            board: Board::EMPTY,
            score: 0,
            status: Status::Active,
            rules,
            rng,
            last_turn: None,
        };
        game.new_game();
        game
    }

    /// Resume from a saved snapshot.
    ///
    /// A restored board with no legal move is treated as over even if the
    /// snapshot claims otherwise.
    pub fn from_snapshot(snapshot: SessionSnapshot, rng: R, rules: Rules) -> Self {
        let over = snapshot.over || snapshot.board.is_game_over();
        Game {
            board: snapshot.board,
            score: snapshot.score,
            status: if over { Status::Over } else { Status::Active },
            rules,
            rng,
            last_turn: None,
        }
    }

    /// Reset to an empty board, spawn two tiles, zero the score.
    pub fn new_game(&mut self) -> SessionSnapshot {
        self.board = Board::EMPTY;
        self.board.spawn(&mut self.rng);
        self.board.spawn(&mut self.rng);
        self.score = 0;
        self.status = Status::Active;
        self.last_turn = None;
        info!("new game started");
        self.snapshot()
    }

    /// Play one turn in `direction` and return the resulting snapshot.
    ///
    /// Ignored once the game is over; see [`Game::turn`].
    pub fn apply_direction(&mut self, direction: Direction) -> SessionSnapshot {
        self.turn(direction);
        self.snapshot()
    }

    /// Play one turn, returning `None` when nothing was executed.
    ///
    /// Nothing runs when the game is over, or when the move does not change
    /// the board and `Rules::spawn_on_noop` is off.
    pub fn turn(&mut self, direction: Direction) -> Option<TurnReport> {
        if self.status == Status::Over {
            debug!("ignoring {direction}: game is over");
            return None;
        }

        let shifted = self.board.shift(direction, self.rules.merge);
        let changed = shifted.board != self.board;
        if !changed && !self.rules.spawn_on_noop {
            debug!("ignoring {direction}: board unchanged");
            return None;
        }

        self.board = shifted.board;
        self.score += shifted.score;
        let spawned = self.board.spawn(&mut self.rng);

        if !self.board.has_move() {
            self.status = Status::Over;
            info!("game over: score {}, highest tile {}", self.score, self.board.highest_tile());
        }

        let report = TurnReport { direction, score_delta: shifted.score, changed, spawned };
        debug!("turn {direction}: +{} (changed: {changed}, spawned: {spawned:?})", shifted.score);
        self.last_turn = Some(report);
        Some(report)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot { board: self.board, score: self.score, over: self.is_over() }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.status == Status::Over
    }

    /// Report for the most recent executed turn since the last `new_game`.
    #[inline]
    pub fn last_turn(&self) -> Option<TurnReport> {
        self.last_turn
    }
}
