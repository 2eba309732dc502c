//! puzzle-2048: the board engine of a sliding-tile merge puzzle
//!
//! This crate provides:
//! - A `Board` value type with the pure engine operations (`shift`, `spawn`, `has_move`, ...)
//! - A `Game` that runs whole turns (shift, spawn, game-over check) and keeps the score
//! - A `Session` that binds a game to a snapshot store (`store` module)
//! - Key mapping for front ends (`input` module) and TOML settings (`config` module)
//!
//! Quick start:
//! ```
//! use puzzle_2048::engine::{Board, Direction, MergeRule};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let b1 = b0.shift(Direction::Left, MergeRule::Cascade);
//! assert_eq!(b1.board.tile_sum(), b0.tile_sum());
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use puzzle_2048::engine::Direction;
//! use puzzle_2048::game::{Game, Rules};
//!
//! let mut game = Game::seeded(123, Rules::default());
//! let mut moves = 0u32;
//! while !game.is_over() && moves < 8 {
//!     game.apply_direction(Direction::ALL[moves as usize % 4]);
//!     moves += 1;
//! }
//! let _final_score = game.score();
//! assert!(moves > 0);
//! ```
//!
pub mod config;
pub mod engine;
pub mod game;
pub mod input;
pub mod session;
pub mod store;
