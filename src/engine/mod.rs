//! Board engine: line compaction, whole-board shifts, tile spawning and the
//! movability check.
//!
//! Everything here is pure except [`spawn`], which takes the caller's RNG.
//! The free functions mirror the `Board` methods.

mod board;
mod ops;

pub use board::{
    is_valid_tile, Axis, Bias, Board, BoardError, Direction, ParseDirectionError, Score, Tile,
};
pub use ops::{
    compact_line, has_move, is_game_over, shift, spawn, MergeRule, ParseMergeRuleError, Shifted,
};

/// Width and height of the board.
pub const SIZE: usize = 4;

/// The only value the spawner ever places.
pub const SPAWN_TILE: Tile = 2;

/// Largest tile a `SIZE`x`SIZE` board can hold. Merges that would pass it do not happen.
pub const MAX_TILE: Tile = 1 << 17;

/// Count the number of empty cells.
pub fn count_empty(board: &Board) -> usize {
    board.count_empty()
}
