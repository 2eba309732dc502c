use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ops::{self, MergeRule, Shifted};
use super::{MAX_TILE, SIZE};

/// Value of a single cell: `0` when empty, otherwise a power of two >= 2.
pub type Tile = u32;
/// Cumulative or per-move score.
pub type Score = u64;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Unit of decomposition used when a direction is applied to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Rows,
    Columns,
}

/// End of a line that tiles accumulate toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Index 0 (left for rows, top for columns).
    Near,
    /// Last index (right for rows, bottom for columns).
    Far,
}

impl Direction {
    /// All four directions in a fixed order.
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// The `(axis, bias)` pair this direction stands for.
    #[inline]
    pub const fn parts(self) -> (Axis, Bias) {
        match self {
            Direction::Left => (Axis::Rows, Bias::Near),
            Direction::Right => (Axis::Rows, Bias::Far),
            Direction::Up => (Axis::Columns, Bias::Near),
            Direction::Down => (Axis::Columns, Bias::Far),
        }
    }

    /// Whether rows or columns are compacted.
    #[inline]
    pub const fn axis(self) -> Axis {
        self.parts().0
    }

    #[inline]
    pub const fn bias(self) -> Bias {
        self.parts().1
    }

    /// Lowercase symbol, as accepted by `FromStr`.
    pub const fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction {0:?}; expected one of up, down, left, right")]
pub struct ParseDirectionError(pub String);

/// Strict parse of the four direction symbols (case-insensitive).
///
/// Anything else is rejected rather than mapped to a default.
impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Reasons a grid is not a legal board.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("expected {expected} rows, found {0}", expected = SIZE)]
    RowCount(usize),
    #[error("row {row} has {len} cells, expected {expected}", expected = SIZE)]
    RowLength { row: usize, len: usize },
    #[error(
        "cell ({row}, {col}) holds {value}, which is not empty or a power of two in 2..={max}",
        max = MAX_TILE
    )]
    InvalidTile { row: usize, col: usize, value: Tile },
}

/// True for `0` (empty) and for powers of two from 2 up to [`MAX_TILE`].
#[inline]
pub fn is_valid_tile(value: Tile) -> bool {
    value == 0 || ((2..=MAX_TILE).contains(&value) && value.is_power_of_two())
}

/// A `SIZE`x`SIZE` grid of tile values, row-major.
///
/// Boards are small `Copy` values; every operation that changes the grid
/// either returns a new board or takes `&mut self`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Tile>>", into = "Vec<Vec<Tile>>")]
pub struct Board([[Tile; SIZE]; SIZE]);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    /// Build a board from rows, rejecting any cell that is not a legal tile.
    ///
    /// ```
    /// use puzzle_2048::engine::Board;
    /// let b = Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap();
    /// assert_eq!(b.count_empty(), 14);
    /// assert!(Board::from_rows([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_rows(rows: [[Tile; SIZE]; SIZE]) -> Result<Self, BoardError> {
        for (row, cells) in rows.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
            }
        }
        Ok(Board(rows))
    }

    /// Borrow the rows of this board.
    #[inline]
    pub fn rows(&self) -> &[[Tile; SIZE]; SIZE] {
        &self.0
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.0[row][col]
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: Tile) {
        debug_assert!(is_valid_tile(value));
        self.0[row][col] = value;
    }

    #[inline]
    pub fn row(&self, idx: usize) -> [Tile; SIZE] {
        self.0[idx]
    }

    /// Column `idx`, top to bottom.
    #[inline]
    pub fn column(&self, idx: usize) -> [Tile; SIZE] {
        std::array::from_fn(|r| self.0[r][idx])
    }

    #[inline]
    pub(crate) fn set_row(&mut self, idx: usize, line: [Tile; SIZE]) {
        self.0[idx] = line;
    }

    #[inline]
    pub(crate) fn set_column(&mut self, idx: usize, line: [Tile; SIZE]) {
        for (r, value) in line.into_iter().enumerate() {
            self.0[r][idx] = value;
        }
    }

    /// Coordinates of every empty cell in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::with_capacity(SIZE * SIZE);
        for (r, row) in self.0.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if value == 0 {
                    cells.push((r, c));
                }
            }
        }
        cells
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(&self) -> usize {
        self.0.iter().flatten().filter(|&&v| v == 0).count()
    }

    /// Return the highest tile value present on the board (0 when empty).
    #[inline]
    pub fn highest_tile(&self) -> Tile {
        self.0.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values.
    #[inline]
    pub fn tile_sum(&self) -> u64 {
        self.0.iter().flatten().map(|&v| u64::from(v)).sum()
    }

    /// Slide/merge tiles in `dir` (no random insert).
    ///
    /// ```
    /// use puzzle_2048::engine::{Board, Direction, MergeRule};
    /// let b = Board::from_rows([[0, 0, 2, 2], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// let out = b.shift(Direction::Right, MergeRule::Cascade);
    /// assert_eq!(out.board.row(0), [0, 0, 0, 4]);
    /// assert_eq!(out.score, 4);
    /// ```
    #[inline]
    pub fn shift(self, dir: Direction, rule: MergeRule) -> Shifted {
        ops::shift(self, dir, rule)
    }

    /// Place a 2 on a uniformly chosen empty cell, using the provided RNG.
    ///
    /// Returns the cell that was filled, or `None` if the board is full.
    #[inline]
    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(usize, usize)> {
        ops::spawn(self, rng)
    }

    /// Like [`Board::spawn`] but by value, for chaining.
    ///
    /// ```
    /// use puzzle_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        ops::spawn(&mut self, rng);
        self
    }

    /// True if some move could still change the board.
    #[inline]
    pub fn has_move(&self) -> bool {
        ops::has_move(self)
    }

    /// Return true if no legal moves remain.
    #[inline]
    pub fn is_game_over(&self) -> bool {
        !ops::has_move(self)
    }
}

impl TryFrom<Vec<Vec<Tile>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<Tile>>) -> Result<Self, Self::Error> {
        if rows.len() != SIZE {
            return Err(BoardError::RowCount(rows.len()));
        }
        let mut grid = [[0; SIZE]; SIZE];
        for (r, cells) in rows.into_iter().enumerate() {
            grid[r] = cells
                .try_into()
                .map_err(|cells: Vec<Tile>| BoardError::RowLength { row: r, len: cells.len() })?;
        }
        Board::from_rows(grid)
    }
}

impl From<Board> for Vec<Vec<Tile>> {
    fn from(b: Board) -> Self {
        b.0.iter().map(|row| row.to_vec()).collect()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.0)
    }
}

const CELL_WIDTH: usize = 7;

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(SIZE * (CELL_WIDTH + 1));
        writeln!(f)?;
        for (r, row) in self.0.iter().enumerate() {
            if r > 0 {
                writeln!(f, "{rule}")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(val: Tile) -> String {
    match val {
        0 => " ".repeat(CELL_WIDTH),
        x => format!("{:^width$}", x, width = CELL_WIDTH),
    }
}
