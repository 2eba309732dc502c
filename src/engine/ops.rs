use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::{Axis, Bias, Board, Direction, Score, Tile};
use super::{MAX_TILE, SIZE};

/// How equal neighbours combine while a line is compacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRule {
    /// Repeat left-fold passes until no adjacent pair is equal. Within a pass
    /// the running value keeps absorbing equal successors, and a later pass
    /// can merge a result again with its new neighbour.
    #[default]
    Cascade,
    /// One pass; a tile produced by a merge does not merge again in the same move.
    Single,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown merge rule {0:?}; expected cascade or single")]
pub struct ParseMergeRuleError(pub String);

impl FromStr for MergeRule {
    type Err = ParseMergeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cascade" => Ok(MergeRule::Cascade),
            "single" => Ok(MergeRule::Single),
            _ => Err(ParseMergeRuleError(s.to_string())),
        }
    }
}

/// Result of sliding a whole board in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shifted {
    pub board: Board,
    /// Sum of the values produced by every merge in this move.
    pub score: Score,
}

/// Collapse one line toward `bias`, returning the new line and the score it earned.
///
/// The output always has the same length as the input; zeros pad the end
/// opposite the bias.
///
/// ```
/// use puzzle_2048::engine::{compact_line, Bias, MergeRule};
/// assert_eq!(compact_line(&[2, 2, 4, 0], Bias::Near, MergeRule::Single), (vec![4, 4, 0, 0], 4));
/// assert_eq!(compact_line(&[2, 2, 4, 0], Bias::Near, MergeRule::Cascade), (vec![8, 0, 0, 0], 12));
/// assert_eq!(compact_line(&[0, 0, 2, 2], Bias::Far, MergeRule::Cascade), (vec![0, 0, 0, 4], 4));
/// ```
pub fn compact_line(line: &[Tile], bias: Bias, rule: MergeRule) -> (Vec<Tile>, Score) {
    let mut dense: Vec<Tile> = line.iter().copied().filter(|&v| v != 0).collect();
    if bias == Bias::Far {
        dense.reverse();
    }

    let mut score = 0;
    match rule {
        MergeRule::Cascade => {
            while has_mergeable_pair(&dense) {
                let (next, gained) = fold_pass(&dense);
                dense = next;
                score += gained;
            }
        }
        MergeRule::Single => {
            let (next, gained) = single_pass(&dense);
            dense = next;
            score += gained;
        }
    }

    let pad = line.len() - dense.len();
    match bias {
        Bias::Near => {
            dense.resize(line.len(), 0);
            (dense, score)
        }
        Bias::Far => {
            dense.reverse();
            let mut out = vec![0; pad];
            out.extend(dense);
            (out, score)
        }
    }
}

/// One left fold: the pending value absorbs the next value whenever they are equal.
fn fold_pass(dense: &[Tile]) -> (Vec<Tile>, Score) {
    let mut out = Vec::with_capacity(dense.len());
    let mut score = 0;
    let mut values = dense.iter().copied();
    let Some(mut pending) = values.next() else {
        return (out, score);
    };
    for value in values {
        match merged(pending, value) {
            Some(sum) => {
                pending = sum;
                score += Score::from(sum);
            }
            None => {
                out.push(pending);
                pending = value;
            }
        }
    }
    out.push(pending);
    (out, score)
}

fn single_pass(dense: &[Tile]) -> (Vec<Tile>, Score) {
    let mut out = Vec::with_capacity(dense.len());
    let mut score = 0;
    let mut idx = 0;
    while idx < dense.len() {
        let value = dense[idx];
        if let Some(sum) = dense.get(idx + 1).and_then(|&next| merged(value, next)) {
            out.push(sum);
            score += Score::from(sum);
            idx += 2;
        } else {
            out.push(value);
            idx += 1;
        }
    }
    (out, score)
}

/// Tile produced by merging `a` and `b`, or `None` if they cannot merge.
#[inline]
fn merged(a: Tile, b: Tile) -> Option<Tile> {
    if a != b {
        return None;
    }
    a.checked_mul(2).filter(|&sum| sum <= MAX_TILE)
}

/// True if two consecutive entries could merge, zeros included.
#[inline]
pub(crate) fn has_mergeable_pair(line: &[Tile]) -> bool {
    line.windows(2).any(|w| merged(w[0], w[1]).is_some())
}

/// Slide/merge every row or column of `board` in `direction`. No randomness.
pub fn shift(board: Board, direction: Direction, rule: MergeRule) -> Shifted {
    let axis = direction.axis();
    let bias = direction.bias();
    let mut out = board;
    let mut score = 0;
    for idx in 0..SIZE {
        let line = match axis {
            Axis::Rows => board.row(idx),
            Axis::Columns => board.column(idx),
        };
        let (compacted, gained) = compact_line(&line, bias, rule);
        let compacted = to_line(&compacted);
        match axis {
            Axis::Rows => out.set_row(idx, compacted),
            Axis::Columns => out.set_column(idx, compacted),
        }
        score += gained;
    }
    Shifted { board: out, score }
}

fn to_line(values: &[Tile]) -> [Tile; SIZE] {
    let mut line = [0; SIZE];
    line.copy_from_slice(values);
    line
}

/// Fill one uniformly chosen empty cell with a 2.
///
/// Returns the coordinates that were filled; a full board is left untouched.
pub fn spawn<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> Option<(usize, usize)> {
    let empty = board.empty_cells();
    if empty.is_empty() {
        return None;
    }
    let (row, col) = empty[rng.gen_range(0..empty.len())];
    board.set(row, col, super::SPAWN_TILE);
    Some((row, col))
}

/// True if the board has an empty cell or any row/column holds an adjacent mergeable pair.
pub fn has_move(board: &Board) -> bool {
    if board.count_empty() > 0 {
        return true;
    }
    (0..SIZE).any(|idx| {
        has_mergeable_pair(&board.row(idx)) || has_mergeable_pair(&board.column(idx))
    })
}

/// True if no move in any direction could change the board.
pub fn is_game_over(board: &Board) -> bool {
    !has_move(board)
}
