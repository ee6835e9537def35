//! The Sudoku-to-exact-cover reduction: a thin collaborator that
//! builds the 324-column matrix for a 9×9 grid and decodes solutions back
//! into digits. Everything here is ordinary application logic sitting on
//! top of [`crate::dlx`] and [`crate::search`] — no part of the DLX engine
//! itself knows that Sudoku exists.

use std::collections::HashSet;
use std::hash::Hash;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::dlx::{build_matrix, Matrix};
use crate::error::DlxError;

/// A 9×9 Sudoku grid. `0` marks an empty cell; `1..=9` are given or solved
/// digits.
pub type Grid = [[u8; 9]; 9];

const BAND: usize = 81;
const NUM_CONSTRAINTS: usize = 4 * BAND;

/// A Sudoku puzzle, validated at construction time so the DLX engine is
/// never handed a matrix built from a grid that is already contradictory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sudoku {
    grid: Grid,
}

impl Sudoku {
    /// Validates `grid`'s shape and given clues, returning `InvalidInput` if
    /// any digit is out of `0..=9` or if two given clues already conflict
    /// on a row, column, or box.
    pub fn new(grid: Grid) -> Result<Self, DlxError> {
        for (r, row) in grid.iter().enumerate() {
            for (c, &digit) in row.iter().enumerate() {
                if digit > 9 {
                    warn!("Sudoku::new: cell ({r},{c}) has out-of-range digit {digit}");
                    return Err(DlxError::InvalidInput(format!(
                        "cell ({r}, {c}) has out-of-range digit {digit}; expected 0..=9"
                    )));
                }
            }
        }
        if !is_valid(&grid, None) {
            warn!("Sudoku::new: given clues already violate row/column/box uniqueness");
            return Err(DlxError::InvalidInput(
                "given clues already violate row, column, or box uniqueness".into(),
            ));
        }

        Ok(Self { grid })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_solved(&self) -> bool {
        is_solved(&self.grid)
    }

    /// Encodes, solves, and decodes in one call. Returns `None` if the
    /// puzzle has no solution.
    pub fn solve_first(&self) -> Result<Option<Grid>, DlxError> {
        let (mut matrix, mapping) = sudoku_encode(&self.grid)?;
        Ok(matrix.solve_first()?.map(|ids| sudoku_decode(&ids, &mapping)))
    }

    /// Encodes, solves, and decodes every solution, invoking `sink` with
    /// each completed grid.
    pub fn solve_all(&self, mut sink: impl FnMut(Grid)) -> Result<(), DlxError> {
        let (mut matrix, mapping) = sudoku_encode(&self.grid)?;
        matrix.solve_all(|ids| sink(sudoku_decode(&ids, &mapping)));
        Ok(())
    }
}

/// Builds the 324-column exact-cover matrix for `grid`, returning it
/// alongside the `option_id -> (row, col, digit)` table needed to decode a
/// solution. Given cells contribute exactly one option; empty cells
/// contribute nine, one per candidate digit.
pub fn sudoku_encode(grid: &Grid) -> Result<(Matrix, Vec<(usize, usize, u8)>), DlxError> {
    let mut options = Vec::with_capacity(9 * 9 * 9);
    let mut mapping = Vec::with_capacity(9 * 9 * 9);

    for (r, row) in grid.iter().enumerate() {
        for (c, &given) in row.iter().enumerate() {
            if given > 9 {
                return Err(DlxError::InvalidInput(format!(
                    "cell ({r}, {c}) has out-of-range digit {given}; expected 0..=9"
                )));
            }

            let candidates: &[u8] = if given == 0 {
                &[1, 2, 3, 4, 5, 6, 7, 8, 9]
            } else {
                std::slice::from_ref(&given)
            };
            for &d in candidates {
                let digit_idx = (d - 1) as usize;
                let b = (r / 3) * 3 + (c / 3);
                options.push(vec![
                    r * 9 + c,                    // cell band: exactly one digit in (r, c)
                    BAND + r * 9 + digit_idx,      // row-digit band
                    2 * BAND + c * 9 + digit_idx,  // column-digit band
                    3 * BAND + b * 9 + digit_idx,  // box-digit band
                ]);
                mapping.push((r, c, d));
            }
        }
    }

    let matrix = build_matrix(&options, NUM_CONSTRAINTS)?;
    debug!(
        "sudoku_encode: {} candidate placements over {NUM_CONSTRAINTS} constraints",
        options.len()
    );
    Ok((matrix, mapping))
}

/// Maps a solution's option-ids back through `mapping` onto a solved grid.
pub fn sudoku_decode(solution: &[usize], mapping: &[(usize, usize, u8)]) -> Grid {
    let mut grid: Grid = [[0; 9]; 9];
    for &id in solution {
        let (r, c, d) = mapping[id];
        grid[r][c] = d;
    }
    grid
}

/// Checks default Sudoku constraints: all numbers in the same row, column,
/// and 3×3 box are unique. If `pos` is `Some((r, c))`, only the row,
/// column, and box touching that cell are checked.
pub fn is_valid(grid: &Grid, pos: Option<(usize, usize)>) -> bool {
    match pos {
        Some((r, c)) => check_row(grid, r) && check_col(grid, c) && check_box(grid, r / 3, c / 3),
        None => {
            (0..9).all(|r| check_row(grid, r))
                && (0..9).all(|c| check_col(grid, c))
                && (0..3).all(|br| (0..3).all(|bc| check_box(grid, br, bc)))
        }
    }
}

pub fn is_solved(grid: &Grid) -> bool {
    grid.iter().flatten().all(|&v| v != 0)
}

fn check_row(grid: &Grid, r: usize) -> bool {
    has_unique_items(grid[r].iter().copied().filter(|&x| x != 0))
}

fn check_col(grid: &Grid, c: usize) -> bool {
    has_unique_items(grid.iter().map(|row| row[c]).filter(|&x| x != 0))
}

fn check_box(grid: &Grid, br: usize, bc: usize) -> bool {
    has_unique_items(
        grid.iter()
            .skip(br * 3)
            .take(3)
            .flat_map(|row| row.iter().skip(bc * 3).take(3).copied())
            .filter(|&x| x != 0),
    )
}

pub fn has_unique_items<T>(iter: impl IntoIterator<Item = T>) -> bool
where
    T: Eq + Hash,
{
    let mut seen = HashSet::new();
    iter.into_iter().all(|x| seen.insert(x))
}
