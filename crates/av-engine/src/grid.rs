//! 5×5 symbol grid with gravity
//!
//! Cells are stored row-major: row 0 is the top, column 0 the left edge.
//! The grid knows nothing about game rules beyond "empty" vs "occupied".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cellset::CellSet;
use crate::error::{EngineError, EngineResult};
use crate::rng::RandomSource;
use crate::symbols::Symbol;
use crate::weights::WeightTable;

/// Number of rows
pub const ROWS: usize = 5;
/// Number of columns
pub const COLS: usize = 5;
/// Total cell count
pub const CELL_COUNT: usize = ROWS * COLS;

// ═══════════════════════════════════════════════════════════════════════════════
// POSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// A validated grid coordinate
///
/// Holding a `Position` means the coordinate is on the grid, so cell access
/// through it cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "(usize, usize)", try_from = "(usize, usize)")]
pub struct Position(u8);

impl Position {
    /// Validate a `(row, col)` pair
    pub fn new(row: usize, col: usize) -> EngineResult<Self> {
        if row < ROWS && col < COLS {
            Ok(Self((row * COLS + col) as u8))
        } else {
            Err(EngineError::OutOfBounds { row, col })
        }
    }

    /// Position from a row-major index
    pub fn from_index(index: usize) -> Option<Self> {
        (index < CELL_COUNT).then_some(Self(index as u8))
    }

    /// All positions in row-major order
    pub fn all() -> impl Iterator<Item = Position> {
        (0..CELL_COUNT as u8).map(Position)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn row(self) -> usize {
        self.0 as usize / COLS
    }

    #[inline(always)]
    pub const fn col(self) -> usize {
        self.0 as usize % COLS
    }

    /// Orthogonal neighbours (up, down, left, right), clipped to the grid
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        let (row, col) = (self.row(), self.col());
        let up = (row > 0).then(|| Self(self.0 - COLS as u8));
        let down = (row + 1 < ROWS).then(|| Self(self.0 + COLS as u8));
        let left = (col > 0).then(|| Self(self.0 - 1));
        let right = (col + 1 < COLS).then(|| Self(self.0 + 1));
        [up, down, left, right].into_iter().flatten()
    }

    /// Square area of the given radius centred here, clipped to the grid.
    /// Row-major order.
    pub fn area(self, radius: usize) -> Vec<Position> {
        let row_lo = self.row().saturating_sub(radius);
        let row_hi = self.row().saturating_add(radius).min(ROWS - 1);
        let col_lo = self.col().saturating_sub(radius);
        let col_hi = self.col().saturating_add(radius).min(COLS - 1);

        let mut cells = Vec::with_capacity((row_hi - row_lo + 1) * (col_hi - col_lo + 1));
        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                cells.push(Self((row * COLS + col) as u8));
            }
        }
        cells
    }
}

impl From<Position> for (usize, usize) {
    fn from(pos: Position) -> Self {
        (pos.row(), pos.col())
    }
}

impl TryFrom<(usize, usize)> for Position {
    type Error = EngineError;

    fn try_from((row, col): (usize, usize)) -> EngineResult<Self> {
        Position::new(row, col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SYMBOL COUNTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Occurrence count per symbol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolCounts([usize; Symbol::COUNT]);

impl SymbolCounts {
    pub fn get(&self, symbol: Symbol) -> usize {
        self.0[symbol.index()]
    }

    /// Non-zero entries in symbol order
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, usize)> + '_ {
        Symbol::ALL
            .iter()
            .map(|&s| (s, self.0[s.index()]))
            .filter(|&(_, n)| n > 0)
    }

    /// Occupied cells
    pub fn occupied(&self) -> usize {
        CELL_COUNT - self.get(Symbol::Empty)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GRID
// ═══════════════════════════════════════════════════════════════════════════════

/// The 5×5 playing field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    cells: [Symbol; CELL_COUNT],
}

impl Grid {
    /// Empty grid
    pub fn new() -> Self {
        Self {
            cells: [Symbol::Empty; CELL_COUNT],
        }
    }

    /// Grid from explicit rows (top row first)
    pub fn from_rows(rows: [[Symbol; COLS]; ROWS]) -> Self {
        let mut grid = Self::new();
        for (r, row) in rows.iter().enumerate() {
            grid.cells[r * COLS..(r + 1) * COLS].copy_from_slice(row);
        }
        grid
    }

    /// Grid restored from a serialized state
    pub fn from_state<S: AsRef<str>>(state: &[S]) -> EngineResult<Self> {
        let mut grid = Self::new();
        grid.load_state(state)?;
        Ok(grid)
    }

    // ─── Cell access ────────────────────────────────────────────────────────────

    /// Symbol at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> EngineResult<Symbol> {
        Ok(self.at(Position::new(row, col)?))
    }

    /// Write `symbol` at `(row, col)`
    pub fn set(&mut self, row: usize, col: usize, symbol: Symbol) -> EngineResult<()> {
        self.put(Position::new(row, col)?, symbol);
        Ok(())
    }

    /// Whether `(row, col)` is empty
    pub fn is_empty_at(&self, row: usize, col: usize) -> EngineResult<bool> {
        Ok(self.get(row, col)?.is_empty())
    }

    #[inline(always)]
    pub fn at(&self, pos: Position) -> Symbol {
        self.cells[pos.index()]
    }

    #[inline(always)]
    pub fn put(&mut self, pos: Position, symbol: Symbol) {
        self.cells[pos.index()] = symbol;
    }

    /// Raw row-major cells
    pub fn cells(&self) -> &[Symbol; CELL_COUNT] {
        &self.cells
    }

    /// Symbols of one row, left to right
    pub fn row(&self, row: usize) -> EngineResult<[Symbol; COLS]> {
        if row >= ROWS {
            return Err(EngineError::OutOfBounds { row, col: 0 });
        }
        let mut out = [Symbol::Empty; COLS];
        out.copy_from_slice(&self.cells[row * COLS..(row + 1) * COLS]);
        Ok(out)
    }

    /// Symbols of one column, top to bottom
    pub fn column(&self, col: usize) -> EngineResult<[Symbol; ROWS]> {
        if col >= COLS {
            return Err(EngineError::OutOfBounds { row: 0, col });
        }
        Ok(std::array::from_fn(|row| self.cells[row * COLS + col]))
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.cells = [Symbol::Empty; CELL_COUNT];
    }

    /// Empty the given cells
    pub fn remove_positions(&mut self, positions: impl IntoIterator<Item = Position>) {
        for pos in positions {
            self.put(pos, Symbol::Empty);
        }
    }

    // ─── Queries ────────────────────────────────────────────────────────────────

    /// Occurrences of every symbol
    pub fn count_symbols(&self) -> SymbolCounts {
        let mut counts = [0usize; Symbol::COUNT];
        for symbol in &self.cells {
            counts[symbol.index()] += 1;
        }
        SymbolCounts(counts)
    }

    /// Occurrences of one symbol
    pub fn count(&self, symbol: Symbol) -> usize {
        self.cells.iter().filter(|&&s| s == symbol).count()
    }

    /// Positions holding `symbol`, row-major
    pub fn find_all(&self, symbol: Symbol) -> Vec<Position> {
        Position::all().filter(|&p| self.at(p) == symbol).collect()
    }

    /// Cells whose symbol satisfies `pred`
    pub fn select(&self, pred: impl Fn(Symbol) -> bool) -> CellSet {
        Position::all().filter(|&p| pred(self.at(p))).collect()
    }

    pub fn empty_count(&self) -> usize {
        self.count(Symbol::Empty)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|s| !s.is_empty())
    }

    // ─── Gravity & drops ────────────────────────────────────────────────────────

    /// Let symbols fall to the bottom of their column.
    ///
    /// Columns are processed independently; relative top-to-bottom order is
    /// preserved and already-compacted columns are not rewritten. Returns
    /// whether any symbol moved.
    pub fn apply_gravity(&mut self) -> bool {
        let mut moved = false;

        for col in 0..COLS {
            let mut stack = [Symbol::Empty; ROWS];
            let mut filled = 0;
            let mut top = ROWS;

            for row in 0..ROWS {
                let symbol = self.cells[row * COLS + col];
                if symbol.is_empty() {
                    continue;
                }
                if filled == 0 {
                    top = row;
                }
                stack[filled] = symbol;
                filled += 1;
            }

            // k occupied cells starting at row ROWS - k are already resting
            let offset = ROWS - filled;
            if filled == 0 || top == offset {
                continue;
            }

            for row in 0..ROWS {
                self.cells[row * COLS + col] = if row < offset {
                    Symbol::Empty
                } else {
                    stack[row - offset]
                };
            }
            moved = true;
        }

        moved
    }

    /// Fill every cell with a freshly generated symbol (row-major draws)
    pub fn fill_all<R: RandomSource>(
        &mut self,
        weights: &WeightTable,
        rng: &mut R,
    ) -> EngineResult<usize> {
        for cell in self.cells.iter_mut() {
            *cell = weights.sample(rng)?;
        }
        Ok(CELL_COUNT)
    }

    /// Fill only empty cells (row-major draws). Returns the number dropped.
    pub fn fill_empty<R: RandomSource>(
        &mut self,
        weights: &WeightTable,
        rng: &mut R,
    ) -> EngineResult<usize> {
        let mut dropped = 0;
        for cell in self.cells.iter_mut() {
            if cell.is_empty() {
                *cell = weights.sample(rng)?;
                dropped += 1;
            }
        }
        Ok(dropped)
    }

    // ─── State capture ──────────────────────────────────────────────────────────

    /// Flat row-major list of symbol identifiers; empty cells are `""`
    pub fn to_state(&self) -> Vec<String> {
        self.cells.iter().map(|s| s.id().to_string()).collect()
    }

    /// Replace contents from a state produced by [`Grid::to_state`].
    ///
    /// Rejects wrong lengths and unknown identifiers; on error the grid is
    /// left untouched.
    pub fn load_state<S: AsRef<str>>(&mut self, state: &[S]) -> EngineResult<()> {
        if state.len() != CELL_COUNT {
            return Err(EngineError::InvalidGridState(format!(
                "expected {CELL_COUNT} cells, got {}",
                state.len()
            )));
        }
        let mut cells = [Symbol::Empty; CELL_COUNT];
        for (cell, token) in cells.iter_mut().zip(state) {
            let token = token.as_ref();
            if !token.is_empty() {
                *cell = token.parse()?;
            }
        }
        self.cells = cells;
        Ok(())
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─────{}┐", "┬─────".repeat(COLS - 1))?;
        for row in 0..ROWS {
            write!(f, "│")?;
            for col in 0..COLS {
                write!(f, " {} │", self.cells[row * COLS + col].short_code())?;
            }
            writeln!(f, "  Row {row}")?;
            if row < ROWS - 1 {
                writeln!(f, "├─────{}┤", "┼─────".repeat(COLS - 1))?;
            }
        }
        writeln!(f, "└─────{}┘", "┴─────".repeat(COLS - 1))?;
        write!(f, "  ")?;
        for col in 0..COLS {
            write!(f, "Col{col}  ")?;
        }
        Ok(())
    }
}
