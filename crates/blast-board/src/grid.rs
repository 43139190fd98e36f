//! 2D grid of colored blocks.

use blast_core::{ColorIndex, InsertEdge, Position};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-size grid; each cell is empty or holds a palette index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Option<ColorIndex>>,
}

impl Board {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Fill `filled_rows` rows on the entry edge with random colors
    pub fn random_filled(
        rows: usize,
        cols: usize,
        filled_rows: usize,
        edge: InsertEdge,
        palette_len: usize,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut board = Self::new(rows, cols);
        let filled = filled_rows.min(rows);
        let row_range = match edge {
            InsertEdge::Top => 0..filled,
            InsertEdge::Bottom => rows - filled..rows,
        };

        for row in row_range {
            for col in 0..cols {
                board.set(Position::new(row, col), Some(random_color(rng, palette_len)));
            }
        }

        board
    }

    /// Build a board from literal rows. All rows must share one width.
    pub fn from_rows(rows: Vec<Vec<Option<u8>>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let cells = rows
            .into_iter()
            .flat_map(|row| {
                assert_eq!(row.len(), width, "ragged board rows");
                row.into_iter().map(|cell| cell.map(ColorIndex))
            })
            .collect();

        Self {
            rows: height,
            cols: width,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Cell contents; out-of-bounds positions read as empty
    pub fn get(&self, pos: Position) -> Option<ColorIndex> {
        if self.in_bounds(pos) {
            self.cells[self.pos_to_index(pos)]
        } else {
            None
        }
    }

    /// Callers inside the crate only ever pass in-bounds positions
    pub(crate) fn set(&mut self, pos: Position, cell: Option<ColorIndex>) {
        let index = self.pos_to_index(pos);
        self.cells[index] = cell;
    }

    /// Empty a cell, returning what it held. Out-of-bounds positions hold nothing.
    pub fn clear(&mut self, pos: Position) -> Option<ColorIndex> {
        if !self.in_bounds(pos) {
            return None;
        }
        let index = self.pos_to_index(pos);
        self.cells[index].take()
    }

    pub fn block_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn row_is_full(&self, row: usize) -> bool {
        self.row(row).iter().all(Option::is_some)
    }

    pub fn row_is_empty(&self, row: usize) -> bool {
        self.row(row).iter().all(Option::is_none)
    }

    pub fn column_is_full(&self, col: usize) -> bool {
        (0..self.rows).all(|row| self.get(Position::new(row, col)).is_some())
    }

    pub fn row(&self, row: usize) -> &[Option<ColorIndex>] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [Option<ColorIndex>] {
        let start = row * self.cols;
        &mut self.cells[start..start + self.cols]
    }

    /// Largest color index stored, if any block is present
    pub fn max_color(&self) -> Option<ColorIndex> {
        self.cells.iter().flatten().copied().max_by_key(|c| c.0)
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        debug_assert!(self.in_bounds(pos), "{:?} outside {}x{}", pos, self.rows, self.cols);
        pos.row * self.cols + pos.col
    }

    /// Iterator over occupied cells
    pub fn iter(&self) -> impl Iterator<Item = (Position, ColorIndex)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.map(|c| (Position::new(i / cols, i % cols), c)))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for cell in self.row(row) {
                match cell {
                    Some(color) => write!(f, "{}", color.0)?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub(crate) fn random_color(rng: &mut ChaCha8Rng, palette_len: usize) -> ColorIndex {
    ColorIndex(rng.gen_range(0..palette_len) as u8)
}
