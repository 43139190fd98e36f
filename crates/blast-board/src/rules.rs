//! Board transitions: selection, clearing, gravity, row insertion and game-over checks.
//!
//! Every function here is pure with respect to anything but the board it is
//! handed, so the game loop and the property tests drive the same code.

use crate::grid::Board;
use blast_core::{ClearMode, ColorIndex, GameOverRule, InsertEdge, Position, RuleSet};
use std::collections::{HashSet, VecDeque};
use tracing::trace;

/// Outcome of pushing a new row onto the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    Inserted,
    /// The boundary row was occupied; the board is unchanged
    Overflow,
}

/// Rows ordered from the boundary edge toward the entry edge
fn rows_from_boundary(rows: usize, edge: InsertEdge) -> Box<dyn Iterator<Item = usize>> {
    match edge {
        InsertEdge::Top => Box::new((0..rows).rev()),
        InsertEdge::Bottom => Box::new(0..rows),
    }
}

/// Front block of each column (the one closest to the boundary) when it matches `color`.
///
/// A column whose front block has a different color contributes nothing, even
/// if a matching block sits behind it.
pub fn find_bottom_blocks(board: &Board, color: ColorIndex, edge: InsertEdge) -> Vec<Position> {
    let mut found = Vec::new();

    for col in 0..board.cols() {
        let front = rows_from_boundary(board.rows(), edge)
            .map(|row| Position::new(row, col))
            .find(|&pos| board.get(pos).is_some());

        if let Some(pos) = front {
            if board.get(pos) == Some(color) {
                found.push(pos);
            }
        }
    }

    trace!(color = color.0, matches = found.len(), "Front blocks scanned");
    found
}

/// Connected same-color group containing `origin` (orthogonal adjacency).
///
/// Empty when `origin` is empty, out of bounds, or the group is smaller than `min_size`.
pub fn find_group(board: &Board, origin: Position, min_size: usize) -> Vec<Position> {
    let Some(color) = board.get(origin) else {
        return Vec::new();
    };

    let mut seen = HashSet::from([origin]);
    let mut queue = VecDeque::from([origin]);
    let mut group = Vec::new();

    while let Some(pos) = queue.pop_front() {
        group.push(pos);
        for next in pos.neighbors4(board.rows(), board.cols()) {
            if board.get(next) == Some(color) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    if group.len() < min_size {
        return Vec::new();
    }

    group.sort();
    group
}

/// Empty the given cells. Returns how many held a block.
pub fn clear_cells(board: &mut Board, cells: &[Position]) -> usize {
    cells
        .iter()
        .filter(|&&pos| board.clear(pos).is_some())
        .count()
}

/// Drop every block toward the bottom row, keeping column order.
///
/// Returns whether any block moved.
pub fn apply_gravity(board: &mut Board) -> bool {
    let rows = board.rows();
    let mut moved = false;

    for col in 0..board.cols() {
        // Next free landing row, walking up from the floor
        let mut floor = rows;
        for row in (0..rows).rev() {
            let from = Position::new(row, col);
            if let Some(color) = board.get(from) {
                floor -= 1;
                if floor != row {
                    board.set(Position::new(floor, col), Some(color));
                    board.set(from, None);
                    moved = true;
                }
            }
        }
    }

    moved
}

/// Push every block one cell away from the entry edge and write `new_row` on it.
///
/// Refuses with [`InsertResult::Overflow`] when the boundary row holds any block,
/// since the shift would push it off the board.
pub fn insert_row(board: &mut Board, edge: InsertEdge, new_row: &[ColorIndex]) -> InsertResult {
    let rows = board.rows();
    debug_assert_eq!(new_row.len(), board.cols());

    if !board.row_is_empty(edge.boundary_row(rows)) {
        return InsertResult::Overflow;
    }

    match edge {
        InsertEdge::Top => {
            for row in (1..rows).rev() {
                let above = board.row(row - 1).to_vec();
                board.row_mut(row).copy_from_slice(&above);
            }
        }
        InsertEdge::Bottom => {
            for row in 0..rows - 1 {
                let below = board.row(row + 1).to_vec();
                board.row_mut(row).copy_from_slice(&below);
            }
        }
    }

    let entry = edge.entry_row(rows);
    for (cell, color) in board.row_mut(entry).iter_mut().zip(new_row) {
        *cell = Some(*color);
    }

    InsertResult::Inserted
}

/// Drop one new block into each column from the top; it lands on that column's stack.
///
/// This is how rows enter from the top once gravity holds the stacks on the
/// floor. Refuses with [`InsertResult::Overflow`] when any column is already
/// full, leaving the board unchanged.
pub fn drop_row(board: &mut Board, new_row: &[ColorIndex]) -> InsertResult {
    debug_assert_eq!(new_row.len(), board.cols());

    if (0..board.cols()).any(|col| board.column_is_full(col)) {
        return InsertResult::Overflow;
    }

    for (col, color) in new_row.iter().enumerate() {
        let landing = (0..board.rows())
            .rev()
            .map(|row| Position::new(row, col))
            .find(|&pos| board.get(pos).is_none());
        if let Some(pos) = landing {
            board.set(pos, Some(*color));
        }
    }

    InsertResult::Inserted
}

/// Whether any selection allowed by `rules` would clear at least one block
pub fn has_moves(board: &Board, rules: &RuleSet) -> bool {
    match rules.clear_mode {
        // every front block matches its own color button
        ClearMode::BottomBlocks => !board.is_empty(),
        ClearMode::FloodFill => board
            .iter()
            .any(|(pos, _)| !find_group(board, pos, rules.min_group_size).is_empty()),
    }
}

/// Whether the board state itself ends the game.
///
/// [`GameOverRule::OverflowOnInsert`] is never triggered here; it is decided by
/// [`insert_row`] at insertion time.
pub fn is_game_over(board: &Board, rule: GameOverRule, edge: InsertEdge) -> bool {
    match rule {
        GameOverRule::OverflowOnInsert => false,
        GameOverRule::BoundaryRowFull => board.row_is_full(edge.boundary_row(board.rows())),
        GameOverRule::ColumnFull => (0..board.cols()).any(|col| board.column_is_full(col)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(i: u8) -> ColorIndex {
        ColorIndex(i)
    }

    #[test]
    fn test_bottom_blocks_only_front_of_column() {
        // rows enter from the top, so the front is the lowest block
        let board = Board::from_rows(vec![
            vec![Some(0), Some(0), Some(1)],
            vec![Some(1), Some(0), None],
            vec![None, None, None],
        ]);

        let found = find_bottom_blocks(&board, c(0), InsertEdge::Top);
        assert_eq!(found, vec![Position::new(1, 1)]);

        let found = find_bottom_blocks(&board, c(1), InsertEdge::Top);
        assert_eq!(found, vec![Position::new(1, 0), Position::new(0, 2)]);
    }

    #[test]
    fn test_bottom_blocks_from_bottom_edge() {
        // rows enter from the bottom, so the front is the highest block
        let board = Board::from_rows(vec![
            vec![None, None],
            vec![Some(2), None],
            vec![Some(0), Some(2)],
        ]);

        let found = find_bottom_blocks(&board, c(2), InsertEdge::Bottom);
        assert_eq!(found, vec![Position::new(1, 0), Position::new(2, 1)]);
    }

    #[test]
    fn test_bottom_blocks_none_match() {
        let board = Board::from_rows(vec![vec![Some(1), Some(2)]]);
        assert!(find_bottom_blocks(&board, c(3), InsertEdge::Top).is_empty());
    }

    #[test]
    fn test_group_is_orthogonal_only() {
        let board = Board::from_rows(vec![
            vec![Some(0), Some(0), Some(1)],
            vec![Some(1), Some(0), Some(1)],
            vec![Some(0), Some(1), Some(0)],
        ]);

        let group = find_group(&board, Position::new(0, 0), 1);
        assert_eq!(
            group,
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)]
        );

        // (2,0) touches the group only diagonally
        assert_eq!(find_group(&board, Position::new(2, 0), 1), vec![Position::new(2, 0)]);
    }

    #[test]
    fn test_group_respects_min_size() {
        let board = Board::from_rows(vec![vec![Some(0), Some(1), Some(1)]]);
        assert!(find_group(&board, Position::new(0, 0), 2).is_empty());
        assert_eq!(find_group(&board, Position::new(0, 1), 2).len(), 2);
    }

    #[test]
    fn test_group_on_empty_cell() {
        let board = Board::new(4, 4);
        assert!(find_group(&board, Position::new(1, 1), 1).is_empty());
        assert!(find_group(&board, Position::new(9, 9), 1).is_empty());
    }

    #[test]
    fn test_clear_counts_only_filled() {
        let mut board = Board::from_rows(vec![vec![Some(0), None, Some(2)]]);
        let cleared = clear_cells(
            &mut board,
            &[Position::new(0, 0), Position::new(0, 1), Position::new(3, 3)],
        );
        assert_eq!(cleared, 1);
        assert_eq!(board.block_count(), 1);
    }

    #[test]
    fn test_gravity_drops_blocks() {
        let mut board = Board::from_rows(vec![
            vec![Some(0), Some(1)],
            vec![None, Some(2)],
            vec![Some(3), None],
            vec![None, None],
        ]);

        assert!(apply_gravity(&mut board));
        assert_eq!(
            board,
            Board::from_rows(vec![
                vec![None, None],
                vec![None, None],
                vec![Some(0), Some(1)],
                vec![Some(3), Some(2)],
            ])
        );
        assert!(!apply_gravity(&mut board));
    }

    #[test]
    fn test_gravity_single_block_falls_to_floor() {
        let mut board = Board::from_rows(vec![vec![None], vec![Some(0)], vec![None]]);

        assert!(apply_gravity(&mut board));
        assert_eq!(board.to_string(), ".\n.\n0\n");
    }

    #[test]
    fn test_insert_from_top_shifts_down() {
        let mut board = Board::from_rows(vec![
            vec![Some(0), Some(1)],
            vec![None, Some(2)],
            vec![None, None],
        ]);

        assert_eq!(insert_row(&mut board, InsertEdge::Top, &[c(3), c(3)]), InsertResult::Inserted);
        assert_eq!(
            board,
            Board::from_rows(vec![
                vec![Some(3), Some(3)],
                vec![Some(0), Some(1)],
                vec![None, Some(2)],
            ])
        );

        // (2,1) now sits in the boundary row
        let before = board.clone();
        assert_eq!(insert_row(&mut board, InsertEdge::Top, &[c(0), c(0)]), InsertResult::Overflow);
        assert_eq!(board, before);
    }

    #[test]
    fn test_insert_from_bottom_shifts_up() {
        let mut board = Board::from_rows(vec![
            vec![None, None],
            vec![None, None],
            vec![Some(1), None],
        ]);

        assert_eq!(insert_row(&mut board, InsertEdge::Bottom, &[c(2), c(0)]), InsertResult::Inserted);
        assert_eq!(
            board,
            Board::from_rows(vec![
                vec![None, None],
                vec![Some(1), None],
                vec![Some(2), Some(0)],
            ])
        );
    }

    #[test]
    fn test_drop_row_lands_on_stacks() {
        let mut board = Board::from_rows(vec![
            vec![None, None, None],
            vec![None, Some(1), None],
            vec![Some(0), Some(2), None],
        ]);

        assert_eq!(drop_row(&mut board, &[c(3), c(3), c(3)]), InsertResult::Inserted);
        assert_eq!(
            board,
            Board::from_rows(vec![
                vec![None, Some(3), None],
                vec![Some(3), Some(1), None],
                vec![Some(0), Some(2), Some(3)],
            ])
        );

        // column 1 is now full
        let before = board.clone();
        assert_eq!(drop_row(&mut board, &[c(0), c(0), c(0)]), InsertResult::Overflow);
        assert_eq!(board, before);
    }

    #[test]
    fn test_has_moves() {
        let color_rules = RuleSet::classic();
        let group_rules = RuleSet::flood();

        assert!(!has_moves(&Board::new(2, 2), &color_rules));
        assert!(!has_moves(&Board::new(2, 2), &group_rules));

        let singles = Board::from_rows(vec![vec![Some(0), Some(1)], vec![Some(1), Some(0)]]);
        assert!(has_moves(&singles, &color_rules));
        assert!(!has_moves(&singles, &group_rules));

        let pair = Board::from_rows(vec![vec![None, Some(1)], vec![Some(0), Some(1)]]);
        assert!(has_moves(&pair, &group_rules));
    }

    #[test]
    fn test_game_over_rules() {
        let full_bottom = Board::from_rows(vec![
            vec![None, None],
            vec![Some(0), Some(1)],
        ]);
        assert!(is_game_over(&full_bottom, GameOverRule::BoundaryRowFull, InsertEdge::Top));
        assert!(!is_game_over(&full_bottom, GameOverRule::BoundaryRowFull, InsertEdge::Bottom));
        assert!(!is_game_over(&full_bottom, GameOverRule::ColumnFull, InsertEdge::Top));
        assert!(!is_game_over(&full_bottom, GameOverRule::OverflowOnInsert, InsertEdge::Top));

        let full_column = Board::from_rows(vec![
            vec![None, Some(1)],
            vec![None, Some(1)],
        ]);
        assert!(is_game_over(&full_column, GameOverRule::ColumnFull, InsertEdge::Top));
        assert!(!is_game_over(&full_column, GameOverRule::BoundaryRowFull, InsertEdge::Top));
    }
}
