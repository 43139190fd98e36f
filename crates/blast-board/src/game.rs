//! Game state machine: one player action resolves into one turn.

use crate::grid::{random_color, Board};
use crate::rules::{self, InsertResult};
use blast_core::{ClearMode, ColorIndex, Error, GameConfig, GameId, InsertEdge, Position, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// What a single player action did to the game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Cells that were emptied; empty when the action was a no-op
    pub cleared_cells: Vec<Position>,
    pub cleared: usize,
    pub points: u64,
    pub gravity_moved: bool,
    pub row_inserted: bool,
    pub game_over: bool,
}

impl TurnOutcome {
    /// True when nothing matched and no turn was spent
    pub fn is_noop(&self) -> bool {
        self.cleared == 0
    }
}

/// Serializable view of the game for front ends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub board: Board,
    pub score: u64,
    pub turn: u32,
    pub high_score: u64,
    pub game_over: bool,
}

pub struct Game {
    id: GameId,
    config: GameConfig,
    board: Board,
    score: u64,
    turn: u32,
    high_score: u64,
    game_over: bool,
    rng: ChaCha8Rng,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut game = Self {
            id: GameId::new(),
            board: Board::new(config.rows, config.cols),
            config,
            score: 0,
            turn: 0,
            high_score: 0,
            game_over: false,
            rng,
        };
        game.restart();

        Ok(game)
    }

    /// Start a game on an explicit board (fixtures, replays)
    pub fn with_board(config: GameConfig, board: Board) -> Result<Self> {
        let mut game = Self::new(config)?;
        if board.rows() != game.config.rows || board.cols() != game.config.cols {
            return Err(Error::Validation(format!(
                "Board is {}x{}, config expects {}x{}",
                board.rows(),
                board.cols(),
                game.config.rows,
                game.config.cols
            )));
        }
        if let Some(max) = board.max_color() {
            if !game.config.palette.contains(max) {
                return Err(Error::Validation(format!(
                    "Color {} is outside the {}-color palette",
                    max,
                    game.config.palette.len()
                )));
            }
        }
        game.board = board;
        Ok(game)
    }

    /// Reset score, turn and board. The high score survives.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn restart(&mut self) {
        self.id = GameId::new();
        self.board = Board::random_filled(
            self.config.rows,
            self.config.cols,
            self.config.initial_filled_rows,
            self.config.rules.insert_edge,
            self.config.palette.len(),
            &mut self.rng,
        );
        if self.config.rules.gravity {
            rules::apply_gravity(&mut self.board);
        }
        self.score = 0;
        self.turn = 0;
        self.game_over = false;
        self.refill_until_playable();

        info!(
            rows = self.config.rows,
            cols = self.config.cols,
            blocks = self.board.block_count(),
            "New game started"
        );
    }

    /// Clear the front block of every column that matches `color`
    #[instrument(skip(self), fields(game_id = %self.id, turn = self.turn))]
    pub fn select_color(&mut self, color: ColorIndex) -> Result<TurnOutcome> {
        self.ensure_playable()?;
        if self.config.rules.clear_mode != ClearMode::BottomBlocks {
            return Err(Error::InvalidState(
                "Color selection needs the bottom-blocks clear mode".to_string(),
            ));
        }
        if !self.config.palette.contains(color) {
            return Err(Error::Validation(format!(
                "Color {} is outside the {}-color palette",
                color,
                self.config.palette.len()
            )));
        }

        let cells = rules::find_bottom_blocks(&self.board, color, self.config.rules.insert_edge);
        Ok(self.resolve_turn(cells))
    }

    /// Clear the connected same-color group under `pos`
    #[instrument(skip(self), fields(game_id = %self.id, turn = self.turn))]
    pub fn select_cell(&mut self, pos: Position) -> Result<TurnOutcome> {
        self.ensure_playable()?;
        if self.config.rules.clear_mode != ClearMode::FloodFill {
            return Err(Error::InvalidState(
                "Cell selection needs the flood-fill clear mode".to_string(),
            ));
        }
        if !self.board.in_bounds(pos) {
            return Err(Error::OutOfBounds {
                row: pos.row,
                col: pos.col,
            });
        }

        let cells = rules::find_group(&self.board, pos, self.config.rules.min_group_size);
        Ok(self.resolve_turn(cells))
    }

    fn ensure_playable(&self) -> Result<()> {
        if self.game_over {
            Err(Error::GameOver)
        } else {
            Ok(())
        }
    }

    fn resolve_turn(&mut self, cells: Vec<Position>) -> TurnOutcome {
        if cells.is_empty() {
            debug!("Nothing to clear, turn not consumed");
            return TurnOutcome::default();
        }

        let rule_set = self.config.rules;
        let cleared = rules::clear_cells(&mut self.board, &cells);
        let points = (cleared as u64).saturating_mul(self.config.points_per_block);
        self.score = self.score.saturating_add(points);

        let gravity_moved = rule_set.gravity && rules::apply_gravity(&mut self.board);

        self.turn += 1;

        let mut row_inserted = false;
        if self.turn % self.config.turns_per_new_row == 0 {
            row_inserted = self.push_row();
        }

        if !self.game_over
            && rules::is_game_over(&self.board, rule_set.game_over, rule_set.insert_edge)
        {
            self.game_over = true;
        }

        row_inserted |= self.refill_until_playable();

        if self.score > self.high_score {
            self.high_score = self.score;
        }

        debug!(
            cleared,
            points,
            score = self.score,
            row_inserted,
            blocks = self.board.block_count(),
            "Turn resolved"
        );

        if self.game_over {
            info!(
                event = "game_over",
                score = self.score,
                turns = self.turn,
                high_score = self.high_score,
                "Game over"
            );
        }

        TurnOutcome {
            cleared_cells: cells,
            cleared,
            points,
            gravity_moved,
            row_inserted,
            game_over: self.game_over,
        }
    }

    /// Insert one random row. A blocked insertion ends the game.
    fn push_row(&mut self) -> bool {
        let rule_set = self.config.rules;
        let new_row: Vec<ColorIndex> = (0..self.config.cols)
            .map(|_| random_color(&mut self.rng, self.config.palette.len()))
            .collect();

        let result = match (rule_set.insert_edge, rule_set.gravity) {
            (InsertEdge::Top, true) => rules::drop_row(&mut self.board, &new_row),
            (edge, _) => rules::insert_row(&mut self.board, edge, &new_row),
        };

        match result {
            InsertResult::Inserted => true,
            InsertResult::Overflow => {
                debug!(rule = ?rule_set.game_over, "New row blocked");
                self.game_over = true;
                false
            }
        }
    }

    /// Keep adding rows while no selection can clear anything.
    ///
    /// Ends once a move exists or an insertion is blocked; every accepted
    /// insertion adds blocks, so the board fills in a bounded number of steps.
    fn refill_until_playable(&mut self) -> bool {
        let mut inserted = false;
        while !self.game_over && !rules::has_moves(&self.board, &self.config.rules) {
            info!(turn = self.turn, "No moves left, adding a row");
            if self.push_row() {
                inserted = true;
                if rules::is_game_over(
                    &self.board,
                    self.config.rules.game_over,
                    self.config.rules.insert_edge,
                ) {
                    self.game_over = true;
                }
            }
        }
        inserted
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Seed the high score from persistent storage
    pub fn set_high_score(&mut self, high_score: u64) {
        self.high_score = self.high_score.max(high_score);
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_id: self.id,
            board: self.board.clone(),
            score: self.score,
            turn: self.turn,
            high_score: self.high_score,
            game_over: self.game_over,
        }
    }
}
