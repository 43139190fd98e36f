//! Board state and turn logic.
//!
//! This module implements the grid of colored blocks and the rules that clear,
//! compact, and push rows into it.

pub mod grid;
pub mod rules;
pub mod game;

pub use grid::Board;
pub use rules::InsertResult;
pub use game::{Game, GameSnapshot, TurnOutcome};
