//! Core type definitions for the game.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a single game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub Uuid);

impl GameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cell coordinate on the board. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonal neighbors that fall inside a `rows x cols` board
    pub fn neighbors4(&self, rows: usize, cols: usize) -> impl Iterator<Item = Position> {
        let Position { row, col } = *self;
        let up = row.checked_sub(1).map(|r| Position::new(r, col));
        let down = (row + 1 < rows).then(|| Position::new(row + 1, col));
        let left = col.checked_sub(1).map(|c| Position::new(row, c));
        let right = (col + 1 < cols).then(|| Position::new(row, col + 1));
        [up, down, left, right].into_iter().flatten()
    }
}

/// Index into the active palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorIndex(pub u8);

impl ColorIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ColorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single palette entry with its display hex value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub hex: String,
    pub name: String,
}

impl PaletteColor {
    pub fn new(hex: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hex: hex.into(),
            name: name.into(),
        }
    }

    /// Parse `#RRGGBB` into its components
    pub fn rgb(&self) -> Result<(u8, u8, u8)> {
        let digits = self
            .hex
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| Error::Validation(format!("Bad color hex '{}'", self.hex)))?;

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| Error::Validation(format!("Bad color hex '{}': {}", self.hex, e)))
        };
        Ok((channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Fixed set of block colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<PaletteColor>,
}

impl Palette {
    pub const MIN_COLORS: usize = 4;
    pub const MAX_COLORS: usize = 6;

    pub fn new(colors: Vec<PaletteColor>) -> Result<Self> {
        let palette = Self { colors };
        palette.validate()?;
        Ok(palette)
    }

    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_COLORS..=Self::MAX_COLORS).contains(&self.colors.len()) {
            return Err(Error::Validation(format!(
                "Palette needs {} to {} colors, got {}",
                Self::MIN_COLORS,
                Self::MAX_COLORS,
                self.colors.len()
            )));
        }
        for color in &self.colors {
            color.rgb()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, color: ColorIndex) -> Option<&PaletteColor> {
        self.colors.get(color.index())
    }

    pub fn contains(&self, color: ColorIndex) -> bool {
        color.index() < self.colors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorIndex, &PaletteColor)> + '_ {
        self.colors
            .iter()
            .enumerate()
            .map(|(i, c)| (ColorIndex(i as u8), c))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                PaletteColor::new("#E74C3C", "Red"),
                PaletteColor::new("#3498DB", "Blue"),
                PaletteColor::new("#2ECC71", "Green"),
                PaletteColor::new("#F39C12", "Orange"),
            ],
        }
    }
}

/// How the player picks blocks to clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearMode {
    /// Pick a color; the front block of every column clears if it matches
    BottomBlocks,
    /// Pick a cell; its connected same-color group clears
    FloodFill,
}

/// Edge that new rows enter from. The opposite edge is the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertEdge {
    Top,
    Bottom,
}

impl InsertEdge {
    /// Row index new rows are written to
    pub fn entry_row(self, rows: usize) -> usize {
        match self {
            InsertEdge::Top => 0,
            InsertEdge::Bottom => rows - 1,
        }
    }

    /// Row index whose occupation ends the game
    pub fn boundary_row(self, rows: usize) -> usize {
        match self {
            InsertEdge::Top => rows - 1,
            InsertEdge::Bottom => 0,
        }
    }
}

/// Condition that ends a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverRule {
    /// A new row would push a block past the boundary row
    OverflowOnInsert,
    /// Every cell of the boundary row is occupied
    BoundaryRowFull,
    /// Any single column is completely occupied
    ColumnFull,
}

/// Rule variant the game is played under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub clear_mode: ClearMode,
    /// Drop blocks toward the bottom row after each clear
    pub gravity: bool,
    pub insert_edge: InsertEdge,
    pub game_over: GameOverRule,
    /// Smallest group a flood-fill click may clear
    pub min_group_size: usize,
}

impl RuleSet {
    /// Color buttons, no gravity, rows pushed in from the top
    pub fn classic() -> Self {
        Self {
            clear_mode: ClearMode::BottomBlocks,
            gravity: false,
            insert_edge: InsertEdge::Top,
            game_over: GameOverRule::OverflowOnInsert,
            min_group_size: 1,
        }
    }

    /// Group clicks with gravity, rows pushed in from the bottom
    pub fn flood() -> Self {
        Self {
            clear_mode: ClearMode::FloodFill,
            gravity: true,
            insert_edge: InsertEdge::Bottom,
            game_over: GameOverRule::BoundaryRowFull,
            min_group_size: 2,
        }
    }

    /// Color buttons with gravity; rows drop in from the top onto each column
    pub fn cascade() -> Self {
        Self {
            clear_mode: ClearMode::BottomBlocks,
            gravity: true,
            insert_edge: InsertEdge::Top,
            game_over: GameOverRule::ColumnFull,
            min_group_size: 1,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Some(Self::classic()),
            "flood" => Some(Self::flood()),
            "cascade" => Some(Self::cascade()),
            _ => None,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_at_corner() {
        let corner: Vec<_> = Position::new(0, 0).neighbors4(8, 8).collect();
        assert_eq!(corner, vec![Position::new(1, 0), Position::new(0, 1)]);

        let far: Vec<_> = Position::new(7, 7).neighbors4(8, 8).collect();
        assert_eq!(far, vec![Position::new(6, 7), Position::new(7, 6)]);
    }

    #[test]
    fn test_neighbors_in_middle() {
        assert_eq!(Position::new(3, 4).neighbors4(8, 8).count(), 4);
    }

    #[test]
    fn test_palette_rgb() {
        let red = PaletteColor::new("#E74C3C", "Red");
        assert_eq!(red.rgb().unwrap(), (0xE7, 0x4C, 0x3C));

        assert!(PaletteColor::new("E74C3C", "x").rgb().is_err());
        assert!(PaletteColor::new("#E74C3", "x").rgb().is_err());
        assert!(PaletteColor::new("#GG4C3C", "x").rgb().is_err());
    }

    #[test]
    fn test_palette_size_bounds() {
        assert!(Palette::default().validate().is_ok());
        assert_eq!(Palette::default().len(), 4);

        let three = vec![PaletteColor::new("#000000", "a"); 3];
        assert!(Palette::new(three).is_err());

        let seven = vec![PaletteColor::new("#000000", "a"); 7];
        assert!(Palette::new(seven).is_err());
    }

    #[test]
    fn test_edges() {
        assert_eq!(InsertEdge::Top.entry_row(8), 0);
        assert_eq!(InsertEdge::Top.boundary_row(8), 7);
        assert_eq!(InsertEdge::Bottom.entry_row(8), 7);
        assert_eq!(InsertEdge::Bottom.boundary_row(8), 0);
    }

    #[test]
    fn test_rule_set_names() {
        assert_eq!(RuleSet::from_name("Classic"), Some(RuleSet::classic()));
        assert_eq!(RuleSet::from_name(" flood "), Some(RuleSet::flood()));
        assert_eq!(RuleSet::from_name("CASCADE"), Some(RuleSet::cascade()));
        assert_eq!(RuleSet::cascade().game_over, GameOverRule::ColumnFull);
        assert_eq!(RuleSet::from_name("tetris"), None);
    }

    #[test]
    fn test_rule_set_serialization() {
        let json = serde_json::to_string(&RuleSet::flood()).unwrap();
        assert!(json.contains("\"flood_fill\""));
        let back: RuleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RuleSet::flood());
    }
}
