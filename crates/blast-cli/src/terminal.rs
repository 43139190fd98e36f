//! Text front end: command parsing and board drawing.

use blast_board::Game;
use blast_core::{ClearMode, ColorIndex, Palette, Position};
use blast_leaderboard::LeaderboardEntry;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Color(ColorIndex),
    Cell(Position),
    Restart,
    Scores,
    Help,
    Quit,
}

/// Parse one input line. Colors and cells are 1-based on the prompt.
pub fn parse_command(line: &str, palette: &Palette) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.as_slice() {
        [] => Err("Type a command (h for help)".to_string()),
        ["q" | "quit" | "exit"] => Ok(Command::Quit),
        ["r" | "restart"] => Ok(Command::Restart),
        ["s" | "scores"] => Ok(Command::Scores),
        ["h" | "help" | "?"] => Ok(Command::Help),
        [color] => {
            let n = parse_index(color)?;
            let color = ColorIndex((n - 1) as u8);
            if palette.contains(color) {
                Ok(Command::Color(color))
            } else {
                Err(format!("Pick a color between 1 and {}", palette.len()))
            }
        }
        [row, col] => Ok(Command::Cell(Position::new(
            parse_index(row)? - 1,
            parse_index(col)? - 1,
        ))),
        _ => Err(format!("Unknown command '{}'", line.trim())),
    }
}

fn parse_index(word: &str) -> Result<usize, String> {
    match word.parse::<usize>() {
        Ok(n) if n >= 1 && n <= u8::MAX as usize => Ok(n),
        _ => Err(format!("'{}' is not a number from 1", word)),
    }
}

pub fn help_text(game: &Game) -> String {
    let mut out = String::new();
    match game.config().rules.clear_mode {
        ClearMode::BottomBlocks => {
            let _ = writeln!(out, "  <n>        clear the front block of every column with color n");
        }
        ClearMode::FloodFill => {
            let _ = writeln!(out, "  <row> <col> clear the connected group under that cell");
        }
    }
    let _ = writeln!(out, "  r          restart");
    let _ = writeln!(out, "  s          show leaderboard");
    let _ = writeln!(out, "  q          quit");
    out
}

fn swatch(palette: &Palette, color: ColorIndex) -> String {
    match palette.get(color).and_then(|c| c.rgb().ok()) {
        Some((r, g, b)) => format!("\x1b[48;2;{};{};{}m  \x1b[0m", r, g, b),
        None => format!("{:>2}", color.0 + 1),
    }
}

pub fn render(game: &Game) -> String {
    let board = game.board();
    let palette = &game.config().palette;
    let mut out = String::new();

    let _ = write!(out, "   ");
    for col in 0..board.cols() {
        let _ = write!(out, "{:>2}", col + 1);
    }
    let _ = writeln!(out);

    for row in 0..board.rows() {
        let _ = write!(out, "{:>2} ", row + 1);
        for col in 0..board.cols() {
            match board.get(Position::new(row, col)) {
                Some(color) => out.push_str(&swatch(palette, color)),
                None => out.push_str(" ."),
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "Score {}  Turn {}  Best {}",
        game.score(),
        game.turn(),
        game.high_score()
    );

    if game.config().rules.clear_mode == ClearMode::BottomBlocks {
        let legend: Vec<String> = palette
            .iter()
            .map(|(color, c)| format!("{} {}={}", swatch(palette, color), color.0 + 1, c.name))
            .collect();
        let _ = writeln!(out, "{}", legend.join("  "));
    }

    out
}

pub fn render_leaderboard(scores: &[LeaderboardEntry]) -> String {
    if scores.is_empty() {
        return "No scores yet.\n".to_string();
    }

    let mut out = String::new();
    for (i, entry) in scores.iter().enumerate() {
        let _ = writeln!(out, "#{:<3} {:<8} {:>10}", i + 1, entry.name, entry.score);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_is_one_based() {
        let palette = Palette::default();
        assert_eq!(parse_command("1", &palette), Ok(Command::Color(ColorIndex(0))));
        assert_eq!(parse_command(" 4 ", &palette), Ok(Command::Color(ColorIndex(3))));
        assert!(parse_command("5", &palette).is_err());
        assert!(parse_command("0", &palette).is_err());
    }

    #[test]
    fn test_parse_cell() {
        let palette = Palette::default();
        assert_eq!(
            parse_command("3 8", &palette),
            Ok(Command::Cell(Position::new(2, 7)))
        );
        assert!(parse_command("0 1", &palette).is_err());
        assert!(parse_command("a b", &palette).is_err());
    }

    #[test]
    fn test_parse_words() {
        let palette = Palette::default();
        assert_eq!(parse_command("q", &palette), Ok(Command::Quit));
        assert_eq!(parse_command("restart", &palette), Ok(Command::Restart));
        assert_eq!(parse_command("scores", &palette), Ok(Command::Scores));
        assert!(parse_command("", &palette).is_err());
        assert!(parse_command("1 2 3", &palette).is_err());
    }

    #[test]
    fn test_render_leaderboard() {
        assert_eq!(render_leaderboard(&[]), "No scores yet.\n");
        let text = render_leaderboard(&[LeaderboardEntry {
            name: "ACE".to_string(),
            score: 1200,
        }]);
        assert!(text.starts_with("#1"));
        assert!(text.contains("ACE"));
        assert!(text.contains("1200"));
    }
}
