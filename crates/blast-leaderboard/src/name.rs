//! Player-name rules for leaderboard submissions.

use std::fmt;

pub const MAX_NAME_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    Empty,
    InvalidCharacters,
    TooLong { len: usize },
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "Please enter a name"),
            NameError::InvalidCharacters => write!(f, "Only letters A-Z and digits 0-9 are allowed"),
            NameError::TooLong { len } => {
                write!(f, "Names are at most {} characters (got {})", MAX_NAME_LEN, len)
            }
        }
    }
}

impl std::error::Error for NameError {}

impl From<NameError> for blast_core::Error {
    fn from(err: NameError) -> Self {
        blast_core::Error::InvalidName(err.to_string())
    }
}

/// Keystroke filter: drop anything that is not an ASCII letter or digit, then uppercase
pub fn sanitize_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Trim and uppercase `raw`, then enforce `[A-Z0-9]{1,8}`
pub fn validate_player_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim().to_uppercase();

    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if !name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err(NameError::InvalidCharacters);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong { len });
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names_are_uppercased() {
        assert_eq!(validate_player_name("  ace99 ").unwrap(), "ACE99");
        assert_eq!(validate_player_name("ABCDEFGH").unwrap(), "ABCDEFGH");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(validate_player_name("   "), Err(NameError::Empty));
        assert_eq!(validate_player_name("a b"), Err(NameError::InvalidCharacters));
        assert_eq!(validate_player_name("héro"), Err(NameError::InvalidCharacters));
        assert_eq!(validate_player_name("abc-1"), Err(NameError::InvalidCharacters));
        assert_eq!(
            validate_player_name("ABCDEFGHI"),
            Err(NameError::TooLong { len: 9 })
        );
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("a-b c_9!"), "ABC9");
        assert_eq!(sanitize_input("日本x"), "X");
        assert_eq!(sanitize_input(""), "");
    }

    #[test]
    fn test_error_converts() {
        let err: blast_core::Error = NameError::Empty.into();
        assert!(matches!(err, blast_core::Error::InvalidName(_)));
    }
}
