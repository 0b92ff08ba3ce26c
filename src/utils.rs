use crate::engine::{Action, Board, Coord, Stack, BOARD_SIZE};
use serde::Deserialize;
use std::collections::HashSet;

/// Parses an array of string slices into a `Board`.
///
/// Each string slice is a row of the board, top row first, so row 0 holds the
/// squares with `y = BOARD_SIZE - 1`. Missing rows and short rows are empty.
///
/// Valid characters are:
/// - 'X': an enemy token
/// - '1'..='9': a friendly stack of that height
/// - '.': an empty square
///
/// # Returns
/// * `Ok(Board)` with enemies and stacks listed in reading order.
/// * `Err(String)` if there are too many rows, a row is too long, or a character
///   is not recognised.
///
/// # Examples
/// ```
/// use boom_solver::engine::Coord;
/// use boom_solver::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["X......2"]).unwrap();
/// assert!(board.is_enemy(Coord::new(0, 7)));
/// assert_eq!(board.stack_at(Coord::new(7, 7)).map(|s| s.height), Some(2));
///
/// assert!(board_from_str_array(&["X?"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, String> {
    if s.len() > BOARD_SIZE as usize {
        return Err(format!(
            "Invalid number of rows. Expected at most {}, found {}",
            BOARD_SIZE,
            s.len()
        ));
    }

    let mut enemies = Vec::new();
    let mut stacks = Vec::new();

    for (r, row_str) in s.iter().enumerate() {
        if row_str.chars().count() > BOARD_SIZE as usize {
            return Err(format!(
                "Row {} is too long. Expected at most {} characters, found {}",
                r,
                BOARD_SIZE,
                row_str.chars().count()
            ));
        }

        let y = BOARD_SIZE - 1 - r as i32;
        for (x, ch) in row_str.chars().enumerate() {
            let pos = Coord::new(x as i32, y);
            match ch {
                'X' => enemies.push(pos),
                '1'..='9' => stacks.push(Stack::new(ch.to_digit(10).unwrap_or(1), pos)),
                '.' => {}
                _ => return Err(format!("Unrecognized character '{}' in row {} col {}", ch, r, x)),
            }
        }
    }

    Ok(Board::new(enemies, stacks))
}

/// An enemy entry may carry a leading token count, which the solver ignores.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnemyEntry {
    Counted([i32; 3]),
    Bare([i32; 2]),
}

impl EnemyEntry {
    fn coord(&self) -> Coord {
        match *self {
            EnemyEntry::Counted([_, x, y]) | EnemyEntry::Bare([x, y]) => Coord::new(x, y),
        }
    }
}

#[derive(Deserialize)]
struct BoardFile {
    #[serde(default)]
    white: Vec<[i32; 3]>,
    #[serde(default)]
    black: Vec<EnemyEntry>,
}

/// Loads a board from its JSON description.
///
/// The document holds a `"white"` list of `[n, x, y]` friendly stacks and a
/// `"black"` list of enemy tokens, each `[n, x, y]` or `[x, y]`. Coordinates
/// must be on the board, heights positive, and no two entries may share a square.
///
/// # Examples
/// ```
/// use boom_solver::utils::board_from_json;
///
/// let board = board_from_json(r#"{"white": [[1, 4, 2]], "black": [[1, 4, 4]]}"#).unwrap();
/// assert_eq!(board.friendly_token_count(), 1);
/// assert_eq!(board.enemies().len(), 1);
/// ```
pub fn board_from_json(text: &str) -> Result<Board, String> {
    let file: BoardFile = serde_json::from_str(text).map_err(|e| format!("Invalid board JSON: {}", e))?;

    let mut seen = HashSet::new();
    let mut claim = |pos: Coord| -> Result<(), String> {
        if !pos.on_board(BOARD_SIZE) {
            return Err(format!("Token at {} is off the board", pos));
        }
        if !seen.insert(pos) {
            return Err(format!("More than one entry for square {}", pos));
        }
        Ok(())
    };

    let mut stacks = Vec::with_capacity(file.white.len());
    for [n, x, y] in file.white {
        let pos = Coord::new(x, y);
        claim(pos)?;
        if n < 1 {
            return Err(format!("Stack at {} has height {}", pos, n));
        }
        stacks.push(Stack::new(n as u32, pos));
    }

    let mut enemies = Vec::with_capacity(file.black.len());
    for entry in &file.black {
        let pos = entry.coord();
        claim(pos)?;
        enemies.push(pos);
    }

    Ok(Board::new(enemies, stacks))
}

/// Formats an action in the game's output notation.
///
/// ```
/// use boom_solver::engine::{Action, Coord};
/// use boom_solver::utils::format_action;
///
/// let boom = Action::Boom { at: Coord::new(4, 3) };
/// assert_eq!(format_action(&boom), "BOOM at (4, 3).");
/// ```
pub fn format_action(action: &Action) -> String {
    match action {
        Action::Move { count, from, to } => format!("MOVE {} from {} to {}.", count, from, to),
        Action::Boom { at } => format!("BOOM at {}.", at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&[
            "X.......",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "3......X",
        ])
        .unwrap();
        assert_eq!(board.enemies(), &[Coord::new(0, 7), Coord::new(7, 0)]);
        assert_eq!(board.stacks(), &[Stack::new(3, Coord::new(0, 0))]);
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["X......O"]);
        assert!(result.unwrap_err().contains("Unrecognized character 'O'"));
    }

    #[test]
    fn test_board_from_str_array_row_too_long() {
        let too_long_row = ".".repeat(BOARD_SIZE as usize + 1);
        let result = board_from_str_array(&[too_long_row.as_str()]);
        assert!(result.unwrap_err().contains("Row 0 is too long"));
    }

    #[test]
    fn test_board_from_str_array_too_many_rows() {
        let rows = vec!["........"; BOARD_SIZE as usize + 1];
        let result = board_from_str_array(&rows);
        assert!(result.unwrap_err().contains("Invalid number of rows"));
    }

    #[test]
    fn test_board_round_trips_through_display() {
        let rows = ["..X.....", "........", "........", "...2....", "........", "........", "........", "1......X"];
        let board = board_from_str_array(&rows).unwrap();
        let rendered = board.to_string();
        let parsed: Vec<&str> = rendered.lines().take(8).map(|l| &l[2..]).collect();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_board_from_json_accepts_both_enemy_shapes() {
        let board = board_from_json(r#"{"white": [[2, 0, 0]], "black": [[1, 3, 3], [5, 5]]}"#).unwrap();
        assert_eq!(board.enemies(), &[Coord::new(3, 3), Coord::new(5, 5)]);
        assert_eq!(board.stacks(), &[Stack::new(2, Coord::new(0, 0))]);
    }

    #[test]
    fn test_board_from_json_rejects_bad_boards() {
        assert!(board_from_json("{").unwrap_err().contains("Invalid board JSON"));
        assert!(board_from_json(r#"{"white": [[1, 8, 0]]}"#).unwrap_err().contains("off the board"));
        assert!(board_from_json(r#"{"white": [[0, 1, 1]]}"#).unwrap_err().contains("height 0"));
        let overlap = r#"{"white": [[1, 2, 2]], "black": [[1, 2, 2]]}"#;
        assert!(board_from_json(overlap).unwrap_err().contains("More than one entry"));
    }

    #[test]
    fn test_board_from_json_missing_lists_are_empty() {
        let board = board_from_json("{}").unwrap();
        assert_eq!(board, Board::new_empty());
    }

    #[test]
    fn test_format_move() {
        let action = Action::Move { count: 2, from: Coord::new(0, 1), to: Coord::new(0, 3) };
        assert_eq!(format_action(&action), "MOVE 2 from (0, 1) to (0, 3).");
    }
}
