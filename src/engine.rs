//! Board model for the boom puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Coord`: a square on the grid, with the distance helpers the searches need.
//! - `Stack`: one or more friendly tokens sharing a square.
//! - `Action`: the two kinds of output actions, moves and booms.
//! - `Board`: enemy tokens plus friendly stacks, and a rules simulation that can
//!   replay actions (including chain-reaction explosions).
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Width and height of the standard board.
pub const BOARD_SIZE: i32 = 8;

/// The four orthogonal unit steps a stack may jump along.
pub const ORTHOGONAL_STEPS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// A square on the board. `x` grows to the right, `y` grows upwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Coord {
        Coord::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// King-move distance: the larger of the two axis distances.
    pub fn chebyshev(self, other: Coord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn on_board(self, board_size: i32) -> bool {
        self.x >= 0 && self.x < board_size && self.y >= 0 && self.y < board_size
    }

    /// Returns the in-bounds squares at king distance exactly 1, column by column.
    pub fn king_neighbors(self, board_size: i32) -> Vec<Coord> {
        let mut neighbors = Vec::with_capacity(8);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let n = self.offset(dx, dy);
                if n.on_board(board_size) {
                    neighbors.push(n);
                }
            }
        }
        neighbors
    }

    /// Returns the in-bounds squares of the 3×3 blast centred on this square,
    /// including the square itself.
    pub fn blast_area(self, board_size: i32) -> Vec<Coord> {
        let mut area = self.king_neighbors(board_size);
        if self.on_board(board_size) {
            area.push(self);
        }
        area
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One or more friendly tokens on a single square.
///
/// The height bounds how far the stack may jump in one move. Field order makes
/// the derived ordering sort stacks by square first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Stack {
    pub pos: Coord,
    pub height: u32,
}

impl Stack {
    pub const fn new(height: u32, pos: Coord) -> Self {
        Stack { pos, height }
    }
}

/// An output action, in the order it must be played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// Move `count` tokens of the stack on `from` as one stack onto `to`.
    Move { count: u32, from: Coord, to: Coord },
    /// Detonate the stack currently standing on `at`.
    Boom { at: Coord },
}

/// A board snapshot: immovable enemy tokens and movable friendly stacks.
///
/// The board does not validate its contents; loaders are expected to reject
/// out-of-range or overlapping tokens before building one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    enemies: Vec<Coord>,
    stacks: Vec<Stack>,
}

impl Board {
    pub fn new(enemies: Vec<Coord>, stacks: Vec<Stack>) -> Self {
        Board { enemies, stacks }
    }

    pub fn new_empty() -> Self {
        Board::default()
    }

    /// Creates a reproducible random board on the standard grid.
    ///
    /// Every token gets its own square. Friendly stacks are one or two tokens
    /// high. The same seed always produces the same board.
    ///
    /// # Panics
    /// Panics if `enemy_count + friendly_count` exceeds the number of squares.
    pub fn new_random_with_seed(seed: u64, enemy_count: usize, friendly_count: usize) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut squares: Vec<Coord> = (0..BOARD_SIZE)
            .flat_map(|x| (0..BOARD_SIZE).map(move |y| Coord::new(x, y)))
            .collect();
        assert!(enemy_count + friendly_count <= squares.len());
        squares.shuffle(&mut rng);

        let enemies = squares[..enemy_count].to_vec();
        let stacks = squares[enemy_count..enemy_count + friendly_count]
            .iter()
            .map(|&pos| Stack::new(rng.gen_range(1..=2), pos))
            .collect();
        Board { enemies, stacks }
    }

    pub fn enemies(&self) -> &[Coord] {
        &self.enemies
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Total number of friendly tokens, counting every token of every stack.
    pub fn friendly_token_count(&self) -> u32 {
        self.stacks.iter().map(|s| s.height).sum()
    }

    pub fn is_enemy(&self, c: Coord) -> bool {
        self.enemies.contains(&c)
    }

    pub fn stack_at(&self, c: Coord) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.pos == c)
    }

    /// True once every enemy token has been destroyed.
    pub fn is_cleared(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Plays a single action on the board.
    ///
    /// A move needs a friendly stack on the source holding at least `count`
    /// tokens, an orthogonal jump no longer than that stack's height, and an
    /// in-bounds destination free of enemies. A boom needs a friendly stack on
    /// the square; it destroys every token in the 3×3 area around it, and every
    /// destroyed token explodes in turn.
    ///
    /// On error the board is left untouched.
    pub fn apply(&mut self, action: &Action, board_size: i32) -> Result<(), String> {
        match *action {
            Action::Move { count, from, to } => self.apply_move(count, from, to, board_size),
            Action::Boom { at } => self.apply_boom(at, board_size),
        }
    }

    fn apply_move(&mut self, count: u32, from: Coord, to: Coord, board_size: i32) -> Result<(), String> {
        let source = self
            .stacks
            .iter()
            .position(|s| s.pos == from)
            .ok_or_else(|| format!("No friendly stack at {}", from))?;
        let height = self.stacks[source].height;

        if count == 0 || count > height {
            return Err(format!("Cannot move {} tokens from a stack of {} at {}", count, height, from));
        }
        if !to.on_board(board_size) {
            return Err(format!("Destination {} is off the board", to));
        }
        if (from.x != to.x && from.y != to.y) || from == to {
            return Err(format!("Move from {} to {} is not an orthogonal jump", from, to));
        }
        if from.manhattan(to) > height as i32 {
            return Err(format!("Stack of {} at {} cannot jump to {}", height, from, to));
        }
        if self.is_enemy(to) {
            return Err(format!("Destination {} holds an enemy token", to));
        }

        if count == height {
            self.stacks.remove(source);
        } else {
            self.stacks[source].height -= count;
        }
        match self.stacks.iter_mut().find(|s| s.pos == to) {
            Some(existing) => existing.height += count,
            None => self.stacks.push(Stack::new(count, to)),
        }
        Ok(())
    }

    fn apply_boom(&mut self, at: Coord, board_size: i32) -> Result<(), String> {
        if self.stack_at(at).is_none() {
            return Err(format!("No friendly stack to detonate at {}", at));
        }

        let mut exploded = HashSet::new();
        let mut queue = VecDeque::new();
        exploded.insert(at);
        queue.push_back(at);

        while let Some(center) = queue.pop_front() {
            for c in center.blast_area(board_size) {
                let hit = self.is_enemy(c) || self.stack_at(c).is_some();
                if hit && exploded.insert(c) {
                    queue.push_back(c);
                }
            }
        }

        self.enemies.retain(|c| !exploded.contains(c));
        self.stacks.retain(|s| !exploded.contains(&s.pos));
        Ok(())
    }
}

/// Renders the standard board with `y = 7` on top: `X` for enemies, the height
/// for friendly stacks and `.` for empty squares.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..BOARD_SIZE).rev() {
            write!(f, "{} ", y)?;
            for x in 0..BOARD_SIZE {
                let c = Coord::new(x, y);
                let cell = if self.is_enemy(c) {
                    'X'
                } else if let Some(stack) = self.stack_at(c) {
                    std::char::from_digit(stack.height.min(9), 10).unwrap_or('?')
                } else {
                    '.'
                };
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for x in 0..BOARD_SIZE {
            write!(f, "{}", x)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn test_distances() {
        assert_eq!(c(1, 1).manhattan(c(4, 3)), 5);
        assert_eq!(c(1, 1).chebyshev(c(4, 3)), 3);
        assert_eq!(c(2, 2).chebyshev(c(2, 2)), 0);
    }

    #[test]
    fn test_king_neighbors_clip_at_corner() {
        let mut n = c(0, 0).king_neighbors(BOARD_SIZE);
        n.sort();
        assert_eq!(n, vec![c(0, 1), c(1, 0), c(1, 1)]);
        assert_eq!(c(3, 3).king_neighbors(BOARD_SIZE).len(), 8);
    }

    #[test]
    fn test_new_random_with_seed_determinism() {
        let a = Board::new_random_with_seed(7, 6, 3);
        let b = Board::new_random_with_seed(7, 6, 3);
        assert_eq!(a, b);
        assert_eq!(a.enemies().len(), 6);
        assert_eq!(a.stacks().len(), 3);

        let mut squares: Vec<Coord> = a.enemies().to_vec();
        squares.extend(a.stacks().iter().map(|s| s.pos));
        squares.sort();
        squares.dedup();
        assert_eq!(squares.len(), 9, "Every token should own its square");
    }

    #[test]
    fn test_move_splits_and_merges() {
        let mut board = Board::new(vec![], vec![Stack::new(3, c(0, 0)), Stack::new(1, c(0, 2))]);
        board.apply(&Action::Move { count: 2, from: c(0, 0), to: c(0, 2) }, BOARD_SIZE).unwrap();
        assert_eq!(board.stack_at(c(0, 0)).map(|s| s.height), Some(1));
        assert_eq!(board.stack_at(c(0, 2)).map(|s| s.height), Some(3));
        assert_eq!(board.friendly_token_count(), 4);
    }

    #[test]
    fn test_move_rejections_leave_board_untouched() {
        let original = Board::new(vec![c(0, 1)], vec![Stack::new(1, c(0, 0))]);
        let mut board = original.clone();

        let too_far = Action::Move { count: 1, from: c(0, 0), to: c(2, 0) };
        assert!(board.apply(&too_far, BOARD_SIZE).unwrap_err().contains("cannot jump"));
        let onto_enemy = Action::Move { count: 1, from: c(0, 0), to: c(0, 1) };
        assert!(board.apply(&onto_enemy, BOARD_SIZE).unwrap_err().contains("enemy"));
        let diagonal = Action::Move { count: 1, from: c(0, 0), to: c(1, 1) };
        assert!(board.apply(&diagonal, BOARD_SIZE).is_err());
        let off_board = Action::Move { count: 1, from: c(0, 0), to: c(-1, 0) };
        assert!(board.apply(&off_board, BOARD_SIZE).is_err());

        assert_eq!(board, original);
    }

    #[test]
    fn test_boom_chain_reaction() {
        // (1,1) booms, hits (2,2), which reaches (3,3), which reaches the stack at (4,4).
        let mut board = Board::new(
            vec![c(2, 2), c(3, 3), c(6, 6)],
            vec![Stack::new(1, c(1, 1)), Stack::new(2, c(4, 4))],
        );
        board.apply(&Action::Boom { at: c(1, 1) }, BOARD_SIZE).unwrap();
        assert_eq!(board.enemies(), &[c(6, 6)]);
        assert!(board.stacks().is_empty());
        assert!(!board.is_cleared());
    }

    #[test]
    fn test_boom_requires_friendly_stack() {
        let mut board = Board::new(vec![c(2, 2)], vec![]);
        assert!(board.apply(&Action::Boom { at: c(1, 1) }, BOARD_SIZE).is_err());
    }

    #[test]
    fn test_display_board_formatting() {
        let board = Board::new(vec![c(0, 7)], vec![Stack::new(2, c(7, 0))]);
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "7 X.......");
        assert_eq!(lines[7], "0 .......2");
        assert_eq!(lines[8], "  01234567");
    }
}
