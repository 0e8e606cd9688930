//! vocabulary types shared by the grid and the snake domain
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vector with which to do positional math
#[derive(Debug, Clone, Copy)]
pub struct Vector {
    /// x component
    pub x: i64,
    /// y component
    pub y: i64,
}

/// A cell coordinate on a grid. Positions may be constructed out of range
/// (including negative); every grid operation wrap-corrects them before
/// storing, so a position read back from a grid is always in
/// `[0, width) x [0, height)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// x coordinate
    pub x: i32,
    /// y coordinate
    pub y: i32,
}

impl Position {
    /// adds the given vector to this position
    pub fn add_vec(&self, v: Vector) -> Position {
        Position {
            x: (self.x as i64 + v.x) as i32,
            y: (self.y as i64 + v.y) as i32,
        }
    }

    /// subtracts the given vector from this position
    pub fn sub_vec(&self, v: Vector) -> Position {
        Position {
            x: (self.x as i64 - v.x) as i32,
            y: (self.y as i64 - v.y) as i32,
        }
    }

    /// converts this position to a vector
    pub fn to_vector(&self) -> Vector {
        Vector {
            x: self.x as i64,
            y: self.y as i64,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents the direction of travel of a snake.
///
/// The direction-to-vector mapping is deliberately inverted relative to the
/// usual screen convention: movement shifts the body forward into the head's
/// old slot, while the head's own cell update subtracts this vector. Game
/// feel depends on the exact mapping, so it is locked down by tests.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    #[allow(missing_docs)]
    Up,
    #[allow(missing_docs)]
    Down,
    #[allow(missing_docs)]
    Left,
    #[allow(missing_docs)]
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

impl Direction {
    /// convert this direction to a vector
    pub fn to_vector(self) -> Vector {
        match self {
            Direction::Up => Vector { x: 0, y: 1 },
            Direction::Down => Vector { x: 0, y: -1 },
            Direction::Left => Vector { x: 1, y: 0 },
            Direction::Right => Vector { x: -1, y: 0 },
        }
    }

    /// create a Direction from the given vector
    pub fn from_vector(vector: Vector) -> Self {
        match vector {
            Vector { x: 0, y: 1 } => Self::Up,
            Vector { x: 0, y: -1 } => Self::Down,
            Vector { x: 1, y: 0 } => Self::Left,
            Vector { x: -1, y: 0 } => Self::Right,
            _ => panic!(),
        }
    }

    /// returns a vec of all possible directions
    pub fn all() -> Vec<Direction> {
        vec![
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }

    /// converts this direction to a usize index. indices are the same order
    /// as the `Direction::all()` method
    pub fn as_index(&self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// converts a usize index to a direction
    pub fn from_index(index: usize) -> Direction {
        match index {
            0 => Direction::Up,
            1 => Direction::Down,
            2 => Direction::Left,
            3 => Direction::Right,
            _ => panic!("invalid index"),
        }
    }

    /// checks if a given direction is not opposite this one. e.g. Up is not
    /// opposite to Left, but is opposite to Down. An input layer can use this
    /// to filter reversals; the core itself allows them.
    pub fn is_not_opposite(&self, other: &Direction) -> bool {
        !matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }
}

/// An entity classification that can be rendered as a single character,
/// used by the textual grid representation.
pub trait Glyph {
    /// character used for a cell with no occupant
    const EMPTY: char;

    /// character used for an occupant of this classification
    fn glyph(&self) -> char;
}
