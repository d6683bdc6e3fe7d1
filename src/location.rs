use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::Serialize;
use std::ops::Add;

/// A cell on the board, addressed by row and column.
///
/// Coordinates are signed so a step off the edge can be represented before it is wrapped back
/// onto the board with [`Location::wrapped`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct Location {
    pub row: i32,
    pub col: i32,
}

impl Location {
    pub fn new(row: i32, col: i32) -> Location {
        Location { row, col }
    }

    /// Returns the location one step away in the given direction. The receiver is left untouched.
    pub fn offset(self, direction: Direction) -> Location {
        let (d_row, d_col) = direction.delta();
        Location {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Brings a location that stepped off the board back onto it.
    ///
    /// A coordinate below zero jumps to the last row/column and a coordinate past the last one
    /// jumps to zero. Only single steps ever leave the board, so this is not a general modulo.
    pub fn wrapped(self, board_size: usize) -> Location {
        Location {
            row: wrap(self.row, board_size),
            col: wrap(self.col, board_size),
        }
    }
}

impl Add<Direction> for Location {
    type Output = Location;

    fn add(self, direction: Direction) -> Location {
        self.offset(direction)
    }
}

fn wrap(value: i32, board_size: usize) -> i32 {
    let last = board_size as i32 - 1;
    if value > last {
        0
    } else if value < 0 {
        last
    } else {
        value
    }
}

/// Represents the direction a bear can walk in.
///
/// East and West step towards the lower and higher column respectively.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// The `(row, col)` delta of a single step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, -1),
            Direction::West => (0, 1),
        }
    }
}

impl Distribution<Direction> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Direction {
        match rng.gen_range(0..4) {
            0 => Direction::North,
            1 => Direction::South,
            2 => Direction::East,
            _ => Direction::West,
        }
    }
}
