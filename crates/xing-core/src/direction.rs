//! Compass directions and the turn a movement makes.
//!
//! Directions are numbered clockwise (`North = 0`, `East = 1`, …) so the turn
//! between an origin and a destination is a single modular difference:
//!
//! ```text
//! destination = origin + 1  →  Left      (arriving from N, leaving E)
//! destination = origin + 2  →  Straight
//! destination = origin + 3  →  Right     (arriving from N, leaving W)
//! ```

use std::fmt;
use std::str::FromStr;

use crate::XingError;

// ── Direction ─────────────────────────────────────────────────────────────────

/// One of the four approaches to the intersection.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East  = 1,
    South = 2,
    West  = 3,
}

impl Direction {
    /// All directions in clockwise order starting at North.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Clockwise position, `0..4`.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`index`](Self::index); wraps modulo 4.
    #[inline]
    pub const fn from_index(i: usize) -> Direction {
        match i % 4 {
            0 => Direction::North,
            1 => Direction::East,
            2 => Direction::South,
            _ => Direction::West,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Direction {
        Direction::from_index(self.index() + 2)
    }

    /// The exit a vehicle arriving from `self` reaches by turning left.
    #[inline]
    pub const fn left_exit(self) -> Direction {
        Direction::from_index(self.index() + 1)
    }

    /// The exit a vehicle arriving from `self` reaches by turning right.
    #[inline]
    pub const fn right_exit(self) -> Direction {
        Direction::from_index(self.index() + 3)
    }

    /// Single-letter label (`"N"`, `"E"`, `"S"`, `"W"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East  => "E",
            Direction::South => "S",
            Direction::West  => "W",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = XingError;

    /// Accepts `N`/`north`, `E`/`east`, … (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "e" | "east"  => Ok(Direction::East),
            "s" | "south" => Ok(Direction::South),
            "w" | "west"  => Ok(Direction::West),
            other => Err(XingError::Parse(format!("unknown direction {other:?}"))),
        }
    }
}

// ── Turn ──────────────────────────────────────────────────────────────────────

/// The kind of path a movement takes through the box.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Turn {
    Straight,
    Right,
    Left,
}

impl Turn {
    pub const ALL: [Turn; 3] = [Turn::Straight, Turn::Right, Turn::Left];

    /// The turn from `origin` to `destination`, or `None` for a u-turn.
    #[inline]
    pub const fn between(origin: Direction, destination: Direction) -> Option<Turn> {
        match (destination.index() + 4 - origin.index()) % 4 {
            1 => Some(Turn::Left),
            2 => Some(Turn::Straight),
            3 => Some(Turn::Right),
            _ => None,
        }
    }

    /// The exit reached from `origin` by this turn.
    #[inline]
    pub const fn exit_from(self, origin: Direction) -> Direction {
        match self {
            Turn::Straight => origin.opposite(),
            Turn::Right    => origin.right_exit(),
            Turn::Left     => origin.left_exit(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Turn::Straight => "straight",
            Turn::Right    => "right",
            Turn::Left     => "left",
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
