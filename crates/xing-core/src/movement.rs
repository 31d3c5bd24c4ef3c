//! The twelve legal movements through a four-way intersection.
//!
//! A `Movement` is an (origin, destination) pair of distinct directions.
//! Movements carry a dense index `0..12` so per-movement state (counters,
//! condition variables, statistics) lives in fixed-size arrays rather than
//! maps.  Index order groups movements by turn:
//!
//! ```text
//!  0 N→S   1 S→N   2 W→E   3 E→W      straight
//!  4 N→W   5 W→S   6 S→E   7 E→N      right
//!  8 N→E   9 W→N  10 S→W  11 E→S      left
//! ```

use std::fmt;
use std::str::FromStr;

use crate::conflict::{self, ConflictSet};
use crate::{Direction, Turn, XingError, XingResult};

/// Sentinel for the diagonal of [`INDEX`] (u-turns).
const NONE: u8 = u8::MAX;

/// `INDEX[origin][destination]` → movement index.
const INDEX: [[u8; 4]; 4] = [
    //  N     E     S     W
    [NONE,    8,    0,    4], // from N
    [   7, NONE,   11,    3], // from E
    [   1,    6, NONE,   10], // from S
    [   9,    2,    5, NONE], // from W
];

/// A legal path through the intersection.  Never a u-turn.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "(Direction, Direction)", into = "(Direction, Direction)")
)]
pub struct Movement {
    origin:      Direction,
    destination: Direction,
}

impl Movement {
    pub const N_S: Movement = Movement::of(Direction::North, Direction::South);
    pub const S_N: Movement = Movement::of(Direction::South, Direction::North);
    pub const W_E: Movement = Movement::of(Direction::West, Direction::East);
    pub const E_W: Movement = Movement::of(Direction::East, Direction::West);

    pub const N_W: Movement = Movement::of(Direction::North, Direction::West);
    pub const W_S: Movement = Movement::of(Direction::West, Direction::South);
    pub const S_E: Movement = Movement::of(Direction::South, Direction::East);
    pub const E_N: Movement = Movement::of(Direction::East, Direction::North);

    pub const N_E: Movement = Movement::of(Direction::North, Direction::East);
    pub const W_N: Movement = Movement::of(Direction::West, Direction::North);
    pub const S_W: Movement = Movement::of(Direction::South, Direction::West);
    pub const E_S: Movement = Movement::of(Direction::East, Direction::South);

    /// Number of distinct movements.
    pub const COUNT: usize = 12;

    /// Every movement, in index order.
    pub const ALL: [Movement; Movement::COUNT] = [
        Movement::N_S, Movement::S_N, Movement::W_E, Movement::E_W,
        Movement::N_W, Movement::W_S, Movement::S_E, Movement::E_N,
        Movement::N_E, Movement::W_N, Movement::S_W, Movement::E_S,
    ];

    /// Build a movement, or `None` if `origin == destination`.
    #[inline]
    pub const fn new(origin: Direction, destination: Direction) -> Option<Movement> {
        if origin.index() == destination.index() {
            None
        } else {
            Some(Movement { origin, destination })
        }
    }

    /// Like [`new`](Self::new) but reports the u-turn as an error.
    pub fn try_new(origin: Direction, destination: Direction) -> XingResult<Movement> {
        Movement::new(origin, destination).ok_or(XingError::UTurn(origin))
    }

    /// Const constructor for the associated constants.
    ///
    /// # Panics
    /// Panics (at compile time when used in a `const`) on a u-turn.
    pub const fn of(origin: Direction, destination: Direction) -> Movement {
        match Movement::new(origin, destination) {
            Some(m) => m,
            None => panic!("u-turn is not a movement"),
        }
    }

    /// The movement from `origin` making `turn`.
    #[inline]
    pub const fn from_turn(origin: Direction, turn: Turn) -> Movement {
        Movement { origin, destination: turn.exit_from(origin) }
    }

    /// Movement with the given dense index.  Returns `None` for `i >= 12`.
    #[inline]
    pub const fn from_index(i: usize) -> Option<Movement> {
        if i < Movement::COUNT { Some(Movement::ALL[i]) } else { None }
    }

    #[inline(always)]
    pub const fn origin(self) -> Direction {
        self.origin
    }

    #[inline(always)]
    pub const fn destination(self) -> Direction {
        self.destination
    }

    /// Dense index in `0..12`; see the module docs for the ordering.
    #[inline(always)]
    pub const fn index(self) -> usize {
        INDEX[self.origin.index()][self.destination.index()] as usize
    }

    #[inline]
    pub const fn turn(self) -> Turn {
        match Turn::between(self.origin, self.destination) {
            Some(t) => t,
            // Unreachable: a Movement is never a u-turn.
            None => Turn::Straight,
        }
    }

    /// Every movement whose path crosses this one.
    #[inline]
    pub const fn conflict_set(self) -> ConflictSet {
        conflict::conflict_set(self)
    }

    /// `true` if this movement's path crosses `other`'s.
    #[inline]
    pub const fn conflicts_with(self, other: Movement) -> bool {
        conflict::conflicts(self, other)
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.origin, self.destination)
    }
}

impl TryFrom<(Direction, Direction)> for Movement {
    type Error = XingError;

    fn try_from((origin, destination): (Direction, Direction)) -> XingResult<Movement> {
        Movement::try_new(origin, destination)
    }
}

impl From<Movement> for (Direction, Direction) {
    fn from(m: Movement) -> Self {
        (m.origin, m.destination)
    }
}

impl FromStr for Movement {
    type Err = XingError;

    /// Accepts `"N-S"`, `"N→S"`, `"N>S"`, `"north-south"` and the compact
    /// two-letter form `"NS"`.
    fn from_str(s: &str) -> XingResult<Movement> {
        let s = s.trim();
        let (from, to) = match s.split_once(['-', '→', '>', ' ']) {
            Some(pair) => pair,
            None if s.len() == 2 && s.is_ascii() => s.split_at(1),
            None => return Err(XingError::Parse(format!("unrecognised movement {s:?}"))),
        };
        Movement::try_new(from.parse()?, to.parse()?)
    }
}
