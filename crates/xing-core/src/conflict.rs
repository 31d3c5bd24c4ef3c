//! The fixed conflict relation between movements.
//!
//! Two movements conflict when their paths cross inside the box.  The
//! relation is symmetric and irreflexive: any number of vehicles making the
//! same movement may pass together, and opposing straight movements (N→S and
//! S→N) never conflict.
//!
//! The table is written out once as movement lists and folded into one
//! 12-bit mask per movement at compile time, so a conflict test is a single
//! shift-and-mask and "does anything active conflict with `m`" is one AND
//! against the set of active movements.

use std::fmt;

use crate::Movement;

// ── ConflictSet ───────────────────────────────────────────────────────────────

/// A set of movements stored as a 12-bit mask (bit `i` = movement index `i`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct ConflictSet(u16);

impl ConflictSet {
    pub const EMPTY: ConflictSet = ConflictSet(0);

    /// Build a set from a slice of movements.
    pub const fn of(movements: &[Movement]) -> ConflictSet {
        let mut bits = 0u16;
        let mut i = 0;
        while i < movements.len() {
            bits |= 1 << movements[i].index();
            i += 1;
        }
        ConflictSet(bits)
    }

    #[inline(always)]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[inline(always)]
    pub const fn contains(self, m: Movement) -> bool {
        self.0 & (1 << m.index()) != 0
    }

    #[inline]
    pub const fn with(self, m: Movement) -> ConflictSet {
        ConflictSet(self.0 | (1 << m.index()))
    }

    #[inline]
    pub const fn without(self, m: Movement) -> ConflictSet {
        ConflictSet(self.0 & !(1 << m.index()))
    }

    #[inline(always)]
    pub const fn intersects(self, other: ConflictSet) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in index order.
    pub fn iter(self) -> impl Iterator<Item = Movement> {
        Movement::ALL.into_iter().filter(move |&m| self.contains(m))
    }
}

impl FromIterator<Movement> for ConflictSet {
    fn from_iter<I: IntoIterator<Item = Movement>>(iter: I) -> Self {
        iter.into_iter().fold(ConflictSet::EMPTY, ConflictSet::with)
    }
}

impl fmt::Debug for ConflictSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|m| m.to_string())).finish()
    }
}

// ── The table ─────────────────────────────────────────────────────────────────

const fn row(movements: &[Movement]) -> ConflictSet {
    ConflictSet::of(movements)
}

/// `TABLE[m.index()]` is the set of movements that cross `m`.
const TABLE: [ConflictSet; Movement::COUNT] = {
    use crate::Movement as M;
    [
        // straight
        row(&[M::W_E, M::W_N, M::W_S, M::E_W, M::E_S, M::S_W]),           // N→S
        row(&[M::E_W, M::E_N, M::E_S, M::W_E, M::W_N, M::N_E]),           // S→N
        row(&[M::N_S, M::N_E, M::S_N, M::S_W, M::S_E, M::E_S]),           // W→E
        row(&[M::N_S, M::N_E, M::N_W, M::S_N, M::S_W, M::W_N]),           // E→W
        // right
        row(&[M::E_W, M::S_W]),                                           // N→W
        row(&[M::N_S, M::E_S]),                                           // W→S
        row(&[M::W_E, M::N_E]),                                           // S→E
        row(&[M::S_N, M::W_N]),                                           // E→N
        // left
        row(&[M::W_E, M::W_N, M::E_W, M::E_S, M::S_N, M::S_E, M::S_W]),   // N→E
        row(&[M::N_S, M::N_E, M::E_W, M::E_N, M::E_S, M::S_N, M::S_W]),   // W→N
        row(&[M::N_S, M::N_W, M::N_E, M::E_W, M::E_S, M::W_E, M::W_N]),   // S→W
        row(&[M::N_S, M::N_E, M::W_E, M::W_S, M::S_N, M::S_W, M::W_N]),   // E→S
    ]
};

/// Every movement that crosses `m`.
#[inline(always)]
pub const fn conflict_set(m: Movement) -> ConflictSet {
    TABLE[m.index()]
}

/// `true` if the paths of `a` and `b` cross.  `conflicts(m, m)` is `false`.
#[inline(always)]
pub const fn conflicts(a: Movement, b: Movement) -> bool {
    TABLE[a.index()].contains(b)
}
