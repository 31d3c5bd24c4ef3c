//! Deterministic per-vehicle RNG.
//!
//! # Determinism strategy
//!
//! Each vehicle gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (vehicle_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive vehicle IDs uniformly across the seed space.
//! Each vehicle thread owns its RNG, so the sequence of movements and delays
//! a vehicle draws is reproducible for a given seed even though the
//! interleaving of threads is not.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{Direction, Movement, Turn, VehicleId};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-vehicle deterministic RNG.
///
/// Create one per vehicle and move it into that vehicle's thread.
pub struct VehicleRng(SmallRng);

impl VehicleRng {
    /// Seed deterministically from the run's global seed and a vehicle ID.
    pub fn new(global_seed: u64, vehicle: VehicleId) -> Self {
        let seed = global_seed ^ (vehicle.0 as u64).wrapping_mul(MIXING_CONSTANT);
        VehicleRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// A uniformly chosen approach.
    pub fn direction(&mut self) -> Direction {
        Direction::from_index(self.0.gen_range(0..4))
    }

    /// Draw a movement: uniform origin, turn chosen with relative `weights`
    /// in `[straight, right, left]` order.
    ///
    /// All-zero (or non-finite) weights fall back to a uniform turn.
    pub fn movement(&mut self, weights: [f64; 3]) -> Movement {
        let origin = self.direction();
        let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
        let turn = if !total.is_finite() || total <= 0.0 {
            Turn::ALL[self.0.gen_range(0..3)]
        } else {
            let mut pick = self.0.gen_range(0.0..total);
            // Float leftovers land on the last turn that can be drawn at all.
            let mut chosen = Turn::ALL
                .into_iter()
                .zip(weights)
                .rev()
                .find(|&(_, w)| w > 0.0)
                .map_or(Turn::Left, |(t, _)| t);
            for (turn, w) in Turn::ALL.into_iter().zip(weights) {
                let w = w.max(0.0);
                if pick < w {
                    chosen = turn;
                    break;
                }
                pick -= w;
            }
            chosen
        };
        Movement::from_turn(origin, turn)
    }
}
