//! Seeded random source shared by every stochastic decision
//!
//! A run is reproducible from `(seed, turn count)` because all draws come from
//! this one generator in a fixed order.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct SimRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `[0, limit)`; zero when the range is empty
    pub fn below(&mut self, limit: i64) -> i64 {
        if limit <= 0 {
            return 0;
        }
        self.rng.gen_range(0..limit)
    }

    /// Uniform index in `[0, len)`
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    pub fn coin(&mut self) -> bool {
        self.below(2) == 1
    }

    /// True with probability `1/n`
    pub fn one_in(&mut self, n: i64) -> bool {
        self.below(n) == 0
    }

    /// Count drawn by successive halving
    ///
    /// One event with probability 1/2, two with 1/4, three with 1/8, and so
    /// on, capped at `bits` events.
    pub fn burst(&mut self, bits: u32) -> u32 {
        let ceiling: i64 = 1 << bits;
        let mut r = 1 + self.below(ceiling - 1);
        let mut count = 0;
        while r < ceiling {
            count += 1;
            r *= 2;
        }
        count
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new(0)
    }
}
