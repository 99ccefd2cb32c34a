//! Reproducibility utilities: seeded RNG, state hashing, and the
//! guard tying randomness to step counts.

/// Seeded linear congruential generator.
///
/// Numerical Recipes constants over wrapping u64 arithmetic. Fast,
/// stable across platforms, and good enough for simulation jitter;
/// not a cryptographic source. A zero seed is coerced to 1 so the
/// stream never degenerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    const MULTIPLIER: u64 = 1_664_525;
    const INCREMENT: u64 = 1_013_904_223;

    /// New generator from a seed; 0 is coerced to 1.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Next raw value in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        // 53 high-quality bits into the mantissa.
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Next value in `[min, max)`; a degenerate range returns `min`.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        if max > min {
            min + self.next_f64() * (max - min)
        } else {
            min
        }
    }

    /// Current internal state.
    pub fn state(&self) -> u64 {
        self.state
    }
}

/// FNV-1a hasher over simulation quantities.
///
/// Hashes u64 and f64 values byte-wise with the standard FNV-1a
/// offset basis and prime, plus an order-sensitive combine step for
/// merging sub-hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHasher {
    hash: u64,
}

impl Default for StateHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHasher {
    const OFFSET_BASIS: u64 = 14_695_981_039_346_656_037;
    const PRIME: u64 = 1_099_511_628_211;

    /// Fresh hasher at the FNV offset basis.
    pub fn new() -> Self {
        Self {
            hash: Self::OFFSET_BASIS,
        }
    }

    /// Feed one u64.
    pub fn write_u64(&mut self, value: u64) {
        for byte in value.to_le_bytes() {
            self.hash ^= u64::from(byte);
            self.hash = self.hash.wrapping_mul(Self::PRIME);
        }
    }

    /// Feed one f64 by bit pattern; negative zero is normalized so
    /// `0.0` and `-0.0` hash identically.
    pub fn write_f64(&mut self, value: f64) {
        let normalized = if value == 0.0 { 0.0 } else { value };
        self.write_u64(normalized.to_bits());
    }

    /// Merge another hash into this one, order-sensitively.
    pub fn combine(&mut self, other: u64) {
        self.hash ^= other
            .wrapping_add(0x9e37_79b9)
            .wrapping_add(self.hash << 6)
            .wrapping_add(self.hash >> 2);
    }

    /// Final hash value.
    pub fn finish(&self) -> u64 {
        self.hash
    }
}

/// Ties an engine's randomness to its step count.
///
/// The current seed is always `initial_seed + step_count`, so any
/// clone at the same step count draws the same stream and a run can
/// be replayed from any step without replaying the RNG history.
/// Never keyed to wall-clock entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReproducibilityGuard {
    initial_seed: u64,
    step_count: u64,
}

impl ReproducibilityGuard {
    /// New guard from an initial seed; 0 is coerced to 1.
    pub fn new(seed: u64) -> Self {
        Self {
            initial_seed: if seed == 0 { 1 } else { seed },
            step_count: 0,
        }
    }

    /// The seed the guard started with.
    pub fn initial_seed(&self) -> u64 {
        self.initial_seed
    }

    /// Steps recorded since construction or the last reset.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Seed for the current step.
    pub fn current_seed(&self) -> u64 {
        self.initial_seed.wrapping_add(self.step_count)
    }

    /// Generator keyed to the current step.
    pub fn rng(&self) -> SimRng {
        SimRng::new(self.current_seed())
    }

    /// Record one step.
    pub fn step(&mut self) {
        self.step_count += 1;
    }

    /// Rewind to step zero, keeping the initial seed.
    pub fn reset(&mut self) {
        self.step_count = 0;
    }

    /// Whether another guard would draw the same stream right now.
    pub fn matches(&self, other: &ReproducibilityGuard) -> bool {
        self.current_seed() == other.current_seed()
    }
}
