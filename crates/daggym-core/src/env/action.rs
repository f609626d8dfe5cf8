//! Discrete action space and a seeded sampler.

/// Default number of discrete actions.
pub const DEFAULT_ACTION_COUNT: u32 = 4;

/// Set of actions an agent may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSpace {
    /// Actions `0..n`.
    Discrete(u32),
}

impl Default for ActionSpace {
    fn default() -> Self {
        Self::Discrete(DEFAULT_ACTION_COUNT)
    }
}

impl ActionSpace {
    /// Number of actions.
    #[must_use]
    pub const fn n(self) -> u32 {
        match self {
            Self::Discrete(n) => n,
        }
    }

    /// Returns `true` if `action` is a member of this space.
    #[must_use]
    pub const fn contains(self, action: u32) -> bool {
        action < self.n()
    }

    /// Draws a uniformly distributed action. An empty space always yields 0.
    pub fn sample(self, rng: &mut ActionSampler) -> u32 {
        match self.n() {
            0 => 0,
            n => u32::try_from(rng.next_u64() % u64::from(n)).unwrap_or(0),
        }
    }
}

/// Minimal deterministic RNG (xorshift64*) for action sampling.
/// Not crypto; just stable and fast.
#[derive(Debug, Clone, Copy)]
pub struct ActionSampler {
    state: u64,
}

impl ActionSampler {
    /// Seeds the generator. A zero seed is replaced by a fixed odd constant.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    /// Next raw 64-bit output.
    pub const fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}
