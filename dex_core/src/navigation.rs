use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Size of the first-generation catalog.
pub const DEFAULT_TOTAL_COUNT: u32 = 151;

pub const MIN_ID: u32 = 1;

/// Current catalog position within the closed range `[1, max]`.
///
/// Stepping past either end is a no-op rather than a clamp or wrap, so callers
/// can use the returned `Option` to decide whether a fetch is needed.
#[derive(Debug, Clone)]
pub struct NavigationState {
    current: u32,
    max: u32,
    rng: SmallRng,
}

impl NavigationState {
    pub fn new(total_count: u32) -> Self {
        Self::with_rng(total_count, SmallRng::from_entropy())
    }

    /// Deterministic variant for tests and reproducible sessions.
    pub fn with_seed(total_count: u32, seed: u64) -> Self {
        Self::with_rng(total_count, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(total_count: u32, rng: SmallRng) -> Self {
        Self {
            current: MIN_ID,
            max: total_count.max(MIN_ID),
            rng,
        }
    }

    /// Start somewhere other than the first entry. Out-of-range values are
    /// pulled back into range.
    pub fn starting_at(mut self, id: u32) -> Self {
        self.current = id.clamp(MIN_ID, self.max);
        self
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn min(&self) -> u32 {
        MIN_ID
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, id: u32) -> bool {
        (MIN_ID..=self.max).contains(&id)
    }

    pub fn step_backward(&mut self) -> Option<u32> {
        if self.current > MIN_ID {
            self.current -= 1;
            Some(self.current)
        } else {
            None
        }
    }

    pub fn step_forward(&mut self) -> Option<u32> {
        if self.current < self.max {
            self.current += 1;
            Some(self.current)
        } else {
            None
        }
    }

    /// Uniform pick over the whole range; may return the current id.
    pub fn jump_random(&mut self) -> u32 {
        self.current = self.rng.gen_range(MIN_ID..=self.max);
        self.current
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_COUNT)
    }
}
