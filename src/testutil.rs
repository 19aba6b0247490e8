use rand::{RngExt, SeedableRng, rngs::StdRng};

/// Deterministic generator of in-range value vectors for tests and benches.
pub struct StoreGen {
    rng: StdRng,
}

impl StoreGen {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// `len` values drawn uniformly from `[0, range)`.
    pub fn values(&mut self, range: u32, len: usize) -> Vec<u32> {
        (0..len).map(|_| self.rng.random_range(0..range)).collect()
    }

    /// `len` optional values; roughly one slot in three is absent.
    pub fn sparse(&mut self, range: u32, len: usize) -> Vec<Option<u32>> {
        (0..len)
            .map(|_| {
                if self.rng.random_ratio(1, 3) {
                    None
                } else {
                    Some(self.rng.random_range(0..range))
                }
            })
            .collect()
    }
}
