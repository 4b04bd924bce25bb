use rand::{Rng, RngCore};

use super::path::PathCategory;

/// Rolls the dice for `category`.
///
/// Probability entries consume exactly one draw `r` in `[0, 1)` and exist when `r <= p`.
/// The comparison is non-strict, so `p = 0` exists on an exact-zero draw.
pub fn exists(category: &PathCategory, rng: &mut dyn RngCore) -> bool {
    match *category {
        PathCategory::Root | PathCategory::ExistDirectory => true,
        PathCategory::Invalid => false,
        PathCategory::ProbabilityEntry(p) => rng.random::<f64>() <= p,
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use rand::RngCore;

    /// Always yields the same word, so every `f64` draw is the same value.
    pub struct ConstRng(pub u64);

    impl ConstRng {
        /// Every `f64` draw is exactly `0.0`.
        pub fn zero() -> Self {
            ConstRng(0)
        }

        /// Every `f64` draw is the largest value below `1.0`.
        pub fn max() -> Self {
            ConstRng(u64::MAX)
        }
    }

    impl RngCore for ConstRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            let bytes = self.0.to_le_bytes();
            for (i, b) in dst.iter_mut().enumerate() {
                *b = bytes[i % bytes.len()];
            }
        }
    }
}
