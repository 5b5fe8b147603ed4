//! Identifier generation.
//!
//! Identifiers are random fixed-width decimal numbers with an optional
//! prefix, e.g. `48213` or `BOOK1934`. The number never has a leading zero.
//! A draw that collides with an existing id is retried.
//!
//! ## Termination
//!
//! The effective width is the smallest width (at least the configured one)
//! whose capacity is at least twice the number of occupied ids plus one.
//! Every draw therefore collides with probability at most 1/2, the expected
//! number of draws is at most 2, and `k` consecutive collisions happen with
//! probability at most `2^-k`. After [`MAX_ATTEMPTS_PER_WIDTH`] collisions
//! at one width the generator widens by one digit anyway. A generated id is
//! never one the caller reports as taken.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::RecordId;

/// Widest supported numeric part (fits in a `u64`).
pub const MAX_WIDTH: u32 = 19;

/// Draws at a single width before widening.
pub const MAX_ATTEMPTS_PER_WIDTH: usize = 64;

/// Shape of generated identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdScheme {
    /// Literal prefix, e.g. `"BOOK"`. Empty for plain numeric ids.
    pub prefix: String,
    /// Minimum number of digits in the numeric part.
    pub width: u32,
}

impl Default for IdScheme {
    /// Five-digit numeric ids, `10000..=99999`.
    fn default() -> Self {
        Self::numeric(5)
    }
}

impl IdScheme {
    /// Plain numeric ids of the given width.
    pub fn numeric(width: u32) -> Self {
        Self {
            prefix: String::new(),
            width: width.clamp(1, MAX_WIDTH),
        }
    }

    /// Prefixed ids, e.g. `prefixed("USER", 4)` gives `USER1000..=USER9999`.
    pub fn prefixed(prefix: impl Into<String>, width: u32) -> Self {
        Self {
            prefix: prefix.into(),
            width: width.clamp(1, MAX_WIDTH),
        }
    }

    /// Number of distinct ids at `width` digits.
    pub fn capacity(width: u32) -> u64 {
        let (lo, hi) = Self::bounds(width);
        hi - lo + 1
    }

    /// Inclusive numeric range at `width` digits (no leading zero).
    fn bounds(width: u32) -> (u64, u64) {
        let width = width.clamp(1, MAX_WIDTH);
        let lo = 10u64.pow(width - 1);
        let hi = 10u64.pow(width) - 1;
        (lo, hi)
    }

    /// Width to draw from when `occupied` ids already exist.
    pub fn effective_width(&self, occupied: usize) -> u32 {
        let needed = (occupied as u64).saturating_add(1).saturating_mul(2);
        let mut width = self.width.clamp(1, MAX_WIDTH);
        while width < MAX_WIDTH && Self::capacity(width) < needed {
            width += 1;
        }
        width
    }

    fn format(&self, number: u64) -> String {
        format!("{}{}", self.prefix, number)
    }
}

/// Seedable random identifier generator.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    scheme: IdScheme,
    rng: StdRng,
}

impl IdGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new(scheme: IdScheme) -> Self {
        Self {
            scheme,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic generator (for tests and reproducible seeding).
    pub fn with_seed(scheme: IdScheme, seed: u64) -> Self {
        Self {
            scheme,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The scheme ids are drawn from.
    pub fn scheme(&self) -> &IdScheme {
        &self.scheme
    }

    /// Generate an id for which `is_taken` returns false.
    ///
    /// `occupied` is the number of ids currently in use and sizes the
    /// draw space (see the module docs).
    pub fn generate<F>(&mut self, occupied: usize, is_taken: F) -> RecordId
    where
        F: Fn(&str) -> bool,
    {
        let mut width = self.scheme.effective_width(occupied);
        loop {
            let (lo, hi) = IdScheme::bounds(width);
            for _ in 0..MAX_ATTEMPTS_PER_WIDTH {
                let candidate = self.scheme.format(self.rng.gen_range(lo..=hi));
                if !is_taken(&candidate) {
                    return RecordId(candidate);
                }
            }
            if width < MAX_WIDTH {
                width += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_scheme_is_five_digits() {
        let mut ids = IdGenerator::with_seed(IdScheme::default(), 7);
        for _ in 0..100 {
            let id = ids.generate(0, |_| false);
            let n: u64 = id.as_str().parse().unwrap();
            assert!((10_000..=99_999).contains(&n));
        }
    }

    #[test]
    fn test_prefixed_scheme() {
        let mut ids = IdGenerator::with_seed(IdScheme::prefixed("BOOK", 4), 7);
        let id = ids.generate(0, |_| false);
        assert!(id.as_str().starts_with("BOOK"));
        assert_eq!(id.as_str().len(), 8);
    }

    #[test]
    fn test_capacity() {
        assert_eq!(IdScheme::capacity(1), 9);
        assert_eq!(IdScheme::capacity(5), 90_000);
        assert_eq!(IdScheme::capacity(MAX_WIDTH), 9_000_000_000_000_000_000);
    }

    #[test]
    fn test_effective_width_widens_near_saturation() {
        let scheme = IdScheme::numeric(5);
        assert_eq!(scheme.effective_width(0), 5);
        assert_eq!(scheme.effective_width(44_999), 5);
        assert_eq!(scheme.effective_width(45_000), 6);
        assert_eq!(scheme.effective_width(100_000), 6);
        assert_eq!(scheme.effective_width(usize::MAX), MAX_WIDTH);
    }

    #[test]
    fn test_full_space_forces_wider_id() {
        // Every one-digit id is taken and the occupancy hint lies.
        let taken: HashSet<String> = (1..=9).map(|n| n.to_string()).collect();
        let mut ids = IdGenerator::with_seed(IdScheme::numeric(1), 1);
        let id = ids.generate(0, |c| taken.contains(c));
        assert!(!taken.contains(id.as_str()));
        assert_eq!(id.as_str().len(), 2);
    }

    #[test]
    fn test_seeded_generators_repeat() {
        let mut a = IdGenerator::with_seed(IdScheme::default(), 99);
        let mut b = IdGenerator::with_seed(IdScheme::default(), 99);
        for _ in 0..10 {
            assert_eq!(a.generate(0, |_| false), b.generate(0, |_| false));
        }
    }

    proptest! {
        #[test]
        fn test_generated_ids_never_collide(seed in any::<u64>(), count in 1usize..500) {
            let mut ids = IdGenerator::with_seed(IdScheme::numeric(2), seed);
            let mut seen: HashSet<String> = HashSet::new();
            for _ in 0..count {
                let id = ids.generate(seen.len(), |c| seen.contains(c));
                prop_assert!(seen.insert(id.into_string()));
            }
        }
    }
}
