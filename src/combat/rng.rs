//! Fast PRNG for trial simulation. Uses SplitMix64 for throughput and good statistical quality.
//! Deterministic: same seed produces the same sequence. Not cryptographically secure.

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

/// 2^-53, maps the top 53 bits of a draw onto [0, 1).
const F64_UNIT: f64 = 1.0 / (1u64 << 53) as f64;

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Independent stream for trial `index` of a run seeded with `seed`.
    /// Mixing the index keeps neighbouring trials from sharing shifted sequences.
    pub fn for_trial(seed: u64, index: u64) -> Self {
        let mut mixer = Self::new(seed ^ index.wrapping_mul(SPLITMIX64_M1));
        Self::new(mixer.next_u64())
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * F64_UNIT
    }

    /// Uniform integer in `[min, max]` inclusive. Callers guarantee `min <= max`.
    #[inline]
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        let span = u64::from(max - min) + 1;
        let offset = (self.next_f64() * span as f64) as u64;
        // floor of a value strictly below `span`, but guard the float edge anyway
        min + offset.min(span - 1) as u32
    }

    /// True with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splitmix64_deterministic() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn splitmix64_different_seeds_differ() {
        let mut a = Rng::new(1);
        let mut b = Rng::new(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn next_f64_stays_in_unit_interval() {
        let mut rng = Rng::new(99);
        for _ in 0..10_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x), "out of range: {x}");
        }
    }

    #[test]
    fn range_inclusive_hits_both_ends() {
        let mut rng = Rng::new(3);
        let mut seen = [false; 4];
        for _ in 0..1_000 {
            let v = rng.range_inclusive(10, 13);
            assert!((10..=13).contains(&v));
            seen[(v - 10) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "every value should appear: {seen:?}");
    }

    #[test]
    fn range_inclusive_degenerate_range() {
        let mut rng = Rng::new(5);
        for _ in 0..50 {
            assert_eq!(rng.range_inclusive(1000, 1000), 1000);
        }
    }

    #[test]
    fn trial_streams_differ_per_index() {
        let mut a = Rng::for_trial(42, 0);
        let mut b = Rng::for_trial(42, 1);
        assert_ne!(a.next_u64(), b.next_u64());

        let mut c = Rng::for_trial(42, 1);
        let mut d = Rng::for_trial(42, 1);
        assert_eq!(c.next_u64(), d.next_u64());
    }

    #[test]
    fn chance_edges() {
        let mut rng = Rng::new(11);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }
}
