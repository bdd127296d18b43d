//! Pseudo-random number generator wrapper for Monte Carlo simulation.
//!
//! [`PricerRng`] wraps `StdRng` and adds per-block seeding and correlated
//! normal pairs for the two Heston Brownian drivers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Weyl increment used to spread block indices over the seed space.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 finaliser.
#[inline]
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Fresh base seed from the thread-local entropy source.
pub fn entropy_seed() -> u64 {
    rand::thread_rng().gen()
}

/// Monte Carlo random number generator.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::rng::PricerRng;
///
/// let mut rng = PricerRng::from_seed(42);
/// let (zs, zv) = rng.gen_correlated_pair(-0.7);
/// assert!(zs.is_finite() && zv.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct PricerRng {
    inner: StdRng,
    seed: u64,
}

impl PricerRng {
    /// Creates a generator from a 64-bit seed.
    ///
    /// The same seed always yields the same sequence.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Generator for block `chunk_idx` of a simulation seeded with `base_seed`.
    ///
    /// Distinct `(base_seed, chunk_idx)` pairs map to well separated seeds.
    #[inline]
    pub fn for_chunk(base_seed: u64, chunk_idx: usize) -> Self {
        let offset = GOLDEN_GAMMA.wrapping_mul(chunk_idx as u64 + 1);
        Self::from_seed(mix64(mix64(base_seed).wrapping_add(offset)))
    }

    /// Seed this generator was created with.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Standard normal variate (Ziggurat via `rand_distr`).
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Pair `(Zs, Zv)` of standard normals with correlation `rho`.
    ///
    /// `Zv = rho·Zs + sqrt(1 - rho²)·Z⊥` with `Z⊥` independent of `Zs`.
    #[inline]
    pub fn gen_correlated_pair(&mut self, rho: f64) -> (f64, f64) {
        let zs = self.gen_normal();
        let z_perp = self.gen_normal();
        let rho_bar = (1.0 - rho * rho).max(0.0).sqrt();
        (zs, rho * zs + rho_bar * z_perp)
    }
}
