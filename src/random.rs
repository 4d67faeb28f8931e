use rand::distr::{Distribution, StandardUniform};
use rand::Rng;
use rand_distr::StandardNormal;

/// Source of the random draws a Metropolis step needs.
///
/// Every [`rand::Rng`] is a `RandomSource`, so seeded generators like
/// `SmallRng::seed_from_u64` give reproducible chains.
pub trait RandomSource {
    /// A draw from `Normal(0, sd)`.
    fn normal(&mut self, sd: f64) -> f64;

    /// A draw from `Uniform[0, 1)`.
    fn uniform(&mut self) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn normal(&mut self, sd: f64) -> f64 {
        let z: f64 = StandardNormal.sample(self);
        z * sd
    }

    fn uniform(&mut self) -> f64 {
        StandardUniform.sample(self)
    }
}
