//! Adaptive single-component Metropolis sampling of a vector with a
//! multivariate normal prior.
//!
//! The prior is evaluated in whitened coordinates and updated incrementally
//! as one coordinate moves. The sampled value lives in a [`ShieldedVector`],
//! whose per-entry [`Component`] proxies let dependent computations (for
//! example a [`Cached`] likelihood term) recompute only when the entry they
//! read actually changed.

pub(crate) mod cache;
pub(crate) mod error;
pub(crate) mod likelihood;
pub(crate) mod math;
pub(crate) mod prior;
pub(crate) mod random;
pub(crate) mod sampler;
pub(crate) mod shield;
pub(crate) mod tune;
pub(crate) mod vector;

pub use cache::Cached;
pub use error::{MvnError, Result};
pub use likelihood::{ComponentwiseNormal, ConstantLikelihood, FnLikelihood, LogLikelihood};
pub use prior::WhitenedGaussianPrior;
pub use random::RandomSource;
pub use sampler::{
    AdaptiveComponentSampler, FixedPrior, MetropolisSettings, PriorParams, SamplerState,
    SweepStats,
};
pub use shield::{Component, ShieldedVector, SubscriptionId};
pub use tune::{acceptance_rate, scale_adjustment, TuneReport, TuneReporter};
pub use vector::{StoredVector, VectorValue};
