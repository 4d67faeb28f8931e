use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{check_dim, MvnError, Result},
    likelihood::LogLikelihood,
    math::{all_finite, whitened_logp},
    prior::WhitenedGaussianPrior,
    random::RandomSource,
    shield::ShieldedVector,
    tune::{acceptance_rate, scale_adjustment, TuneReport, TuneReporter},
    vector::{StoredVector, VectorValue},
};

/// Settings for the adaptive single-component Metropolis sampler
#[derive(Debug, Clone, PartialEq)]
pub struct MetropolisSettings {
    /// Base standard deviation of the proposal for each coordinate. If this
    /// is `None`, the absolute initial value is used, with zeros replaced
    /// by one.
    pub proposal_sd: Option<Vec<f64>>,
    /// Starting value of the per-coordinate adaptive scale factor.
    pub initial_scale_factor: f64,
    /// Log the tuning diagnostics at info level if this is larger than zero.
    pub verbose: u8,
}

impl Default for MetropolisSettings {
    fn default() -> Self {
        Self {
            proposal_sd: None,
            initial_scale_factor: 1.,
            verbose: 0,
        }
    }
}

/// Supplies the prior mean and covariance factor before every sweep.
pub trait PriorParams {
    fn refresh(&mut self, prior: &mut WhitenedGaussianPrior) -> Result<()>;
}

/// Prior parameters that never change during sampling.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPrior;

impl PriorParams for FixedPrior {
    fn refresh(&mut self, _prior: &mut WhitenedGaussianPrior) -> Result<()> {
        Ok(())
    }
}

impl<F: FnMut(&mut WhitenedGaussianPrior) -> Result<()>> PriorParams for F {
    fn refresh(&mut self, prior: &mut WhitenedGaussianPrior) -> Result<()> {
        self(prior)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepStats {
    pub accepted: usize,
    pub rejected: usize,
    /// Whitened log prior density after the sweep
    pub logp: f64,
    pub loglike: f64,
}

/// The adaptation state of a sampler, for checkpointing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerState {
    pub accepted: Vec<u64>,
    pub rejected: Vec<u64>,
    pub adaptive_scale_factor: Vec<f64>,
}

/// Sequential-scan Metropolis sampler for a vector with a multivariate
/// normal prior.
///
/// Each sweep proposes a Gaussian perturbation of one coordinate at a time
/// and accepts or rejects it before moving to the next coordinate. The
/// prior is evaluated incrementally in whitened coordinates and the value
/// is changed through a [`ShieldedVector`], so a likelihood that caches on
/// the component proxies only recomputes the terms of the coordinate that
/// moved.
pub struct AdaptiveComponentSampler<L, P = FixedPrior, Q: VectorValue = StoredVector> {
    vector: ShieldedVector<Q>,
    prior: WhitenedGaussianPrior,
    likelihood: L,
    prior_params: P,
    proposal_sd: Vec<f64>,
    adaptive_scale_factor: Vec<f64>,
    accepted: Vec<u64>,
    rejected: Vec<u64>,
    verbose: u8,
    reporter: Option<Box<dyn TuneReporter>>,
}

impl<L: LogLikelihood, Q: VectorValue> AdaptiveComponentSampler<L, FixedPrior, Q> {
    pub fn new(
        vector: ShieldedVector<Q>,
        prior: WhitenedGaussianPrior,
        likelihood: L,
        settings: MetropolisSettings,
    ) -> Result<Self> {
        Self::with_prior_params(vector, prior, likelihood, FixedPrior, settings)
    }
}

impl<L: LogLikelihood, P: PriorParams, Q: VectorValue> AdaptiveComponentSampler<L, P, Q> {
    pub fn with_prior_params(
        vector: ShieldedVector<Q>,
        prior: WhitenedGaussianPrior,
        likelihood: L,
        prior_params: P,
        settings: MetropolisSettings,
    ) -> Result<Self> {
        let n = vector.len();
        check_dim("prior", n, prior.dim())?;

        let proposal_sd = match settings.proposal_sd {
            Some(sd) => {
                check_dim("proposal sd", n, sd.len())?;
                sd
            }
            None => vector
                .value()
                .iter()
                .map(|&val| if val == 0. { 1. } else { val.abs() })
                .collect(),
        };
        if !(all_finite(&proposal_sd) && proposal_sd.iter().all(|&sd| sd > 0.)) {
            return Err(MvnError::InvalidSetting(format!(
                "proposal sd must be positive and finite, got {proposal_sd:?}"
            )));
        }
        let scale = settings.initial_scale_factor;
        if !(scale.is_finite() && scale > 0.) {
            return Err(MvnError::InvalidSetting(format!(
                "initial scale factor must be positive and finite, got {scale}"
            )));
        }

        Ok(Self {
            vector,
            prior,
            likelihood,
            prior_params,
            proposal_sd,
            adaptive_scale_factor: vec![scale; n],
            accepted: vec![0; n],
            rejected: vec![0; n],
            verbose: settings.verbose,
            reporter: None,
        })
    }

    /// Receive a [`TuneReport`] after every call to [`Self::tune`].
    pub fn set_reporter<R: TuneReporter + 'static>(&mut self, reporter: R) {
        self.reporter = Some(Box::new(reporter));
    }

    pub fn dim(&self) -> usize {
        self.vector.len()
    }

    pub fn value(&self) -> &[f64] {
        self.vector.value()
    }

    pub fn vector(&self) -> &ShieldedVector<Q> {
        &self.vector
    }

    /// Mutable access to the sampled vector, for outer drivers that move it
    /// between sweeps.
    pub fn vector_mut(&mut self) -> &mut ShieldedVector<Q> {
        &mut self.vector
    }

    pub fn prior(&self) -> &WhitenedGaussianPrior {
        &self.prior
    }

    pub fn prior_mut(&mut self) -> &mut WhitenedGaussianPrior {
        &mut self.prior
    }

    pub fn likelihood(&self) -> &L {
        &self.likelihood
    }

    pub fn likelihood_mut(&mut self) -> &mut L {
        &mut self.likelihood
    }

    pub fn proposal_sd(&self) -> &[f64] {
        &self.proposal_sd
    }

    pub fn adaptive_scale_factor(&self) -> &[f64] {
        &self.adaptive_scale_factor
    }

    /// The quantities adapted during tuning.
    pub fn tuning_info(&self) -> &[f64] {
        &self.adaptive_scale_factor
    }

    pub fn accepted(&self) -> &[u64] {
        &self.accepted
    }

    pub fn rejected(&self) -> &[u64] {
        &self.rejected
    }

    pub fn state(&self) -> SamplerState {
        SamplerState {
            accepted: self.accepted.clone(),
            rejected: self.rejected.clone(),
            adaptive_scale_factor: self.adaptive_scale_factor.clone(),
        }
    }

    pub fn restore_state(&mut self, state: SamplerState) -> Result<()> {
        check_dim("accepted counts", self.dim(), state.accepted.len())?;
        check_dim("rejected counts", self.dim(), state.rejected.len())?;
        check_dim(
            "adaptive scale factor",
            self.dim(),
            state.adaptive_scale_factor.len(),
        )?;
        self.accepted = state.accepted;
        self.rejected = state.rejected;
        self.adaptive_scale_factor = state.adaptive_scale_factor;
        Ok(())
    }

    /// Run one sweep over all coordinates in index order.
    ///
    /// On error the coordinate that was being proposed is rolled back, so
    /// the vector and its component proxies stay consistent.
    pub fn step<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<SweepStats> {
        let Self {
            vector,
            prior,
            likelihood,
            prior_params,
            proposal_sd,
            adaptive_scale_factor,
            accepted,
            rejected,
            ..
        } = self;

        prior_params.refresh(prior)?;
        check_dim("prior", vector.len(), prior.dim())?;

        let mean = prior.mean().to_vec();
        let scaled_mean = prior.whiten(&mean)?;
        let mut scaled_val = prior.whiten(vector.value())?;
        let mut scaled_val_p = scaled_val.clone();

        let mut logp = whitened_logp(&scaled_val, &scaled_mean);
        let mut loglike = likelihood
            .log_likelihood()
            .map_err(|err| MvnError::LikelihoodFailure(Box::new(err)))?;
        if !(logp + loglike).is_finite() {
            return Err(MvnError::NonFiniteInitial { logp, loglike });
        }

        let mut stats = SweepStats {
            accepted: 0,
            rejected: 0,
            logp,
            loglike,
        };

        for i in 0..vector.len() {
            let sd = proposal_sd[i] * adaptive_scale_factor[i];
            let current = vector.value()[i];
            let proposed = current + rng.normal(sd);
            if !proposed.is_finite() {
                return Err(MvnError::NonFinite {
                    what: "proposal",
                    index: i,
                });
            }
            vector.set_component(i, proposed)?;
            let delta = proposed - current;

            scaled_val_p.copy_from_slice(&scaled_val);
            if let Err(err) = prior.add_incremental_whitened_delta(i, delta, &mut scaled_val_p) {
                vector.revert();
                return Err(err);
            }
            let logp_p = whitened_logp(&scaled_val_p, &scaled_mean);
            let loglike_p = match likelihood.log_likelihood() {
                Ok(val) => val,
                Err(err) => {
                    vector.revert();
                    return Err(MvnError::LikelihoodFailure(Box::new(err)));
                }
            };

            // -inf is a certain rejection, NaN and +inf are errors.
            let total_p = logp_p + loglike_p;
            if total_p.is_nan() || total_p == f64::INFINITY {
                vector.revert();
                return Err(MvnError::NonFinite {
                    what: "proposed log density",
                    index: i,
                });
            }

            if rng.uniform().ln() < total_p - (logp + loglike) {
                std::mem::swap(&mut scaled_val, &mut scaled_val_p);
                logp = logp_p;
                loglike = loglike_p;
                accepted[i] += 1;
                stats.accepted += 1;
            } else {
                vector.revert();
                rejected[i] += 1;
                stats.rejected += 1;
            }
        }

        stats.logp = logp;
        stats.loglike = loglike;
        debug!(
            "sweep accepted {} of {} proposals, logp {:.4}, loglike {:.4}",
            stats.accepted,
            vector.len(),
            logp,
            loglike
        );
        Ok(stats)
    }

    /// Adapt the per-coordinate scale factors to the acceptance rates since
    /// the last call and reset the counters.
    ///
    /// Coordinates without any proposals in the window keep their scale
    /// factor. Returns `true` if any scale factor was changed, in which case
    /// further tuning is needed.
    pub fn tune(&mut self) -> bool {
        let mut still_tuning = false;
        let rates: Vec<Option<f64>> = self
            .accepted
            .iter()
            .zip(self.rejected.iter())
            .zip(self.adaptive_scale_factor.iter_mut())
            .enumerate()
            .map(|(i, ((&accepted, &rejected), scale))| {
                let rate = acceptance_rate(accepted, rejected);
                match rate {
                    None => warn!(
                        "coordinate {i} had no proposals since the last tuning round, keeping its scale factor"
                    ),
                    Some(rate) => {
                        if let Some(factor) = scale_adjustment(rate) {
                            *scale *= factor;
                            still_tuning = true;
                        }
                    }
                }
                rate
            })
            .collect();

        if self.verbose > 0 || self.reporter.is_some() {
            let report = TuneReport {
                value: self.vector.value().to_vec(),
                acceptance_rate: rates,
                adaptive_scale_factor: self.adaptive_scale_factor.clone(),
                still_tuning,
            };
            if self.verbose > 0 {
                info!("value: {:?}", report.value);
                info!("acceptance rate: {:?}", report.acceptance_rate);
                info!("adaptive scale factor: {:?}", report.adaptive_scale_factor);
            }
            if let Some(reporter) = self.reporter.as_mut() {
                reporter.report(&report);
            }
        }

        self.accepted.fill(0);
        self.rejected.fill(0);
        still_tuning
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use faer::Mat;
    use pretty_assertions::assert_eq;
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;
    use crate::likelihood::{ComponentwiseNormal, ConstantLikelihood, FnLikelihood};

    /// Hands out prepared standard normal and uniform draws.
    struct Scripted {
        normals: VecDeque<f64>,
        uniforms: VecDeque<f64>,
    }

    impl Scripted {
        fn new(normals: &[f64], uniforms: &[f64]) -> Self {
            Self {
                normals: normals.iter().copied().collect(),
                uniforms: uniforms.iter().copied().collect(),
            }
        }
    }

    impl RandomSource for Scripted {
        fn normal(&mut self, sd: f64) -> f64 {
            self.normals.pop_front().unwrap() * sd
        }

        fn uniform(&mut self) -> f64 {
            self.uniforms.pop_front().unwrap()
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("likelihood exploded")]
    struct Exploded;

    struct FailAfter(usize);

    impl LogLikelihood for FailAfter {
        type Err = Exploded;

        fn log_likelihood(&mut self) -> std::result::Result<f64, Exploded> {
            if self.0 == 0 {
                return Err(Exploded);
            }
            self.0 -= 1;
            Ok(0.)
        }
    }

    fn identity_sampler(value: Vec<f64>) -> AdaptiveComponentSampler<ConstantLikelihood> {
        let n = value.len();
        AdaptiveComponentSampler::new(
            ShieldedVector::new(value),
            WhitenedGaussianPrior::standard(vec![0.; n]),
            ConstantLikelihood(0.),
            MetropolisSettings::default(),
        )
        .unwrap()
    }

    fn assert_proxies_consistent<L: LogLikelihood, P: PriorParams, Q: VectorValue>(
        sampler: &AdaptiveComponentSampler<L, P, Q>,
    ) {
        for (component, value) in sampler.vector().components().iter().zip(sampler.value()) {
            assert_eq!(component.value(), *value);
        }
    }

    #[test]
    fn accepting_sweep() -> anyhow::Result<()> {
        let mut sampler = identity_sampler(vec![0., 0.]);
        let mut rng = Scripted::new(&[0.5, -0.3], &[0., 0.]);
        let stats = sampler.step(&mut rng)?;
        assert_eq!(sampler.value(), &[0.5, -0.3]);
        assert_eq!(sampler.accepted(), &[1, 1]);
        assert_eq!(sampler.rejected(), &[0, 0]);
        assert_eq!(stats.accepted, 2);
        approx::assert_abs_diff_eq!(stats.logp, -0.5 * (0.25 + 0.09), epsilon = 1e-12);
        assert_proxies_consistent(&sampler);
        Ok(())
    }

    #[test]
    fn rejecting_sweep_reverts() -> anyhow::Result<()> {
        let mut sampler = identity_sampler(vec![0., 0.]);
        // Moving away from the mode with a uniform draw close to one rejects.
        let mut rng = Scripted::new(&[3., 0.1], &[0.999, 0.]);
        sampler.step(&mut rng)?;
        assert_eq!(sampler.value(), &[0., 0.1]);
        assert_eq!(sampler.accepted(), &[0, 1]);
        assert_eq!(sampler.rejected(), &[1, 0]);
        assert_eq!(sampler.vector().components()[0].notifications(), 2);
        assert_proxies_consistent(&sampler);
        Ok(())
    }

    #[test]
    fn later_coordinates_see_earlier_updates() -> anyhow::Result<()> {
        // Strong correlation: cov = [[1, 0.9], [0.9, 1]]
        let factor = Mat::from_fn(2, 2, |row, col| match (row, col) {
            (0, 0) => 1.,
            (1, 0) => 0.9,
            (1, 1) => (1f64 - 0.81).sqrt(),
            _ => 0.,
        });
        let prior = WhitenedGaussianPrior::new(vec![0., 0.], factor)?;
        let mut sampler = AdaptiveComponentSampler::new(
            ShieldedVector::new(vec![0., 0.]),
            prior,
            ConstantLikelihood(0.),
            MetropolisSettings::default(),
        )?;
        let mut rng = Scripted::new(&[1., 1.], &[0., 0.]);
        let stats = sampler.step(&mut rng)?;
        let expected = sampler.prior_mut().whitened_log_density(&[1., 1.])?;
        approx::assert_abs_diff_eq!(stats.logp, expected, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn tune_monotonicity() -> anyhow::Result<()> {
        let mut sampler = identity_sampler(vec![0., 0., 0.]);
        sampler.restore_state(SamplerState {
            accepted: vec![0, 10, 3],
            rejected: vec![10, 0, 7],
            adaptive_scale_factor: vec![1., 1., 1.],
        })?;
        assert!(sampler.tune());
        let scale = sampler.adaptive_scale_factor();
        assert!(scale[0] < 1.);
        assert!(scale[1] > 1.);
        assert_eq!(scale[2], 1.);
        assert_eq!(sampler.accepted(), &[0, 0, 0]);
        assert_eq!(sampler.rejected(), &[0, 0, 0]);
        Ok(())
    }

    #[test]
    fn tune_without_data_keeps_scale() {
        let mut sampler = identity_sampler(vec![0., 0.]);
        assert!(!sampler.tune());
        assert_eq!(sampler.adaptive_scale_factor(), &[1., 1.]);
    }

    #[test]
    fn tune_reports() -> anyhow::Result<()> {
        let mut sampler = identity_sampler(vec![0., 0.]);
        let reports = Rc::new(RefCell::new(Vec::new()));
        {
            let reports = reports.clone();
            sampler.set_reporter(move |report: &TuneReport| {
                reports.borrow_mut().push(report.clone())
            });
        }
        let mut rng = Scripted::new(&[0.5, -0.3], &[0., 0.]);
        sampler.step(&mut rng)?;
        assert!(sampler.tune());
        let reports = reports.borrow();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].acceptance_rate, vec![Some(1.), Some(1.)]);
        assert_eq!(reports[0].adaptive_scale_factor, vec![10., 10.]);
        assert_eq!(reports[0].value, vec![0.5, -0.3]);
        Ok(())
    }

    #[test]
    fn likelihood_failure_reverts() {
        let mut sampler = AdaptiveComponentSampler::new(
            ShieldedVector::new(vec![1., 2.]),
            WhitenedGaussianPrior::standard(vec![0.; 2]),
            FailAfter(1),
            MetropolisSettings::default(),
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let err = sampler.step(&mut rng).unwrap_err();
        assert!(matches!(err, MvnError::LikelihoodFailure(_)));
        assert_eq!(sampler.value(), &[1., 2.]);
        assert_proxies_consistent(&sampler);
    }

    #[test]
    fn nan_likelihood_reverts() {
        let calls = Rc::new(RefCell::new(0));
        let like = {
            let calls = calls.clone();
            FnLikelihood(move || {
                *calls.borrow_mut() += 1;
                if *calls.borrow() > 1 {
                    f64::NAN
                } else {
                    0.
                }
            })
        };
        let mut sampler = AdaptiveComponentSampler::new(
            ShieldedVector::new(vec![1., 2.]),
            WhitenedGaussianPrior::standard(vec![0.; 2]),
            like,
            MetropolisSettings::default(),
        )
        .unwrap();
        let mut rng = Scripted::new(&[0.5], &[]);
        let err = sampler.step(&mut rng).unwrap_err();
        assert!(matches!(err, MvnError::NonFinite { index: 0, .. }));
        assert_eq!(sampler.value(), &[1., 2.]);
        assert_proxies_consistent(&sampler);
    }

    #[test]
    fn non_finite_proposal_leaves_vector_untouched() {
        let mut sampler = identity_sampler(vec![1.]);
        let mut rng = Scripted::new(&[f64::NAN], &[]);
        let err = sampler.step(&mut rng).unwrap_err();
        assert!(matches!(err, MvnError::NonFinite { what: "proposal", .. }));
        assert_eq!(sampler.value(), &[1.]);
        assert_eq!(sampler.vector().components()[0].notifications(), 0);
    }

    #[test]
    fn negative_infinite_likelihood_rejects() -> anyhow::Result<()> {
        let like = FnLikelihood({
            let mut first = true;
            move || {
                if std::mem::take(&mut first) {
                    0.
                } else {
                    f64::NEG_INFINITY
                }
            }
        });
        let mut sampler = AdaptiveComponentSampler::new(
            ShieldedVector::new(vec![1.]),
            WhitenedGaussianPrior::standard(vec![0.]),
            like,
            MetropolisSettings::default(),
        )?;
        let mut rng = Scripted::new(&[-0.5], &[0.]);
        sampler.step(&mut rng)?;
        assert_eq!(sampler.value(), &[1.]);
        assert_eq!(sampler.rejected(), &[1]);
        Ok(())
    }

    #[test]
    fn factorization_error_on_step() {
        let bad = Mat::from_fn(2, 2, |_, _| 1.);
        let prior = WhitenedGaussianPrior::new(vec![0., 0.], bad).unwrap();
        let mut sampler = AdaptiveComponentSampler::new(
            ShieldedVector::new(vec![0., 0.]),
            prior,
            ConstantLikelihood(0.),
            MetropolisSettings::default(),
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(
            sampler.step(&mut rng),
            Err(MvnError::Factorization(_))
        ));
        assert_eq!(sampler.value(), &[0., 0.]);
    }

    #[test]
    fn construction_checks() {
        let res = AdaptiveComponentSampler::new(
            ShieldedVector::new(vec![0., 0.]),
            WhitenedGaussianPrior::standard(vec![0.; 3]),
            ConstantLikelihood(0.),
            MetropolisSettings::default(),
        );
        assert!(matches!(res, Err(MvnError::Dimension { .. })));

        let res = AdaptiveComponentSampler::new(
            ShieldedVector::new(vec![0., 0.]),
            WhitenedGaussianPrior::standard(vec![0.; 2]),
            ConstantLikelihood(0.),
            MetropolisSettings {
                proposal_sd: Some(vec![1., -1.]),
                ..Default::default()
            },
        );
        assert!(matches!(res, Err(MvnError::InvalidSetting(_))));

        let res = AdaptiveComponentSampler::new(
            ShieldedVector::new(vec![0.]),
            WhitenedGaussianPrior::standard(vec![0.]),
            ConstantLikelihood(0.),
            MetropolisSettings {
                initial_scale_factor: 0.,
                ..Default::default()
            },
        );
        assert!(matches!(res, Err(MvnError::InvalidSetting(_))));
    }

    #[test]
    fn default_proposal_sd() {
        let sampler = identity_sampler(vec![0., -2., 0.5]);
        assert_eq!(sampler.proposal_sd(), &[1., 2., 0.5]);
    }

    #[test]
    fn restore_state_checks_dim() {
        let mut sampler = identity_sampler(vec![0., 0.]);
        let res = sampler.restore_state(SamplerState {
            accepted: vec![0],
            rejected: vec![0, 0],
            adaptive_scale_factor: vec![1., 1.],
        });
        assert!(matches!(res, Err(MvnError::Dimension { .. })));
    }

    #[test]
    fn prior_params_refreshed_every_sweep() -> anyhow::Result<()> {
        let sweeps = Rc::new(RefCell::new(0usize));
        let params = {
            let sweeps = sweeps.clone();
            move |prior: &mut WhitenedGaussianPrior| {
                *sweeps.borrow_mut() += 1;
                prior.set_mean(vec![*sweeps.borrow() as f64])
            }
        };
        let mut sampler = AdaptiveComponentSampler::with_prior_params(
            ShieldedVector::new(vec![0.]),
            WhitenedGaussianPrior::standard(vec![0.]),
            ConstantLikelihood(0.),
            params,
            MetropolisSettings::default(),
        )?;
        let mut rng = SmallRng::seed_from_u64(1);
        sampler.step(&mut rng)?;
        sampler.step(&mut rng)?;
        assert_eq!(*sweeps.borrow(), 2);
        assert_eq!(sampler.prior().mean(), &[2.]);
        Ok(())
    }

    #[test]
    fn only_moved_terms_recomputed() -> anyhow::Result<()> {
        let n = 6;
        let vector = ShieldedVector::new(vec![0.; n]);
        let like = ComponentwiseNormal::new(vector.components(), vec![1.; n], vec![1.; n])?;
        let mut sampler = AdaptiveComponentSampler::new(
            vector,
            WhitenedGaussianPrior::standard(vec![0.; n]),
            like,
            MetropolisSettings::default(),
        )?;
        let mut rng = SmallRng::seed_from_u64(42);
        sampler.step(&mut rng)?;
        // n for the baseline, then one term per proposal plus at most one
        // more for the previous coordinate if it was reverted.
        assert!(sampler.likelihood().recomputations() <= (3 * n) as u64);
        assert!(sampler.likelihood().recomputations() >= (2 * n) as u64);
        assert_proxies_consistent(&sampler);
        Ok(())
    }
}
