//! Log-likelihood of the rest of the model.
//!
//! The sampler re-evaluates the likelihood after every single-coordinate
//! proposal, so implementations should cache per-component work behind
//! [`Cached`] values that depend on the [`Component`] proxies they read.

use std::convert::Infallible;
use std::f64::consts::PI;

use crate::cache::Cached;
use crate::error::{check_dim, MvnError, Result};
use crate::shield::Component;

pub trait LogLikelihood {
    type Err: std::error::Error + Send + Sync + 'static;

    /// The current log-likelihood given the current state of the model.
    fn log_likelihood(&mut self) -> std::result::Result<f64, Self::Err>;
}

impl<L: LogLikelihood + ?Sized> LogLikelihood for &mut L {
    type Err = L::Err;

    fn log_likelihood(&mut self) -> std::result::Result<f64, Self::Err> {
        (**self).log_likelihood()
    }
}

/// A likelihood that does not depend on the sampled vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantLikelihood(pub f64);

impl LogLikelihood for ConstantLikelihood {
    type Err = Infallible;

    fn log_likelihood(&mut self) -> std::result::Result<f64, Infallible> {
        Ok(self.0)
    }
}

/// Wrap an infallible closure as a likelihood.
pub struct FnLikelihood<F>(pub F);

impl<F: FnMut() -> f64> LogLikelihood for FnLikelihood<F> {
    type Err = Infallible;

    fn log_likelihood(&mut self) -> std::result::Result<f64, Infallible> {
        Ok((self.0)())
    }
}

#[derive(Debug)]
struct NormalTerm {
    component: Component,
    observed: f64,
    sd: f64,
    logp: Cached<f64>,
}

/// `sum_i log N(observed[i] | x[i], sd[i])`, with each term cached on its
/// own component of `x`.
#[derive(Debug)]
pub struct ComponentwiseNormal {
    terms: Vec<NormalTerm>,
}

impl ComponentwiseNormal {
    pub fn new(components: &[Component], observed: Vec<f64>, sd: Vec<f64>) -> Result<Self> {
        check_dim("observations", components.len(), observed.len())?;
        check_dim("observation sd", components.len(), sd.len())?;
        if let Some(bad) = sd.iter().find(|sd| !(sd.is_finite() && **sd > 0.)) {
            return Err(MvnError::InvalidSetting(format!(
                "observation sd must be positive and finite, got {bad}"
            )));
        }
        let terms = components
            .iter()
            .zip(observed)
            .zip(sd)
            .map(|((component, observed), sd)| NormalTerm {
                component: component.clone(),
                observed,
                sd,
                logp: Cached::depending_on([component]),
            })
            .collect();
        Ok(Self { terms })
    }

    /// Total number of term evaluations so far.
    pub fn recomputations(&self) -> u64 {
        self.terms.iter().map(|term| term.logp.recomputations()).sum()
    }
}

impl LogLikelihood for ComponentwiseNormal {
    type Err = Infallible;

    fn log_likelihood(&mut self) -> std::result::Result<f64, Infallible> {
        let total: f64 = self
            .terms
            .iter_mut()
            .map(|term| {
                let NormalTerm {
                    component,
                    observed,
                    sd,
                    logp,
                } = term;
                *logp.get_or_compute(|| {
                    let z = (*observed - component.value()) / *sd;
                    -0.5 * z * z - sd.ln() - 0.5 * (2. * PI).ln()
                })
            })
            .sum();
        Ok(total)
    }
}
