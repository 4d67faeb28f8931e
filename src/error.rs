use thiserror::Error;

#[derive(Error, Debug)]
pub enum MvnError {
    #[error("dimension mismatch in {what}: expected {expected}, found {found}")]
    Dimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid covariance factor: {0}")]
    Factorization(String),
    #[error("non-finite {what} at coordinate {index}")]
    NonFinite { what: &'static str, index: usize },
    #[error("non-finite log density at the start of a sweep (logp {logp}, loglike {loglike})")]
    NonFiniteInitial { logp: f64, loglike: f64 },
    #[error("likelihood evaluation failed")]
    LikelihoodFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("component index {index} out of bounds for vector of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

pub type Result<T> = std::result::Result<T, MvnError>;

pub(crate) fn check_dim(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(MvnError::Dimension {
            what,
            expected,
            found,
        });
    }
    Ok(())
}
