use thiserror::Error;

/// Opponent model has too little evidence and uses priors instead.
/// Reported through logs only.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Opponent model observed {observed} offer(s), needs at least {required} for {estimate}. Using prior.")]
pub struct InsufficientDataWarning {
    pub estimate: &'static str,
    pub observed: usize,
    pub required: usize,
}

impl InsufficientDataWarning {
    pub fn check(estimate: &'static str, observed: usize, required: usize) -> Option<Self> {
        match observed < required {
            true => Some(InsufficientDataWarning {
                estimate,
                observed,
                required,
            }),
            false => None,
        }
    }
}

/// No outcome satisfies candidate filters.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("No candidate outcomes with utility in [{low:.3}, {high:.3}] (searched {searched} outcomes)")]
pub struct DegenerateDomainError {
    pub low: f64,
    pub high: f64,
    pub searched: usize,
}
