use rand::Rng;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;

use crate::{Domain, Outcome, UtilityFunction};

/// Domains with more outcomes than this are sampled instead of enumerated.
pub const ENUMERATION_THRESHOLD: usize = 10_000;
/// Number of random outcomes drawn per call for sampled domains.
pub const DEFAULT_SAMPLE_SIZE: usize = 2_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredOutcome {
    pub outcome: Outcome,
    pub utility: f64,
}

/// Source of outcomes for analysis and candidate generation.
///
/// Small domains are enumerated once and kept in lexicographic order.
/// Large domains produce a fresh sample on every `outcomes` call, so callers
/// control reproducibility through the rng they pass.
#[derive(Clone, Debug)]
pub struct OutcomeSpace {
    domain: Domain,
    enumerated: Option<Vec<Outcome>>,
    sample_size: usize,
}

impl OutcomeSpace {
    pub fn new(domain: Domain) -> OutcomeSpace {
        Self::with_limits(domain, ENUMERATION_THRESHOLD, DEFAULT_SAMPLE_SIZE)
    }

    pub fn with_limits(domain: Domain, threshold: usize, sample_size: usize) -> OutcomeSpace {
        let enumerated = match domain.size() <= threshold {
            true => Some(domain.outcomes().collect()),
            false => None,
        };

        OutcomeSpace {
            domain,
            enumerated,
            sample_size: sample_size.max(1),
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn is_enumerated(&self) -> bool {
        self.enumerated.is_some()
    }

    /// All outcomes for enumerated domains, otherwise deduplicated sorted sample.
    pub fn outcomes<R: Rng + ?Sized>(&self, rng: &mut R) -> Cow<'_, [Outcome]> {
        match &self.enumerated {
            Some(outcomes) => Cow::Borrowed(outcomes),
            None => {
                let mut sample = (0..self.sample_size)
                    .map(|_| self.domain.random_outcome(rng))
                    .collect::<Vec<_>>();
                sample.sort();
                sample.dedup();
                Cow::Owned(sample)
            }
        }
    }

    /// Outcomes with their utility, best first. Equal utilities keep lexicographic order.
    pub fn ranked<R: Rng + ?Sized>(
        &self,
        ufun: &UtilityFunction,
        rng: &mut R,
    ) -> Vec<ScoredOutcome> {
        let mut scored = self
            .outcomes(rng)
            .iter()
            .map(|outcome| ScoredOutcome {
                utility: ufun.utility(outcome),
                outcome: outcome.clone(),
            })
            .collect::<Vec<_>>();

        scored.sort_by(|a, b| {
            b.utility
                .partial_cmp(&a.utility)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.outcome.cmp(&b.outcome))
        });
        scored
    }
}
