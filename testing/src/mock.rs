use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use boa_negotiators::{Action, Outcome, OutcomeSpace, UtilityFunction};
use boa_outcome_utils::ScoredOutcome;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Concession behaviour of mock opponents. Target utility is
/// `max(floor, 1 - rate * t^exponent)`, never below reservation.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcessionCurve {
    Boulware,
    Conceder,
    Linear,
    Hardliner,
}

impl ConcessionCurve {
    pub const ALL: [ConcessionCurve; 4] = [
        ConcessionCurve::Boulware,
        ConcessionCurve::Conceder,
        ConcessionCurve::Linear,
        ConcessionCurve::Hardliner,
    ];

    pub fn rate(&self) -> f64 {
        match self {
            ConcessionCurve::Boulware => 0.1,
            ConcessionCurve::Conceder => 0.8,
            ConcessionCurve::Linear => 0.5,
            ConcessionCurve::Hardliner => 0.05,
        }
    }

    pub fn exponent(&self) -> f64 {
        match self {
            ConcessionCurve::Boulware => 3.0,
            _ => 1.0,
        }
    }

    fn floor(&self) -> f64 {
        match self {
            ConcessionCurve::Hardliner => 0.8,
            _ => 0.0,
        }
    }

    pub fn target(&self, time: f64, reservation: f64) -> f64 {
        let target = 1.0 - self.rate() * time.powf(self.exponent());
        target.max(self.floor()).max(reservation)
    }

    /// Minimal own utility of offers this opponent accepts.
    pub fn acceptance_threshold(&self, time: f64, reservation: f64) -> f64 {
        match self {
            ConcessionCurve::Conceder => 0.8 * reservation,
            ConcessionCurve::Boulware => {
                reservation + (1.0 - reservation) * (1.0 - time * time)
            }
            ConcessionCurve::Hardliner => (1.5 * reservation).max(0.8),
            ConcessionCurve::Linear => 1.2 * reservation,
        }
    }
}

/// Scripted opponent conceding along fixed curve, regardless of our offers.
pub struct MockOpponent {
    curve: ConcessionCurve,
    utility: UtilityFunction,
    outcomes: Vec<ScoredOutcome>,
    reservation: f64,
    rounds: u32,
    round: u32,
}

impl MockOpponent {
    pub fn new(
        curve: ConcessionCurve,
        space: &OutcomeSpace,
        utility: UtilityFunction,
        rounds: u32,
    ) -> MockOpponent {
        let mut rng = StdRng::seed_from_u64(0);
        let outcomes = space
            .outcomes(&mut rng)
            .iter()
            .map(|outcome| ScoredOutcome {
                utility: utility.utility(outcome),
                outcome: outcome.clone(),
            })
            .collect();

        MockOpponent {
            curve,
            utility,
            outcomes,
            reservation: 0.3,
            rounds,
            round: 0,
        }
    }

    pub fn with_reservation(mut self, reservation: f64) -> MockOpponent {
        self.reservation = reservation;
        self
    }

    pub fn curve(&self) -> ConcessionCurve {
        self.curve
    }

    pub fn utility(&self) -> &UtilityFunction {
        &self.utility
    }

    pub fn time(&self) -> f64 {
        match self.rounds {
            0 | 1 => 1.0,
            rounds => (self.round as f64 / (rounds - 1) as f64).min(1.0),
        }
    }

    /// Least preferred outcome still meeting current target.
    pub fn propose(&self) -> Option<Outcome> {
        let target = self.curve.target(self.time(), self.reservation);
        let by_utility = |a: &&ScoredOutcome, b: &&ScoredOutcome| {
            a.utility
                .partial_cmp(&b.utility)
                .unwrap_or(Ordering::Equal)
        };

        // Equal utilities resolve to the smaller outcome in both cases.
        self.outcomes
            .iter()
            .filter(|scored| scored.utility >= target)
            .min_by(|a, b| by_utility(a, b).then_with(|| a.outcome.cmp(&b.outcome)))
            .or_else(|| {
                self.outcomes
                    .iter()
                    .max_by(|a, b| by_utility(a, b).then_with(|| b.outcome.cmp(&a.outcome)))
            })
            .map(|scored| scored.outcome.clone())
    }

    pub fn accepts(&self, offer: &Outcome) -> bool {
        self.utility.utility(offer) >= self.curve.acceptance_threshold(self.time(), self.reservation)
    }

    /// Accepts `offer` or makes next offer. `None` after the last round.
    pub fn respond(&mut self, offer: Option<&Outcome>) -> Option<Action> {
        if let Some(offer) = offer {
            if self.accepts(offer) {
                return Some(Action::Accept {
                    outcome: offer.clone(),
                });
            }
        }

        if self.round >= self.rounds {
            return None;
        }

        let outcome = self.propose()?;
        self.round += 1;
        Some(Action::Offer { outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ConcessionCurve::Boulware, 0.5, 0.9875; "boulware holds")]
    #[test_case(ConcessionCurve::Conceder, 0.5, 0.6; "conceder drops")]
    #[test_case(ConcessionCurve::Linear, 1.0, 0.5; "linear at deadline")]
    #[test_case(ConcessionCurve::Hardliner, 1.0, 0.95; "hardliner")]
    #[test_case(ConcessionCurve::Conceder, 1.0, 0.3; "reservation floor")]
    fn test_curve_target(curve: ConcessionCurve, time: f64, expected: f64) {
        assert!((curve.target(time, 0.3) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_targets_non_increasing() {
        for curve in ConcessionCurve::ALL {
            let targets = (0..=10)
                .map(|step| curve.target(step as f64 / 10.0, 0.3))
                .collect::<Vec<_>>();
            assert!(targets.windows(2).all(|pair| pair[0] >= pair[1]));
            assert_eq!(targets[0], 1.0);
        }
    }
}
