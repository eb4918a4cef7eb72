use anyhow::{anyhow, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use boa_analysis::{pareto_frontier_of, OutcomePoint};
use boa_negotiator_component::{
    BiddingStrategy, ComponentFactory, DegenerateDomainError, NegotiationSetup, NegotiationState,
    OpponentModel, Phase,
};
use boa_outcome_utils::{Outcome, ScoredOutcome};

/// Time-dependent bidding with phase-dependent concession speed.
///
/// Target utility follows `r + (1 - r) * (1 - t^beta(t))`. Beta starts
/// at `beta_early` (Boulware, slow concession) and blends smoothly into
/// `beta_late` (Conceder) around `pivot`. Since beta never grows with time,
/// the target is non-increasing in t for every configuration.
pub struct TimeDependentBidding {
    setup: NegotiationSetup,
    config: Config,
    /// Own utility of every outcome for enumerated domains, in outcome order.
    scored: Option<Vec<ScoredOutcome>>,
    rng: StdRng,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub beta_early: f64,
    pub beta_late: f64,
    /// Time of switch from Conservative to Concessive phase.
    pub pivot: f64,
    /// Width of time interval around `pivot` in which beta is interpolated.
    /// Zero makes beta switch abruptly.
    pub blend: f64,
    /// Half-width of own utility band around target for candidate offers.
    pub tolerance: f64,
    /// Widens the band when the opponent concedes, so we reciprocate.
    pub reciprocity: f64,
    pub opponent_weight: f64,
    pub novelty_weight: f64,
    /// Bonus for candidates on Pareto frontier w.r.t. estimated opponent profile.
    pub pareto_bias: f64,
    /// Number of our recent offers remembered for novelty scoring.
    pub novelty_memory: usize,
    /// Novelty lost for every repetition in memory.
    pub novelty_penalty: f64,
    /// Probability of proposing random candidate instead of best scored one.
    pub exploration: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            beta_early: 4.0,
            beta_late: 0.8,
            pivot: 0.6,
            blend: 0.2,
            tolerance: 0.05,
            reciprocity: 0.5,
            opponent_weight: 0.6,
            novelty_weight: 0.3,
            pareto_bias: 0.1,
            novelty_memory: 5,
            novelty_penalty: 0.2,
            exploration: 0.0,
        }
    }
}

impl Config {
    fn validate(&self) -> anyhow::Result<()> {
        if !(self.beta_early > 0.0 && self.beta_late > 0.0) {
            bail!(
                "Concession exponents must be positive, got beta_early: {}, beta_late: {}",
                self.beta_early,
                self.beta_late
            );
        }
        if self.beta_late > self.beta_early {
            bail!(
                "beta_late ({}) can't exceed beta_early ({}), target utility would grow in time",
                self.beta_late,
                self.beta_early
            );
        }
        if !(0.0..=1.0).contains(&self.pivot) || self.blend < 0.0 {
            bail!("Invalid pivot {} or blend {}", self.pivot, self.blend);
        }
        if self.tolerance < 0.0
            || self.opponent_weight < 0.0
            || self.novelty_weight < 0.0
            || self.pareto_bias < 0.0
            || !(0.0..=1.0).contains(&self.exploration)
        {
            bail!("Bidding tolerance, score weights and exploration rate must be non-negative");
        }
        Ok(())
    }
}

impl ComponentFactory for TimeDependentBidding {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        setup: &NegotiationSetup,
    ) -> anyhow::Result<TimeDependentBidding> {
        let config: Config = match config {
            serde_yaml::Value::Null => Config::default(),
            config => serde_yaml::from_value(config)?,
        };
        TimeDependentBidding::with_config(setup.clone(), config)
    }
}

impl TimeDependentBidding {
    pub fn with_config(
        setup: NegotiationSetup,
        config: Config,
    ) -> anyhow::Result<TimeDependentBidding> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(setup.seed);
        let scored = match setup.space.is_enumerated() {
            true => Some(
                setup
                    .space
                    .outcomes(&mut rng)
                    .iter()
                    .map(|outcome| ScoredOutcome {
                        utility: setup.utility.utility(outcome),
                        outcome: outcome.clone(),
                    })
                    .collect(),
            ),
            false => None,
        };

        Ok(TimeDependentBidding {
            setup,
            config,
            scored,
            rng,
        })
    }

    /// Concession exponent at relative time `time`.
    pub fn beta(&self, time: f64) -> f64 {
        let Config {
            beta_early,
            beta_late,
            pivot,
            blend,
            ..
        } = self.config;

        if blend <= 0.0 {
            return match time < pivot {
                true => beta_early,
                false => beta_late,
            };
        }

        let x = ((time - (pivot - blend / 2.0)) / blend).clamp(0.0, 1.0);
        let smooth = x * x * (3.0 - 2.0 * x);
        beta_early + (beta_late - beta_early) * smooth
    }

    fn space_outcomes(&mut self) -> Vec<ScoredOutcome> {
        match &self.scored {
            Some(scored) => scored.clone(),
            None => {
                let utility = &self.setup.utility;
                self.setup
                    .space
                    .outcomes(&mut self.rng)
                    .iter()
                    .map(|outcome| ScoredOutcome {
                        utility: utility.utility(outcome),
                        outcome: outcome.clone(),
                    })
                    .collect()
            }
        }
    }

    fn select(
        &mut self,
        target: f64,
        tolerance: f64,
        state: &NegotiationState,
        opponent: &dyn OpponentModel,
    ) -> Result<Outcome, DegenerateDomainError> {
        let low = (target - tolerance).max(self.setup.reservation);
        let high = target + tolerance;

        let outcomes = self.space_outcomes();
        let searched = outcomes.len();
        let candidates = outcomes
            .into_iter()
            .filter(|scored| scored.utility >= low && scored.utility <= high)
            .map(|scored| OutcomePoint {
                opponent: opponent.estimated_utility(&scored.outcome),
                own: scored.utility,
                outcome: scored.outcome,
            })
            .collect::<Vec<_>>();

        if candidates.is_empty() {
            return Err(DegenerateDomainError {
                low,
                high,
                searched,
            });
        }

        log::debug!(
            "Bidding at t={:.3}: target {target:.3}, {} candidate(s) in [{low:.3}, {high:.3}].",
            state.time,
            candidates.len()
        );

        if self.config.exploration > 0.0 && self.rng.gen::<f64>() < self.config.exploration {
            let idx = self.rng.gen_range(0..candidates.len());
            return Ok(candidates[idx].outcome.clone());
        }

        let frontier = pareto_frontier_of(candidates.clone())
            .into_iter()
            .map(|point| point.outcome)
            .collect::<HashSet<_>>();
        let recent = state.history.recent_own_offers(self.config.novelty_memory);

        let score = |point: &OutcomePoint| {
            let repeats = recent.iter().filter(|offer| ***offer == point.outcome).count();
            let novelty = (1.0 - self.config.novelty_penalty * repeats as f64).max(0.0);
            let bias = match frontier.contains(&point.outcome) {
                true => self.config.pareto_bias,
                false => 0.0,
            };
            self.config.opponent_weight * point.opponent + self.config.novelty_weight * novelty + bias
        };

        candidates
            .iter()
            .map(|point| (point, score(point)))
            .max_by(|(a, score_a), (b, score_b)| {
                score_a
                    .partial_cmp(score_b)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| b.outcome.cmp(&a.outcome))
            })
            .map(|(point, _)| point.outcome.clone())
            .ok_or(DegenerateDomainError {
                low,
                high,
                searched,
            })
    }

    /// Outcome with own utility closest to `target`. Outcomes above our
    /// reservation are preferred, equal distances resolve to smaller outcome.
    fn closest(&mut self, target: f64) -> anyhow::Result<Outcome> {
        let reservation = self.setup.reservation;
        self.space_outcomes()
            .into_iter()
            .min_by(|a, b| {
                let rational = (b.utility >= reservation).cmp(&(a.utility >= reservation));
                rational
                    .then_with(|| {
                        (a.utility - target)
                            .abs()
                            .partial_cmp(&(b.utility - target).abs())
                            .unwrap_or(Ordering::Equal)
                    })
                    .then_with(|| a.outcome.cmp(&b.outcome))
            })
            .map(|scored| scored.outcome)
            .ok_or_else(|| anyhow!("Outcome space is empty, nothing to propose."))
    }
}

impl BiddingStrategy for TimeDependentBidding {
    fn target_utility(&self, time: f64) -> f64 {
        let time = time.clamp(0.0, 1.0);
        let reservation = self.setup.reservation;
        reservation + (1.0 - reservation) * (1.0 - time.powf(self.beta(time)))
    }

    fn phase(&self, time: f64) -> Phase {
        match time < self.config.pivot {
            true => Phase::Conservative,
            false => Phase::Concessive,
        }
    }

    fn reservation(&self) -> f64 {
        self.setup.reservation
    }

    fn propose(
        &mut self,
        state: &NegotiationState,
        opponent: &dyn OpponentModel,
    ) -> anyhow::Result<Outcome> {
        let target = self.target_utility(state.time);
        let reciprocation = (1.0 + self.config.reciprocity * opponent.concession_rate()).min(2.0);
        let tolerance = self.config.tolerance * reciprocation;

        match self.select(target, tolerance, state, opponent) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                log::debug!("{e}. Falling back to outcome closest to target {target:.3}.");
                self.closest(target)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_negotiator_component::{OfferHistory, OfferRecord, Party, TrendPoint};
    use boa_outcome_utils::{Domain, Issue, OutcomeSpace, UtilityFunction};
    use test_case::test_case;

    struct KnownOpponent {
        profile: UtilityFunction,
    }

    impl OpponentModel for KnownOpponent {
        fn update(&mut self, _history: &OfferHistory) -> anyhow::Result<()> {
            Ok(())
        }
        fn profile(&self) -> &UtilityFunction {
            &self.profile
        }
        fn estimated_reservation(&self) -> f64 {
            0.0
        }
        fn concession_rate(&self) -> f64 {
            0.0
        }
        fn utility_trend(&self) -> &[TrendPoint] {
            &[]
        }
        fn observed_offers(&self) -> usize {
            0
        }
        fn confidence(&self) -> f64 {
            1.0
        }
    }

    fn domain() -> Domain {
        Domain::new(vec![
            Issue::new("Destination", &["Paris", "Rome"]),
            Issue::new("Duration", &["1 week", "2 weeks"]),
            Issue::new("Lodging", &["Hotel", "Hostel"]),
        ])
        .unwrap()
    }

    fn own_profile(domain: &Domain) -> UtilityFunction {
        UtilityFunction::new(
            domain,
            vec![0.5, 0.3, 0.2],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]],
        )
        .unwrap()
    }

    fn opponent() -> KnownOpponent {
        let domain = domain();
        KnownOpponent {
            profile: UtilityFunction::new(
                &domain,
                vec![0.5, 0.2, 0.3],
                vec![vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]],
            )
            .unwrap(),
        }
    }

    fn bidding(reservation: f64, config: Config) -> TimeDependentBidding {
        let domain = domain();
        let setup = NegotiationSetup::new(
            OutcomeSpace::new(domain.clone()),
            own_profile(&domain),
            reservation,
        );
        TimeDependentBidding::with_config(setup, config).unwrap()
    }

    /// Pure Boulware curve `1 - t^4` up to the deadline.
    fn boulware() -> Config {
        Config {
            pivot: 1.0,
            blend: 0.0,
            tolerance: 0.15,
            ..Config::default()
        }
    }

    fn state(time: f64) -> NegotiationState {
        NegotiationState {
            time,
            round: 0,
            history: Default::default(),
        }
    }

    #[test_case(0.0; "zero reservation")]
    #[test_case(0.3; "typical reservation")]
    #[test_case(0.75; "high reservation")]
    fn test_target_boundaries(reservation: f64) {
        let bidding = bidding(reservation, Config::default());
        assert!((bidding.target_utility(0.0) - 1.0).abs() < 1e-12);
        assert!((bidding.target_utility(1.0) - reservation).abs() < 1e-12);
    }

    #[test_case(Config::default(); "smooth blend")]
    #[test_case(Config { blend: 0.0, ..Config::default() }; "abrupt switch")]
    #[test_case(Config { beta_early: 1.0, beta_late: 1.0, ..Config::default() }; "linear")]
    fn test_target_non_increasing(config: Config) {
        let bidding = bidding(0.3, config);
        let mut previous = bidding.target_utility(0.0);
        for step in 1..=1000 {
            let target = bidding.target_utility(step as f64 / 1000.0);
            assert!(target <= previous + 1e-12, "Target grows at step {step}");
            previous = target;
        }
    }

    #[test]
    fn test_boulware_then_conceder() {
        let bidding = bidding(0.0, Config::default());
        // Slow early concession, fast late concession.
        assert!(bidding.target_utility(0.3) > 0.95);
        assert!(bidding.beta(0.3) > 1.0);
        assert!(bidding.beta(0.9) < 1.0);
        assert_eq!(bidding.phase(0.3), Phase::Conservative);
        assert_eq!(bidding.phase(0.6), Phase::Concessive);
    }

    #[test]
    fn test_invalid_config() {
        let domain = domain();
        let setup = NegotiationSetup::new(
            OutcomeSpace::new(domain.clone()),
            own_profile(&domain),
            0.3,
        );
        let config = Config {
            beta_early: 0.5,
            beta_late: 2.0,
            ..Config::default()
        };
        assert!(TimeDependentBidding::with_config(setup, config).is_err());
    }

    #[test]
    fn test_first_offer_is_best_outcome() {
        let mut bidding = bidding(0.3, Config::default());
        let offer = bidding.propose(&state(0.0), &opponent()).unwrap();
        // Paris, 2 weeks, Hotel.
        assert_eq!(offer, Outcome::new(vec![0, 1, 0]));
    }

    #[test]
    fn test_prefers_outcome_better_for_opponent() {
        let mut bidding = bidding(0.0, boulware());
        // Band [0.65, 0.95] contains Paris/2 weeks/Hostel (0.8) and Paris/1 week/Hotel (0.7).
        let time = (0.2f64).powf(1.0 / 4.0);
        let offer = bidding.propose(&state(time), &opponent()).unwrap();
        assert!((bidding.target_utility(time) - 0.8).abs() < 1e-9);
        assert_eq!(offer, Outcome::new(vec![0, 1, 1]));
    }

    #[test]
    fn test_novelty_avoids_repeating() {
        let config = Config {
            opponent_weight: 0.1,
            novelty_weight: 1.0,
            pareto_bias: 0.0,
            ..boulware()
        };
        let mut bidding = bidding(0.0, config);
        let time = (0.2f64).powf(1.0 / 4.0);

        let mut state = state(time);
        let first = bidding.propose(&state, &opponent()).unwrap();
        for _ in 0..2 {
            state.history.push(OfferRecord {
                outcome: first.clone(),
                utility: 0.8,
                round: 0,
                time,
                source: Party::Own,
            });
        }

        let second = bidding.propose(&state, &opponent()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_fallback_to_closest_outcome() {
        let config = Config {
            tolerance: 0.0,
            ..boulware()
        };
        let mut bidding = bidding(0.0, config);
        // No outcome has utility exactly 0.95, closest is Paris, 2 weeks, Hotel (1.0).
        let time = (0.05f64).powf(1.0 / 4.0);
        let offer = bidding.propose(&state(time), &opponent()).unwrap();
        assert_eq!(offer, Outcome::new(vec![0, 1, 0]));
    }

    #[test]
    fn test_offer_at_deadline() {
        let mut bidding = bidding(0.47, Config::default());
        let offer = bidding.propose(&state(1.0), &opponent()).unwrap();
        let utility = own_profile(&domain()).utility(&offer);
        assert!(utility >= 0.47);
        // Both outcomes with utility 0.5 are in the band, Rome/2 weeks/Hotel
        // is better for the opponent.
        assert_eq!(offer, Outcome::new(vec![1, 1, 0]));
    }

    #[test]
    fn test_sampled_domain() {
        let issues = (0..6)
            .map(|idx| Issue::new(format!("Issue{idx}"), &["a", "b", "c", "d", "e"]))
            .collect();
        let domain = Domain::new(issues).unwrap();
        let profile = UtilityFunction::new(
            &domain,
            vec![1.0; 6],
            vec![vec![1.0, 0.75, 0.5, 0.25, 0.0]; 6],
        )
        .unwrap();
        let setup = NegotiationSetup::new(
            OutcomeSpace::with_limits(domain.clone(), 1000, 500),
            profile.clone(),
            0.2,
        )
        .with_seed(7);

        let mut bidding = TimeDependentBidding::with_config(setup, Config::default()).unwrap();
        let model = KnownOpponent {
            profile: UtilityFunction::uniform(&domain, 0.5),
        };

        for step in 0..=10 {
            let time = step as f64 / 10.0;
            let offer = bidding.propose(&state(time), &model).unwrap();
            assert!(domain.contains(&offer));
            assert!(profile.utility(&offer) >= 0.2);
        }
    }
}
