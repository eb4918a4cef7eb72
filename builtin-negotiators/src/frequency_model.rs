use serde::{Deserialize, Serialize};

use boa_negotiator_component::{
    ComponentFactory, InsufficientDataWarning, NegotiationSetup, OfferHistory, OfferRecord,
    OpponentModel, TrendPoint,
};
use boa_outcome_utils::{Domain, Outcome, UtilityFunction};

use crate::trend::{monotone_fit, moving_average, project_reservation};

/// Frequency analysis opponent model.
///
/// Values the opponent keeps offering are assumed preferred. Issues on which
/// the opponent rarely changes the value are assumed important to them.
/// The profile is recomputed from the last `window` opponent offers. Their
/// utility trend is scored on a separate concession scale anchored at the
/// opening offer.
pub struct FrequencyOpponentModel {
    domain: Domain,
    config: Config,
    profile: UtilityFunction,
    trend: Vec<TrendPoint>,
    reservation: f64,
    concession_rate: f64,
    observed: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of most recent opponent offers used for estimates.
    pub window: usize,
    /// Added to every issue stability before normalization, so no weight drops to zero.
    pub weight_floor: f64,
    /// Moving average window applied before trend fitting.
    pub smoothing: usize,
    /// Offers needed before trend based estimates replace priors.
    pub min_trend_offers: usize,
    /// Offers after which estimates are considered fully informed.
    pub confident_after: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window: 50,
            weight_floor: 0.1,
            smoothing: 3,
            min_trend_offers: 3,
            confident_after: 10,
        }
    }
}

impl ComponentFactory for FrequencyOpponentModel {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        setup: &NegotiationSetup,
    ) -> anyhow::Result<FrequencyOpponentModel> {
        let config: Config = match config {
            serde_yaml::Value::Null => Config::default(),
            config => serde_yaml::from_value(config)?,
        };
        Ok(FrequencyOpponentModel::with_config(
            setup.space.domain().clone(),
            config,
        ))
    }
}

impl FrequencyOpponentModel {
    pub fn with_config(domain: Domain, config: Config) -> FrequencyOpponentModel {
        FrequencyOpponentModel {
            profile: UtilityFunction::uniform(&domain, 0.5),
            domain,
            config,
            trend: vec![],
            reservation: 0.0,
            concession_rate: 0.0,
            observed: 0,
        }
    }

    /// Laplace-smoothed value frequencies scaled so the most frequent value gets 1.
    fn estimate_values(&self, offers: &[&Outcome]) -> Vec<Vec<f64>> {
        self.domain
            .issues()
            .iter()
            .enumerate()
            .map(|(issue_idx, issue)| {
                if offers.is_empty() {
                    return vec![0.5; issue.values.len()];
                }

                let mut counts = vec![0usize; issue.values.len()];
                for value in offers.iter().filter_map(|offer| offer.value(issue_idx)) {
                    if let Some(count) = counts.get_mut(value) {
                        *count += 1;
                    }
                }

                let max = counts.iter().copied().max().unwrap_or(0) as f64 + 1.0;
                counts
                    .into_iter()
                    .map(|count| (count as f64 + 1.0) / max)
                    .collect()
            })
            .collect()
    }

    /// Issue weights from value stability between consecutive offers.
    fn estimate_weights(&self, offers: &[&Outcome]) -> Vec<f64> {
        let num_issues = self.domain.num_issues();
        if let Some(warning) = InsufficientDataWarning::check("issue weights", offers.len(), 2) {
            log::warn!("{warning}");
            return vec![1.0 / num_issues as f64; num_issues];
        }

        let transitions = (offers.len() - 1) as f64;
        (0..num_issues)
            .map(|issue_idx| {
                let changes = offers
                    .windows(2)
                    .filter(|pair| pair[0].value(issue_idx) != pair[1].value(issue_idx))
                    .count() as f64;
                self.config.weight_floor + (1.0 - changes / transitions)
            })
            .collect()
    }

    /// Opponent self-utility scale for the trend. The opening offer is taken as
    /// the opponent's best outcome, so it always scores 1. Values rank by the
    /// order in which the opponent moved to them and issues weigh by the share
    /// of offers that kept the opening value. Built from the whole history.
    fn concession_profile(&self, offers: &[&Outcome]) -> anyhow::Result<UtilityFunction> {
        let opening = match offers.first() {
            Some(opening) => *opening,
            None => return Ok(UtilityFunction::uniform(&self.domain, 0.5)),
        };

        let mut weights = Vec::with_capacity(self.domain.num_issues());
        let mut values = Vec::with_capacity(self.domain.num_issues());
        for (issue_idx, issue) in self.domain.issues().iter().enumerate() {
            let mut order: Vec<usize> = vec![];
            for value in offers.iter().filter_map(|offer| offer.value(issue_idx)) {
                if !order.contains(&value) {
                    order.push(value);
                }
            }

            let step = match issue.values.len() {
                0 | 1 => 0.0,
                size => 1.0 / (size - 1) as f64,
            };
            let mut scores = vec![0.0; issue.values.len()];
            for (rank, value) in order.into_iter().enumerate() {
                if let Some(score) = scores.get_mut(value) {
                    *score = (1.0 - rank as f64 * step).max(0.0);
                }
            }
            values.push(scores);

            let held = offers
                .iter()
                .filter(|offer| offer.value(issue_idx) == opening.value(issue_idx))
                .count();
            weights.push(held as f64 / offers.len() as f64);
        }

        Ok(UtilityFunction::new(&self.domain, weights, values)?)
    }

    fn estimate_trend(&mut self, history: &OfferHistory) -> anyhow::Result<()> {
        let all = history
            .opponent_offers()
            .map(|record| &record.outcome)
            .filter(|outcome| self.domain.contains(outcome))
            .collect::<Vec<_>>();
        let scale = self.concession_profile(&all)?;

        self.trend = self
            .window(history)
            .iter()
            .map(|record| TrendPoint {
                time: record.time,
                utility: scale.utility(&record.outcome),
            })
            .collect();

        if let Some(warning) = InsufficientDataWarning::check(
            "reservation estimate",
            self.trend.len(),
            self.config.min_trend_offers,
        ) {
            log::warn!("{warning}");
            self.reservation = 0.0;
            self.concession_rate = 0.0;
            return Ok(());
        }

        let smoothed = moving_average(&self.trend, self.config.smoothing);
        self.concession_rate = monotone_fit(&smoothed)
            .map(|fit| (-fit.slope).max(0.0))
            .unwrap_or(0.0);
        self.reservation = project_reservation(&self.trend, self.config.smoothing).unwrap_or(0.0);
        Ok(())
    }

    fn window<'a>(&self, history: &'a OfferHistory) -> Vec<&'a OfferRecord> {
        let offers = history.opponent_offers().collect::<Vec<_>>();
        let skip = offers.len().saturating_sub(self.config.window.max(1));
        offers.into_iter().skip(skip).collect()
    }
}

impl OpponentModel for FrequencyOpponentModel {
    fn update(&mut self, history: &OfferHistory) -> anyhow::Result<()> {
        let records = self.window(history);
        let offers = records
            .iter()
            .map(|record| &record.outcome)
            .filter(|outcome| self.domain.contains(outcome))
            .collect::<Vec<_>>();

        let values = self.estimate_values(&offers);
        let weights = self.estimate_weights(&offers);

        self.profile = UtilityFunction::new(&self.domain, weights, values)?;
        self.observed = history.num_opponent_offers();
        self.estimate_trend(history)?;

        log::trace!(
            "Opponent model after {} offer(s): weights {:?}, reservation {:.3}, concession rate {:.3}",
            self.observed,
            self.profile.weights(),
            self.reservation,
            self.concession_rate
        );
        Ok(())
    }

    fn profile(&self) -> &UtilityFunction {
        &self.profile
    }

    fn estimated_reservation(&self) -> f64 {
        self.reservation
    }

    fn concession_rate(&self) -> f64 {
        self.concession_rate
    }

    fn utility_trend(&self) -> &[TrendPoint] {
        &self.trend
    }

    fn observed_offers(&self) -> usize {
        self.observed
    }

    fn confidence(&self) -> f64 {
        (self.observed as f64 / self.config.confident_after.max(1) as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_negotiator_component::Party;
    use boa_outcome_utils::Issue;
    use test_case::test_case;

    fn domain() -> Domain {
        Domain::new(vec![
            Issue::new("Destination", &["Paris", "Rome", "Oslo"]),
            Issue::new("Duration", &["1 week", "2 weeks"]),
            Issue::new("Lodging", &["Hotel", "Hostel"]),
        ])
        .unwrap()
    }

    fn history(offers: &[[usize; 3]]) -> OfferHistory {
        let mut history = OfferHistory::new();
        for (round, values) in offers.iter().enumerate() {
            history.push(OfferRecord {
                outcome: Outcome::new(values.to_vec()),
                utility: 0.5,
                round: round as u32,
                time: round as f64 / 20.0,
                source: Party::Opponent,
            });
        }
        history
    }

    fn model() -> FrequencyOpponentModel {
        FrequencyOpponentModel::with_config(domain(), Config::default())
    }

    #[test_case(&[]; "no offers")]
    #[test_case(&[[0, 1, 1]]; "single offer")]
    #[test_case(&[[0, 1, 1], [1, 1, 0], [2, 1, 1], [0, 0, 1]]; "several offers")]
    fn test_weights_sum_to_one(offers: &[[usize; 3]]) {
        let mut model = model();
        model.update(&history(offers)).unwrap();

        let sum = model.profile().weights().iter().sum::<f64>();
        assert!((sum - 1.0).abs() < 1e-9);
        for weight in model.profile().weights() {
            assert!(weight.is_finite() && *weight > 0.0);
        }
    }

    #[test]
    fn test_prior_without_offers() {
        let mut model = model();
        model.update(&OfferHistory::new()).unwrap();

        let snapshot = model.snapshot();
        assert_eq!(snapshot.observed_offers, 0);
        assert_eq!(snapshot.confidence, 0.0);
        assert_eq!(snapshot.estimated_reservation, 0.0);
        for weight in snapshot.estimated_weights {
            assert!((weight - 1.0 / 3.0).abs() < 1e-12);
        }
        assert!((model.estimated_utility(&Outcome::new(vec![0, 0, 0])) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_stable_issue_gets_highest_weight() {
        // Destination never changes, Lodging changes every time.
        let offers = [[1, 0, 0], [1, 1, 1], [1, 1, 0], [1, 0, 1], [1, 1, 0]];
        let mut model = model();
        model.update(&history(&offers)).unwrap();

        let weights = model.profile().weights();
        assert!(weights[0] > weights[1]);
        assert!(weights[1] > weights[2]);

        // Always offered value is the most preferred one.
        let values = &model.profile().value_functions()[0];
        assert_eq!(values[1], 1.0);
        assert!(values[0] < 1.0);
        assert_eq!(values[0], values[2]);
    }

    #[test]
    fn test_update_is_idempotent() {
        let offers = history(&[[0, 1, 1], [1, 1, 0], [2, 1, 1], [0, 0, 1]]);
        let mut once = model();
        once.update(&offers).unwrap();

        let mut twice = model();
        twice.update(&offers).unwrap();
        twice.update(&offers).unwrap();

        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn test_reservation_within_observed_range() {
        let offers = [
            [1, 1, 1],
            [1, 1, 1],
            [1, 1, 0],
            [1, 0, 1],
            [0, 1, 0],
            [2, 0, 1],
            [0, 0, 0],
        ];
        let mut model = model();
        model.update(&history(&offers)).unwrap();

        let lowest = model
            .utility_trend()
            .iter()
            .map(|point| point.utility)
            .fold(f64::INFINITY, f64::min);
        let reservation = model.estimated_reservation();
        assert!(reservation >= 0.0 && reservation <= lowest);
        assert!(model.concession_rate() >= 0.0);
        assert_eq!(model.utility_trend().len(), offers.len());
    }

    #[test]
    fn test_window_limits_history() {
        let mut model = FrequencyOpponentModel::with_config(
            domain(),
            Config {
                window: 2,
                ..Config::default()
            },
        );
        model
            .update(&history(&[[0, 0, 0], [0, 0, 0], [2, 1, 1], [2, 1, 1]]))
            .unwrap();

        assert_eq!(model.observed_offers(), 4);
        assert_eq!(model.utility_trend().len(), 2);
        assert_eq!(model.profile().value_functions()[0][2], 1.0);
        assert!(model.profile().value_functions()[0][0] < 1.0);
    }

    #[test]
    fn test_trend_anchored_at_opening_offer() {
        // Opponent gives up Destination first, then Duration, then Lodging.
        let offers = [[2, 1, 1], [1, 1, 1], [0, 1, 1], [0, 0, 1], [0, 0, 0]];
        let mut model = model();
        model.update(&history(&offers)).unwrap();

        let trend = model
            .utility_trend()
            .iter()
            .map(|point| point.utility)
            .collect::<Vec<_>>();
        assert!((trend[0] - 1.0).abs() < 1e-12);
        assert!((trend[1] - 0.9375).abs() < 1e-12);
        assert!((trend[3] - 0.5).abs() < 1e-12);
        assert!(trend[4].abs() < 1e-12);
        assert!(trend.windows(2).all(|pair| pair[1] <= pair[0]));
        assert!(model.concession_rate() > 0.0);
    }

    #[test]
    fn test_repeated_offers_keep_full_utility() {
        // Frequency profile ranks repeated values highest, the trend must not drop.
        let offers = [[1, 0, 1]; 6];
        let mut model = model();
        model.update(&history(&offers)).unwrap();

        for point in model.utility_trend() {
            assert!((point.utility - 1.0).abs() < 1e-12);
        }
        assert_eq!(model.concession_rate(), 0.0);
        assert!((model.estimated_reservation() - 1.0).abs() < 1e-12);
    }
}
