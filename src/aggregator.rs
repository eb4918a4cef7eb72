use serde::{Deserialize, Serialize};

use crate::negotiators::SessionResult;

const NASH_TOLERANCE: f64 = 1e-9;

/// Descriptive statistics of a sample. All fields are zero for empty sample.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub percentile_25: f64,
    pub percentile_75: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub sessions: usize,
    pub agreements: usize,
    pub agreement_rate: f64,
    /// Own utility of agreements.
    pub utility: Statistics,
    /// Average over agreements with analysis attached.
    pub avg_social_welfare: Option<f64>,
    pub pareto_rate: Option<f64>,
    pub nash_rate: Option<f64>,
    pub avg_agreement_time: Option<f64>,
}

/// Collects results of many sessions. Results are never modified once added.
#[derive(Clone, Debug, Default)]
pub struct ResultsAggregator {
    results: Vec<SessionResult>,
}

impl ResultsAggregator {
    pub fn new() -> ResultsAggregator {
        ResultsAggregator::default()
    }

    pub fn add(&mut self, result: SessionResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[SessionResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn summary(&self) -> TournamentSummary {
        let agreements = self
            .results
            .iter()
            .filter(|result| result.is_agreement())
            .collect::<Vec<_>>();
        let analyses = agreements
            .iter()
            .filter_map(|result| result.analysis.as_ref())
            .collect::<Vec<_>>();

        let utilities = agreements
            .iter()
            .map(|result| result.utility)
            .collect::<Vec<_>>();
        let times = agreements
            .iter()
            .map(|result| result.time)
            .collect::<Vec<_>>();
        let welfare = analyses
            .iter()
            .map(|analysis| analysis.social_welfare)
            .collect::<Vec<_>>();

        let rate = |count: usize| match analyses.is_empty() {
            true => None,
            false => Some(count as f64 / analyses.len() as f64),
        };

        TournamentSummary {
            sessions: self.results.len(),
            agreements: agreements.len(),
            agreement_rate: match self.results.is_empty() {
                true => 0.0,
                false => agreements.len() as f64 / self.results.len() as f64,
            },
            utility: statistics(&utilities),
            avg_social_welfare: mean(&welfare),
            pareto_rate: rate(analyses.iter().filter(|a| a.pareto_optimal).count()),
            nash_rate: rate(
                analyses
                    .iter()
                    .filter(|a| matches!(a.distance_from_nash, Some(d) if d < NASH_TOLERANCE))
                    .count(),
            ),
            avg_agreement_time: mean(&times),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    match values.is_empty() {
        true => None,
        false => Some(values.iter().sum::<f64>() / values.len() as f64),
    }
}

pub fn statistics(values: &[f64]) -> Statistics {
    let mean = match mean(values) {
        Some(mean) => mean,
        None => return Statistics::default(),
    };

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;

    Statistics {
        count: values.len(),
        mean,
        std: variance.sqrt(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        median: percentile(&sorted, 50.0),
        percentile_25: percentile(&sorted, 25.0),
        percentile_75: percentile(&sorted, 75.0),
    }
}

/// Percentile with linear interpolation between closest ranks.
/// `sorted` must be sorted ascending; `percentile` is in [0, 100].
pub fn percentile(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let rank = percentile.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
