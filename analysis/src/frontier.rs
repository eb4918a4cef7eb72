use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use boa_outcome_utils::{Outcome, UtilityFunction};

/// Outcome placed in the two-dimensional utility space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomePoint {
    pub outcome: Outcome,
    pub own: f64,
    pub opponent: f64,
}

impl OutcomePoint {
    pub fn welfare(&self) -> f64 {
        self.own + self.opponent
    }
}

/// `a` dominates `b` iff it is at least as good for both parties and
/// strictly better for at least one of them.
pub fn dominates(a: &OutcomePoint, b: &OutcomePoint) -> bool {
    a.own >= b.own && a.opponent >= b.opponent && (a.own > b.own || a.opponent > b.opponent)
}

pub fn utility_points(
    own: &UtilityFunction,
    opponent: &UtilityFunction,
    outcomes: &[Outcome],
) -> Vec<OutcomePoint> {
    outcomes
        .iter()
        .map(|outcome| OutcomePoint {
            own: own.utility(outcome),
            opponent: opponent.utility(outcome),
            outcome: outcome.clone(),
        })
        .collect()
}

pub fn pareto_frontier(
    own: &UtilityFunction,
    opponent: &UtilityFunction,
    outcomes: &[Outcome],
) -> Vec<OutcomePoint> {
    pareto_frontier_of(utility_points(own, opponent, outcomes))
}

/// Non-dominated subset of `points`, sorted by own utility ascending.
///
/// Single sweep over points ordered by own utility descending: a point
/// survives if it has the best opponent utility among points with equal own
/// utility and strictly better opponent utility than every point with higher
/// own utility. Duplicated utility pairs all survive, since equal points
/// don't dominate each other.
pub fn pareto_frontier_of(mut points: Vec<OutcomePoint>) -> Vec<OutcomePoint> {
    points.sort_by(|a, b| {
        b.own
            .partial_cmp(&a.own)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.opponent
                    .partial_cmp(&a.opponent)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.outcome.cmp(&b.outcome))
    });

    let mut frontier = Vec::new();
    let mut best_opponent_above = f64::NEG_INFINITY;
    let mut idx = 0;

    while idx < points.len() {
        let own = points[idx].own;
        let group_best = points[idx].opponent;

        let mut end = idx;
        while end < points.len() && points[end].own == own {
            if points[end].opponent == group_best && group_best > best_opponent_above {
                frontier.push(points[end].clone());
            }
            end += 1;
        }

        best_opponent_above = best_opponent_above.max(group_best);
        idx = end;
    }

    frontier.reverse();
    frontier
}

pub fn social_welfare(outcome: &Outcome, own: &UtilityFunction, opponent: &UtilityFunction) -> f64 {
    own.utility(outcome) + opponent.utility(outcome)
}

/// Joint utility of `point` relative to the best joint utility on the frontier.
/// Returns 0 for an empty or zero-welfare frontier.
pub fn efficiency(point: &OutcomePoint, frontier: &[OutcomePoint]) -> f64 {
    let best = frontier
        .iter()
        .map(OutcomePoint::welfare)
        .fold(f64::NEG_INFINITY, f64::max);

    if best <= 0.0 || !best.is_finite() {
        return 0.0;
    }
    point.welfare() / best
}
