use derive_more::Display;
use serde::{Deserialize, Serialize};

use boa_outcome_utils::{Outcome, UtilityFunction};

use crate::frontier::{efficiency, pareto_frontier_of, utility_points, OutcomePoint};
use crate::nash::{nash_point_of, nash_product};

/// Properties of a single outcome with respect to both parties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeAnalysis {
    pub outcome: Outcome,
    pub own_utility: f64,
    pub opponent_utility: f64,
    pub nash_product: f64,
    pub social_welfare: f64,
    pub efficiency: f64,
    pub individually_rational: bool,
    pub pareto_optimal: bool,
    /// Euclidean distance to the Nash point in utility space.
    pub distance_from_nash: Option<f64>,
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictLevel {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sensitivity {
    /// Pearson correlation of own and opponent utilities over the outcome space.
    pub correlation: f64,
    pub conflict: ConflictLevel,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainAnalysis {
    pub own_reservation: f64,
    pub opponent_reservation: f64,
    pub pareto_frontier: Vec<OutcomePoint>,
    pub nash_point: Option<OutcomePoint>,
    pub max_social_welfare: f64,
    pub sensitivity: Sensitivity,
    pub outcomes: Vec<OutcomeAnalysis>,
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    Opening,
    /// Offering party lowered its own utility.
    Concession,
    /// Offering party raised its own utility.
    Improvement,
    Lateral,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepClassification {
    pub step: usize,
    pub outcome: Outcome,
    pub utility: f64,
    pub kind: StepKind,
    pub above_reservation: bool,
}

const LATERAL_TOLERANCE: f64 = 1e-9;

/// Full offline analysis of `outcomes` for a pair of profiles.
pub fn analyze(
    own: &UtilityFunction,
    opponent: &UtilityFunction,
    own_reservation: f64,
    opponent_reservation: f64,
    outcomes: &[Outcome],
) -> DomainAnalysis {
    let points = utility_points(own, opponent, outcomes);
    let frontier = pareto_frontier_of(points.clone());
    let nash = nash_point_of(&frontier, own_reservation, opponent_reservation);

    let analyses = points
        .iter()
        .map(|point| {
            describe(
                point,
                &frontier,
                nash.as_ref(),
                own_reservation,
                opponent_reservation,
            )
        })
        .collect::<Vec<_>>();

    DomainAnalysis {
        own_reservation,
        opponent_reservation,
        max_social_welfare: frontier
            .iter()
            .map(OutcomePoint::welfare)
            .fold(0.0, f64::max),
        sensitivity: sensitivity_of(&points),
        pareto_frontier: frontier,
        nash_point: nash,
        outcomes: analyses,
    }
}

impl DomainAnalysis {
    pub fn is_pareto_optimal(&self, outcome: &Outcome) -> bool {
        self.pareto_frontier
            .iter()
            .any(|point| &point.outcome == outcome)
    }

    pub fn is_nash_point(&self, outcome: &Outcome) -> bool {
        self.nash_point
            .as_ref()
            .map(|nash| &nash.outcome == outcome)
            .unwrap_or(false)
    }

    pub fn outcome(&self, outcome: &Outcome) -> Option<&OutcomeAnalysis> {
        self.outcomes
            .iter()
            .find(|analysis| &analysis.outcome == outcome)
    }
}

/// Analysis of a single agreement against precomputed domain analysis.
pub fn analyze_outcome(
    outcome: &Outcome,
    own: &UtilityFunction,
    opponent: &UtilityFunction,
    domain: &DomainAnalysis,
) -> OutcomeAnalysis {
    let point = OutcomePoint {
        outcome: outcome.clone(),
        own: own.utility(outcome),
        opponent: opponent.utility(outcome),
    };
    describe(
        &point,
        &domain.pareto_frontier,
        domain.nash_point.as_ref(),
        domain.own_reservation,
        domain.opponent_reservation,
    )
}

fn describe(
    point: &OutcomePoint,
    frontier: &[OutcomePoint],
    nash: Option<&OutcomePoint>,
    own_reservation: f64,
    opponent_reservation: f64,
) -> OutcomeAnalysis {
    OutcomeAnalysis {
        outcome: point.outcome.clone(),
        own_utility: point.own,
        opponent_utility: point.opponent,
        nash_product: nash_product(point, own_reservation, opponent_reservation).max(0.0),
        social_welfare: point.welfare(),
        efficiency: efficiency(point, frontier),
        individually_rational: point.own >= own_reservation
            && point.opponent >= opponent_reservation,
        pareto_optimal: frontier.iter().any(|member| member.outcome == point.outcome),
        distance_from_nash: nash.map(|nash| {
            ((point.own - nash.own).powi(2) + (point.opponent - nash.opponent).powi(2)).sqrt()
        }),
    }
}

pub fn sensitivity(
    own: &UtilityFunction,
    opponent: &UtilityFunction,
    outcomes: &[Outcome],
) -> Sensitivity {
    sensitivity_of(&utility_points(own, opponent, outcomes))
}

fn sensitivity_of(points: &[OutcomePoint]) -> Sensitivity {
    let correlation = pearson(
        &points.iter().map(|p| p.own).collect::<Vec<_>>(),
        &points.iter().map(|p| p.opponent).collect::<Vec<_>>(),
    );

    let conflict = if correlation < -0.5 {
        ConflictLevel::High
    } else if correlation < 0.5 {
        ConflictLevel::Medium
    } else {
        ConflictLevel::Low
    };

    Sensitivity {
        correlation,
        conflict,
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }

    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(ys[..n].iter()) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Classifies consecutive offers of one party from the perspective of its own utility.
pub fn classify_steps(
    offers: &[Outcome],
    offerer: &UtilityFunction,
    offerer_reservation: f64,
) -> Vec<StepClassification> {
    let mut previous: Option<f64> = None;

    offers
        .iter()
        .enumerate()
        .map(|(idx, outcome)| {
            let utility = offerer.utility(outcome);
            let kind = match previous {
                None => StepKind::Opening,
                Some(prev) if utility < prev - LATERAL_TOLERANCE => StepKind::Concession,
                Some(prev) if utility > prev + LATERAL_TOLERANCE => StepKind::Improvement,
                Some(_) => StepKind::Lateral,
            };
            previous = Some(utility);

            StepClassification {
                step: idx + 1,
                outcome: outcome.clone(),
                utility,
                kind,
                above_reservation: utility > offerer_reservation,
            }
        })
        .collect()
}
