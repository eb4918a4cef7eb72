use boa_outcome_utils::{Outcome, UtilityFunction};

use crate::frontier::{pareto_frontier, OutcomePoint};

/// Product of both parties' gains above their reservation values.
pub fn nash_product(point: &OutcomePoint, own_reservation: f64, opponent_reservation: f64) -> f64 {
    (point.own - own_reservation) * (point.opponent - opponent_reservation)
}

/// Nash bargaining point over the Pareto frontier of `outcomes`.
///
/// Only individually rational outcomes (both utilities at or above reservation)
/// are considered. `None` if there is no such outcome.
pub fn nash_point(
    own: &UtilityFunction,
    opponent: &UtilityFunction,
    own_reservation: f64,
    opponent_reservation: f64,
    outcomes: &[Outcome],
) -> Option<OutcomePoint> {
    let frontier = pareto_frontier(own, opponent, outcomes);
    nash_point_of(&frontier, own_reservation, opponent_reservation)
}

/// Picks the Nash point from an already computed frontier.
/// Equal products are resolved in favour of the lexicographically smallest outcome.
pub fn nash_point_of(
    frontier: &[OutcomePoint],
    own_reservation: f64,
    opponent_reservation: f64,
) -> Option<OutcomePoint> {
    let mut best: Option<(&OutcomePoint, f64)> = None;

    for point in frontier {
        if point.own < own_reservation || point.opponent < opponent_reservation {
            continue;
        }

        let product = nash_product(point, own_reservation, opponent_reservation);
        best = match best {
            Some((current, current_product))
                if current_product > product
                    || (current_product == product && current.outcome <= point.outcome) =>
            {
                Some((current, current_product))
            }
            _ => Some((point, product)),
        };
    }

    best.map(|(point, _)| point.clone())
}
