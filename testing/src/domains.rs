//! Sample negotiation scenarios.
use boa_outcome_utils::{OutcomeSpace, Scenario, ScenarioConfig};

use crate::error::HarnessError;

/// Three binary issues with fully opposed value preferences.
pub const HOLIDAY: &str = r#"
domain:
  issues:
    - name: Destination
      values: [Paris, Rome]
    - name: Duration
      values: [1 week, 2 weeks]
    - name: Lodging
      values: [Hotel, Hostel]
own:
  weights: { Destination: 0.5, Duration: 0.3, Lodging: 0.2 }
  evaluations:
    Destination: { Paris: 1, Rome: 0 }
    Duration: { 1 week: 0, 2 weeks: 1 }
    Lodging: { Hotel: 1, Hostel: 0 }
  reservation_value: 0.3
opponent:
  weights: { Destination: 0.2, Duration: 0.3, Lodging: 0.5 }
  evaluations:
    Destination: { Paris: 0, Rome: 1 }
    Duration: { 1 week: 1, 2 weeks: 0 }
    Lodging: { Hotel: 0, Hostel: 1 }
  reservation_value: 0.3
"#;

/// Party planning with raw preference scores of two party organizers.
pub const PARTY: &str = r#"
domain:
  issues:
    - name: venue
      values: [Hotel, Restaurant, Club]
    - name: food
      values: [Buffet, Plated, Cocktail]
    - name: music
      values: [DJ, Band, Playlist]
    - name: drinks
      values: [Premium, Standard, Basic]
own:
  weights: { venue: 0.3, food: 0.25, music: 0.25, drinks: 0.2 }
  evaluations:
    venue: { Hotel: 1.0, Restaurant: 0.7, Club: 0.4 }
    food: { Buffet: 0.6, Plated: 1.0, Cocktail: 0.8 }
    music: { DJ: 0.7, Band: 1.0, Playlist: 0.3 }
    drinks: { Premium: 1.0, Standard: 0.6, Basic: 0.2 }
  reservation_value: 0.3
  normalize: false
opponent:
  weights: { venue: 0.4, food: 0.2, music: 0.3, drinks: 0.1 }
  evaluations:
    venue: { Club: 1.0, Restaurant: 0.8, Hotel: 0.5 }
    food: { Cocktail: 1.0, Buffet: 0.7, Plated: 0.6 }
    music: { Playlist: 1.0, DJ: 0.8, Band: 0.4 }
    drinks: { Basic: 1.0, Standard: 0.7, Premium: 0.3 }
  reservation_value: 0.3
  normalize: false
"#;

/// Four ternary issues. Both parties value issues in reversed order and
/// prefer opposite ends of every issue, so profiles mirror each other.
pub const SUPPLY: &str = r#"
domain:
  issues:
    - name: price
      values: [high, medium, low]
    - name: delivery
      values: [slow, normal, fast]
    - name: warranty
      values: [short, standard, long]
    - name: payment
      values: [upfront, monthly, deferred]
own:
  weights: { price: 0.4, delivery: 0.3, warranty: 0.2, payment: 0.1 }
  evaluations:
    price: { high: 1, medium: 0.5, low: 0 }
    delivery: { slow: 1, normal: 0.5, fast: 0 }
    warranty: { short: 1, standard: 0.5, long: 0 }
    payment: { upfront: 1, monthly: 0.5, deferred: 0 }
  reservation_value: 0.3
opponent:
  weights: { price: 0.1, delivery: 0.2, warranty: 0.3, payment: 0.4 }
  evaluations:
    price: { high: 0, medium: 0.5, low: 1 }
    delivery: { slow: 0, normal: 0.5, fast: 1 }
    warranty: { short: 0, standard: 0.5, long: 1 }
    payment: { upfront: 0, monthly: 0.5, deferred: 1 }
  reservation_value: 0.3
"#;

pub fn load_scenario(name: &str, yaml: &str) -> anyhow::Result<Scenario> {
    ScenarioConfig::from_yaml(yaml)
        .and_then(|config| config.build())
        .map_err(|e| {
            HarnessError::InvalidScenario {
                name: name.to_string(),
                error: e.to_string(),
            }
            .into()
        })
}

pub fn holiday() -> anyhow::Result<Scenario> {
    load_scenario("holiday", HOLIDAY)
}

pub fn party() -> anyhow::Result<Scenario> {
    load_scenario("party", PARTY)
}

pub fn supply() -> anyhow::Result<Scenario> {
    load_scenario("supply", SUPPLY)
}

/// Scenario seen from the opponent's side.
pub fn swap_sides(scenario: &Scenario) -> Scenario {
    Scenario {
        domain: scenario.domain.clone(),
        own: scenario.opponent.clone(),
        opponent: scenario.own.clone(),
        own_reservation: scenario.opponent_reservation,
        opponent_reservation: scenario.own_reservation,
    }
}

pub fn space(scenario: &Scenario) -> OutcomeSpace {
    OutcomeSpace::new(scenario.domain.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_outcome_utils::Outcome;

    #[test]
    fn test_sample_scenarios_load() {
        assert_eq!(holiday().unwrap().domain.size(), 8);
        assert_eq!(party().unwrap().domain.size(), 81);
        assert_eq!(supply().unwrap().domain.size(), 81);
    }

    #[test]
    fn test_party_keeps_raw_scores() {
        let party = party().unwrap();
        // Club, Plated, Band, Premium
        let outcome = Outcome::new(vec![2, 1, 1, 0]);
        assert!((party.own.utility(&outcome) - 0.82).abs() < 1e-9);
    }

    #[test]
    fn test_supply_profiles_mirror() {
        let supply = supply().unwrap();
        let swapped = swap_sides(&supply);
        // Issue order and value order are both reversed.
        let outcome = Outcome::new(vec![0, 1, 2, 2]);
        let mirrored = Outcome::new(vec![0, 0, 1, 2]);

        let own = supply.own.utility(&outcome);
        assert!((own - 0.55).abs() < 1e-9);
        assert!((own - swapped.own.utility(&mirrored)).abs() < 1e-9);
    }
}
