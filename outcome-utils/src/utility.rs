use serde::{Deserialize, Serialize};

use crate::{Domain, Error, Outcome};

const WEIGHTS_TOLERANCE: f64 = 1e-9;

/// Additive utility: weighted sum of per-issue value functions.
///
/// Weights are non-negative and always sum to 1, value functions map every
/// issue value into [0, 1], so utility of any valid outcome is in [0, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UtilityFunction {
    issues: Vec<String>,
    weights: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl UtilityFunction {
    /// Weights are renormalized to sum to 1.
    pub fn new(
        domain: &Domain,
        weights: Vec<f64>,
        values: Vec<Vec<f64>>,
    ) -> Result<UtilityFunction, Error> {
        if weights.len() != domain.num_issues() || values.len() != domain.num_issues() {
            return Err(Error::InvalidWeights(format!(
                "expected {} issues, got {} weights and {} value functions",
                domain.num_issues(),
                weights.len(),
                values.len()
            )));
        }

        if let Some(weight) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(Error::InvalidWeights(format!(
                "weight {} is negative or not finite",
                weight
            )));
        }

        let sum: f64 = weights.iter().sum();
        if sum <= WEIGHTS_TOLERANCE {
            return Err(Error::InvalidWeights("weights sum to zero".to_string()));
        }

        for (issue, issue_values) in domain.issues().iter().zip(values.iter()) {
            if issue_values.len() != issue.values.len() {
                return Err(Error::InvalidEvaluation {
                    issue: issue.name.clone(),
                    reason: format!(
                        "expected {} values, got {}",
                        issue.values.len(),
                        issue_values.len()
                    ),
                });
            }
            if let Some(value) = issue_values
                .iter()
                .find(|v| !v.is_finite() || **v < 0.0 || **v > 1.0)
            {
                return Err(Error::InvalidEvaluation {
                    issue: issue.name.clone(),
                    reason: format!("value {} is outside [0, 1]", value),
                });
            }
        }

        Ok(UtilityFunction {
            issues: domain.issues().iter().map(|i| i.name.clone()).collect(),
            weights: weights.into_iter().map(|w| w / sum).collect(),
            values,
        })
    }

    /// Uninformed utility: equal weights and constant value functions.
    pub fn uniform(domain: &Domain, value: f64) -> UtilityFunction {
        let n = domain.num_issues() as f64;
        UtilityFunction {
            issues: domain.issues().iter().map(|i| i.name.clone()).collect(),
            weights: vec![1.0 / n; domain.num_issues()],
            values: domain
                .issues()
                .iter()
                .map(|issue| vec![value.clamp(0.0, 1.0); issue.values.len()])
                .collect(),
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn value_functions(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn evaluate(&self, outcome: &Outcome) -> Result<f64, Error> {
        let values = outcome.values();
        if values.len() != self.weights.len() {
            return Err(Error::OutcomeArity {
                expected: self.weights.len(),
                got: values.len(),
            });
        }

        let mut utility = 0.0;
        for (idx, &value) in values.iter().enumerate() {
            let evaluation =
                self.values[idx]
                    .get(value)
                    .ok_or_else(|| Error::InvalidOutcome {
                        issue: self.issues[idx].clone(),
                        value,
                    })?;
            utility += self.weights[idx] * evaluation;
        }
        Ok(utility.clamp(0.0, 1.0))
    }

    /// Utility of outcome known to belong to the domain, for example produced
    /// by `Domain::outcomes`. Values outside the domain contribute nothing.
    pub fn utility(&self, outcome: &Outcome) -> f64 {
        outcome
            .values()
            .iter()
            .zip(self.weights.iter().zip(self.values.iter()))
            .map(|(&value, (weight, evaluations))| {
                weight * evaluations.get(value).copied().unwrap_or(0.0)
            })
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Issue;

    fn domain() -> Domain {
        Domain::new(vec![
            Issue::new("Destination", &["Paris", "Rome"]),
            Issue::new("Duration", &["1 week", "2 weeks"]),
            Issue::new("Lodging", &["Hotel", "Hostel"]),
        ])
        .unwrap()
    }

    fn ufun() -> UtilityFunction {
        UtilityFunction::new(
            &domain(),
            vec![0.5, 0.3, 0.2],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_evaluate_in_unit_interval() {
        let domain = domain();
        let ufun = ufun();
        for outcome in domain.outcomes() {
            let utility = ufun.evaluate(&outcome).unwrap();
            assert!((0.0..=1.0).contains(&utility));
            assert_eq!(utility, ufun.utility(&outcome));
        }

        let best = Outcome::new(vec![0, 1, 0]);
        assert!((ufun.evaluate(&best).unwrap() - 1.0).abs() < 1e-12);
        let worst = Outcome::new(vec![1, 0, 1]);
        assert_eq!(ufun.evaluate(&worst).unwrap(), 0.0);
    }

    #[test]
    fn test_evaluate_invalid_outcome() {
        let ufun = ufun();
        assert!(matches!(
            ufun.evaluate(&Outcome::new(vec![0, 5, 0])),
            Err(Error::InvalidOutcome { value: 5, ref issue }) if issue == "Duration"
        ));
        assert!(matches!(
            ufun.evaluate(&Outcome::new(vec![0])),
            Err(Error::OutcomeArity { .. })
        ));
    }

    #[test]
    fn test_weights_renormalized() {
        let ufun = UtilityFunction::new(
            &domain(),
            vec![5.0, 3.0, 2.0],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]],
        )
        .unwrap();

        let sum: f64 = ufun.weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((ufun.weights()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_weights() {
        let values = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];
        assert!(UtilityFunction::new(&domain(), vec![0.0, 0.0, 0.0], values.clone()).is_err());
        assert!(UtilityFunction::new(&domain(), vec![1.0, -0.5, 0.5], values.clone()).is_err());
        assert!(UtilityFunction::new(&domain(), vec![1.0, 0.5], values).is_err());
        assert!(UtilityFunction::new(
            &domain(),
            vec![0.5, 0.3, 0.2],
            vec![vec![1.0, 0.0], vec![0.0, 1.5], vec![1.0, 0.0]]
        )
        .is_err());
    }
}
