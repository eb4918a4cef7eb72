use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Domain, Error, Issue, UtilityFunction};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssueConfig {
    pub name: String,
    pub values: Vec<String>,
}

/// Serializable domain description. Issue order defines outcome ordering.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DomainConfig {
    pub issues: Vec<IssueConfig>,
}

/// Preference profile of one party.
///
/// Evaluations can be given on any scale, they are min-max normalized
/// per issue unless `normalize` is disabled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub weights: BTreeMap<String, f64>,
    pub evaluations: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub reservation_value: Option<f64>,
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

fn default_normalize() -> bool {
    true
}

impl DomainConfig {
    pub fn from_yaml(yaml: &str) -> Result<DomainConfig, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn build(&self) -> Result<Domain, Error> {
        Domain::new(
            self.issues
                .iter()
                .map(|issue| Issue {
                    name: issue.name.clone(),
                    values: issue.values.clone(),
                })
                .collect(),
        )
    }
}

impl From<&Domain> for DomainConfig {
    fn from(domain: &Domain) -> Self {
        DomainConfig {
            issues: domain
                .issues()
                .iter()
                .map(|issue| IssueConfig {
                    name: issue.name.clone(),
                    values: issue.values.clone(),
                })
                .collect(),
        }
    }
}

impl ProfileConfig {
    pub fn from_yaml(yaml: &str) -> Result<ProfileConfig, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn reservation(&self) -> Result<Option<f64>, Error> {
        match self.reservation_value {
            Some(value) if !(0.0..=1.0).contains(&value) => Err(Error::InvalidReservation(value)),
            value => Ok(value),
        }
    }

    pub fn utility_function(&self, domain: &Domain) -> Result<UtilityFunction, Error> {
        for name in self.weights.keys().chain(self.evaluations.keys()) {
            if domain.issue_index(name).is_none() {
                return Err(Error::UnknownIssue(name.clone()));
            }
        }

        let mut weights = Vec::with_capacity(domain.num_issues());
        let mut values = Vec::with_capacity(domain.num_issues());

        for issue in domain.issues() {
            let weight = self
                .weights
                .get(&issue.name)
                .ok_or_else(|| Error::MissingIssue(issue.name.clone()))?;
            let evaluations = self
                .evaluations
                .get(&issue.name)
                .ok_or_else(|| Error::MissingIssue(issue.name.clone()))?;

            for value in evaluations.keys() {
                if issue.value_index(value).is_none() {
                    return Err(Error::UnknownValue {
                        issue: issue.name.clone(),
                        value: value.clone(),
                    });
                }
            }

            let raw = issue
                .values
                .iter()
                .map(|value| {
                    evaluations
                        .get(value)
                        .copied()
                        .ok_or_else(|| Error::InvalidEvaluation {
                            issue: issue.name.clone(),
                            reason: format!("no evaluation for value '{}'", value),
                        })
                })
                .collect::<Result<Vec<f64>, _>>()?;

            weights.push(*weight);
            values.push(match self.normalize {
                true => normalize(&raw),
                false => raw,
            });
        }

        UtilityFunction::new(domain, weights, values)
    }
}

/// Domain together with preferences of both negotiating parties.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub domain: DomainConfig,
    pub own: ProfileConfig,
    pub opponent: ProfileConfig,
}

#[derive(Clone, Debug)]
pub struct Scenario {
    pub domain: Domain,
    pub own: UtilityFunction,
    pub opponent: UtilityFunction,
    /// Missing reservation values default to 0.
    pub own_reservation: f64,
    pub opponent_reservation: f64,
}

impl ScenarioConfig {
    pub fn from_yaml(yaml: &str) -> Result<ScenarioConfig, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn build(&self) -> Result<Scenario, Error> {
        let domain = self.domain.build()?;
        Ok(Scenario {
            own: self.own.utility_function(&domain)?,
            opponent: self.opponent.utility_function(&domain)?,
            own_reservation: self.own.reservation()?.unwrap_or(0.0),
            opponent_reservation: self.opponent.reservation()?.unwrap_or(0.0),
            domain,
        })
    }
}

fn normalize(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max > min {
        raw.iter().map(|value| (value - min) / (max - min)).collect()
    } else {
        raw.iter().map(|value| value.clamp(0.0, 1.0)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Outcome;

    const DOMAIN: &str = r#"
issues:
  - name: location
    values: [Antalya, Barcelona, Milan]
  - name: duration
    values: [1 week, 2 weeks]
"#;

    const PROFILE: &str = r#"
weights:
  location: 0.5
  duration: 0.5
evaluations:
  location: { Antalya: 4, Barcelona: 10, Milan: 2 }
  duration: { 1 week: 3, 2 weeks: 10 }
reservation_value: 0.5
"#;

    #[test]
    fn test_profile_from_yaml() {
        let domain = DomainConfig::from_yaml(DOMAIN).unwrap().build().unwrap();
        let profile = ProfileConfig::from_yaml(PROFILE).unwrap();
        let ufun = profile.utility_function(&domain).unwrap();

        assert_eq!(profile.reservation().unwrap(), Some(0.5));
        assert_eq!(ufun.value_functions()[0], vec![0.25, 1.0, 0.0]);
        assert_eq!(ufun.value_functions()[1], vec![0.0, 1.0]);
        assert_eq!(ufun.evaluate(&Outcome::new(vec![1, 1])).unwrap(), 1.0);
    }

    #[test]
    fn test_profile_unknown_issue() {
        let domain = DomainConfig::from_yaml(DOMAIN).unwrap().build().unwrap();
        let mut profile = ProfileConfig::from_yaml(PROFILE).unwrap();
        profile.weights.insert("food".to_string(), 0.1);

        assert!(matches!(
            profile.utility_function(&domain),
            Err(Error::UnknownIssue(name)) if name == "food"
        ));
    }

    #[test]
    fn test_profile_missing_evaluation() {
        let domain = DomainConfig::from_yaml(DOMAIN).unwrap().build().unwrap();
        let mut profile = ProfileConfig::from_yaml(PROFILE).unwrap();
        profile
            .evaluations
            .get_mut("location")
            .unwrap()
            .remove("Milan");

        assert!(matches!(
            profile.utility_function(&domain),
            Err(Error::InvalidEvaluation { .. })
        ));
    }

    #[test]
    fn test_scenario_from_yaml() {
        let yaml = format!(
            "domain:{}own:{}opponent:\n  weights: {{location: 1, duration: 3}}\n  evaluations:\n    location: {{Antalya: 1, Barcelona: 0, Milan: 0}}\n    duration: {{1 week: 1, 2 weeks: 0}}\n",
            indent(DOMAIN),
            indent(PROFILE)
        );
        let scenario = ScenarioConfig::from_yaml(&yaml).unwrap().build().unwrap();

        assert_eq!(scenario.domain.size(), 6);
        assert_eq!(scenario.own_reservation, 0.5);
        assert_eq!(scenario.opponent_reservation, 0.0);
        assert_eq!(scenario.opponent.weights(), &[0.25, 0.75]);
        assert_eq!(scenario.opponent.utility(&Outcome::new(vec![0, 0])), 1.0);
    }

    fn indent(yaml: &str) -> String {
        yaml.lines()
            .map(|line| format!("  {}\n", line))
            .collect::<String>()
    }

    #[test]
    fn test_invalid_reservation() {
        let mut profile = ProfileConfig::from_yaml(PROFILE).unwrap();
        profile.reservation_value = Some(1.5);
        assert!(profile.reservation().is_err());
    }
}
