use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::Error;

/// Negotiable dimension with finite set of values.
/// Values order is meaningful: outcomes are enumerated and tie-broken by value index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub name: String,
    pub values: Vec<String>,
}

/// Assignment of exactly one value to every issue of the `Domain`.
///
/// Stored as value indices in issue order, so ordering of `Outcome`s is
/// lexicographic on issue values. This ordering is used everywhere as
/// the deterministic tie-break.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Outcome(Vec<usize>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    issues: Vec<Issue>,
}

impl Issue {
    pub fn new(name: impl ToString, values: &[&str]) -> Issue {
        Issue {
            name: name.to_string(),
            values: values.iter().map(|value| value.to_string()).collect(),
        }
    }

    pub fn value_index(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|candidate| candidate == value)
    }
}

impl Outcome {
    pub fn new(values: Vec<usize>) -> Outcome {
        Outcome(values)
    }

    pub fn values(&self) -> &[usize] {
        &self.0
    }

    pub fn value(&self, issue: usize) -> Option<usize> {
        self.0.get(issue).copied()
    }
}

impl From<Vec<usize>> for Outcome {
    fn from(values: Vec<usize>) -> Self {
        Outcome(values)
    }
}

impl Domain {
    pub fn new(issues: Vec<Issue>) -> Result<Domain, Error> {
        if issues.is_empty() {
            return Err(Error::EmptyDomain("no issues declared".to_string()));
        }

        let mut names = HashSet::new();
        for issue in &issues {
            if issue.values.is_empty() {
                return Err(Error::EmptyDomain(format!(
                    "issue '{}' has no values",
                    issue.name
                )));
            }
            if !names.insert(issue.name.as_str()) {
                return Err(Error::EmptyDomain(format!(
                    "issue '{}' declared twice",
                    issue.name
                )));
            }
        }
        Ok(Domain { issues })
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn num_issues(&self) -> usize {
        self.issues.len()
    }

    pub fn issue_index(&self, name: &str) -> Option<usize> {
        self.issues.iter().position(|issue| issue.name == name)
    }

    /// Number of enumerable outcomes. Saturates at `usize::MAX`.
    pub fn size(&self) -> usize {
        self.issues
            .iter()
            .fold(1usize, |acc, issue| acc.saturating_mul(issue.values.len()))
    }

    pub fn validate(&self, outcome: &Outcome) -> Result<(), Error> {
        if outcome.0.len() != self.issues.len() {
            return Err(Error::OutcomeArity {
                expected: self.issues.len(),
                got: outcome.0.len(),
            });
        }

        for (issue, &value) in self.issues.iter().zip(outcome.0.iter()) {
            if value >= issue.values.len() {
                return Err(Error::InvalidOutcome {
                    issue: issue.name.clone(),
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, outcome: &Outcome) -> bool {
        self.validate(outcome).is_ok()
    }

    /// Builds `Outcome` from `issue -> value` names. Every issue must be assigned.
    pub fn outcome_from_named<'a>(
        &self,
        assignment: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Outcome, Error> {
        let mut values: Vec<Option<usize>> = vec![None; self.issues.len()];
        for (name, value) in assignment {
            let idx = self
                .issue_index(name)
                .ok_or_else(|| Error::UnknownIssue(name.to_string()))?;
            let value_idx = self.issues[idx]
                .value_index(value)
                .ok_or_else(|| Error::UnknownValue {
                    issue: name.to_string(),
                    value: value.to_string(),
                })?;
            values[idx] = Some(value_idx);
        }

        values
            .into_iter()
            .zip(self.issues.iter())
            .map(|(value, issue)| value.ok_or_else(|| Error::MissingIssue(issue.name.clone())))
            .collect::<Result<Vec<_>, _>>()
            .map(Outcome)
    }

    pub fn named(&self, outcome: &Outcome) -> Result<BTreeMap<String, String>, Error> {
        self.validate(outcome)?;
        Ok(self
            .issues
            .iter()
            .zip(outcome.0.iter())
            .map(|(issue, &value)| (issue.name.clone(), issue.values[value].clone()))
            .collect())
    }

    pub fn display<'a>(&'a self, outcome: &'a Outcome) -> OutcomeDisplay<'a> {
        OutcomeDisplay {
            domain: self,
            outcome,
        }
    }

    /// Enumerates all outcomes in lexicographic order.
    pub fn outcomes(&self) -> OutcomeIter<'_> {
        OutcomeIter {
            domain: self,
            next: Some(vec![0; self.issues.len()]),
        }
    }

    pub fn random_outcome<R: Rng + ?Sized>(&self, rng: &mut R) -> Outcome {
        Outcome(
            self.issues
                .iter()
                .map(|issue| rng.gen_range(0..issue.values.len()))
                .collect(),
        )
    }
}

pub struct OutcomeIter<'a> {
    domain: &'a Domain,
    next: Option<Vec<usize>>,
}

impl<'a> Iterator for OutcomeIter<'a> {
    type Item = Outcome;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        let mut following = current.clone();
        for idx in (0..following.len()).rev() {
            following[idx] += 1;
            if following[idx] < self.domain.issues[idx].values.len() {
                self.next = Some(following);
                break;
            }
            following[idx] = 0;
        }
        Some(Outcome(current))
    }
}

pub struct OutcomeDisplay<'a> {
    domain: &'a Domain,
    outcome: &'a Outcome,
}

impl<'a> fmt::Display for OutcomeDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, issue) in self.domain.issues.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            let value = self
                .outcome
                .value(idx)
                .and_then(|value| issue.values.get(value))
                .map(String::as_str)
                .unwrap_or("?");
            write!(f, "{}: {}", issue.name, value)?;
        }
        write!(f, "}}")
    }
}
