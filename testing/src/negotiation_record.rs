use serde::{Deserialize, Serialize};
use std::fmt;

use boa_negotiators::{Action, Outcome};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum NegotiationStage {
    Action { party: String, action: Action },
    Error { party: String, error: String },
    /// Party reached its deadline and left the negotiation.
    Timeout { party: String },
    InfiniteLoop,
}

/// Everything that happened in single bilateral negotiation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiationRecord {
    pub stages: Vec<NegotiationStage>,
    pub agreement: Option<Outcome>,

    max_steps: usize,
}

impl NegotiationRecord {
    pub fn new(max_steps: usize) -> NegotiationRecord {
        NegotiationRecord {
            stages: vec![],
            agreement: None,
            max_steps,
        }
    }

    pub fn action(&mut self, party: &str, action: Action) {
        if let Action::Accept { outcome } = &action {
            self.agreement = Some(outcome.clone());
        }

        self.stages.push(NegotiationStage::Action {
            party: party.to_string(),
            action,
        });

        if self.num_actions() > self.max_steps {
            self.stages.push(NegotiationStage::InfiniteLoop);
        }
    }

    pub fn error(&mut self, party: &str, e: &anyhow::Error) {
        self.stages.push(NegotiationStage::Error {
            party: party.to_string(),
            error: e.to_string(),
        });
    }

    pub fn timeout(&mut self, party: &str) {
        self.stages.push(NegotiationStage::Timeout {
            party: party.to_string(),
        });
    }

    pub fn is_finished(&self) -> bool {
        self.agreement.is_some()
            || matches!(
                self.stages.last(),
                Some(NegotiationStage::Timeout { .. })
                    | Some(NegotiationStage::Error { .. })
                    | Some(NegotiationStage::InfiniteLoop)
            )
    }

    pub fn num_actions(&self) -> usize {
        self.stages
            .iter()
            .filter(|stage| matches!(stage, NegotiationStage::Action { .. }))
            .count()
    }

    /// Offers made by `party` in order.
    pub fn offers_by(&self, party: &str) -> Vec<&Outcome> {
        self.stages
            .iter()
            .filter_map(|stage| match stage {
                NegotiationStage::Action {
                    party: issuer,
                    action: Action::Offer { outcome },
                } if issuer == party => Some(outcome),
                _ => None,
            })
            .collect()
    }

    /// Name of the party that accepted.
    pub fn accepted_by(&self) -> Option<&str> {
        self.stages.iter().find_map(|stage| match stage {
            NegotiationStage::Action {
                party,
                action: Action::Accept { .. },
            } => Some(party.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for NegotiationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}
