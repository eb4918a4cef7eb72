use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use boa_outcome_utils::{Outcome, OutcomeSpace, UtilityFunction};

use crate::history::{NegotiationState, OfferHistory};
use crate::reason::DecisionReason;

/// Immutable description of the session shared by all components:
/// outcome space and our private preferences.
#[derive(Clone, Debug)]
pub struct NegotiationSetup {
    pub space: Arc<OutcomeSpace>,
    pub utility: UtilityFunction,
    pub reservation: f64,
    /// Seed for all randomized decisions, so sessions are reproducible.
    pub seed: u64,
}

impl NegotiationSetup {
    pub fn new(space: OutcomeSpace, utility: UtilityFunction, reservation: f64) -> NegotiationSetup {
        NegotiationSetup {
            space: Arc::new(space),
            utility,
            reservation: reservation.clamp(0.0, 1.0),
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> NegotiationSetup {
        self.seed = seed;
        self
    }
}

/// Logical phase of the concession curve.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Conservative,
    Concessive,
}

/// Estimated opponent self-utility of one of their offers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub time: f64,
    pub utility: f64,
}

/// Diagnostic view of the opponent model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpponentSnapshot {
    pub estimated_weights: Vec<f64>,
    pub estimated_reservation: f64,
    pub estimated_concession_rate: f64,
    pub observed_offers: usize,
    /// 0 when estimates are pure priors, approaching 1 as evidence accumulates.
    pub confidence: f64,
}

/// Learns the opponent's preferences from their offers.
///
/// Estimates are rebuilt from the full history on every `update`, so the
/// model state depends only on the history, not on the order of calls.
/// Sparse data never fails: the model degrades to uninformed priors.
pub trait OpponentModel {
    fn update(&mut self, history: &OfferHistory) -> anyhow::Result<()>;

    /// Estimated opponent profile.
    fn profile(&self) -> &UtilityFunction;

    fn estimated_utility(&self, outcome: &Outcome) -> f64 {
        self.profile().utility(outcome)
    }

    fn estimated_reservation(&self) -> f64;

    /// Decline of opponent self-utility per unit of relative time. Never negative.
    fn concession_rate(&self) -> f64;

    /// Estimated opponent self-utility of every observed offer, oldest first.
    fn utility_trend(&self) -> &[TrendPoint];

    fn observed_offers(&self) -> usize;

    fn confidence(&self) -> f64;

    fn snapshot(&self) -> OpponentSnapshot {
        OpponentSnapshot {
            estimated_weights: self.profile().weights().to_vec(),
            estimated_reservation: self.estimated_reservation(),
            estimated_concession_rate: self.concession_rate(),
            observed_offers: self.observed_offers(),
            confidence: self.confidence(),
        }
    }
}

/// Decides what to offer next.
pub trait BiddingStrategy {
    /// Utility we aim for at relative time `time`.
    fn target_utility(&self, time: f64) -> f64;

    fn phase(&self, time: f64) -> Phase;

    /// Our reservation value: the target never drops below it.
    fn reservation(&self) -> f64;

    fn propose(
        &mut self,
        state: &NegotiationState,
        opponent: &dyn OpponentModel,
    ) -> anyhow::Result<Outcome>;
}

/// Everything acceptance criteria may look at when judging an offer.
pub struct AcceptanceContext<'a> {
    pub offer: &'a Outcome,
    /// Our utility of `offer`.
    pub utility: f64,
    pub state: &'a NegotiationState,
    pub opponent: &'a dyn OpponentModel,
    pub bidding: &'a dyn BiddingStrategy,
}

impl<'a> AcceptanceContext<'a> {
    pub fn target(&self) -> f64 {
        self.bidding.target_utility(self.state.time)
    }

    pub fn phase(&self) -> Phase {
        self.bidding.phase(self.state.time)
    }
}

/// Opinion of single acceptance criterion about an offer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    /// Criterion is confident the offer should be accepted.
    Accept { reason: DecisionReason },
    /// Offer must not be accepted, whatever other criteria say.
    Veto { reason: DecisionReason },
    /// Criterion has no opinion.
    Abstain,
}

/// Final decision about an incoming offer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    Accept {
        criterion: String,
        reason: DecisionReason,
    },
    Reject {
        reason: Option<DecisionReason>,
    },
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept { .. })
    }
}

/// Single heuristic contributing to acceptance decision.
pub trait AcceptanceCriterion {
    fn evaluate(&self, context: &AcceptanceContext) -> anyhow::Result<Verdict>;
}

/// Combines criteria into binary decision.
pub trait AcceptanceStrategy {
    fn decide(&self, context: &AcceptanceContext) -> anyhow::Result<Decision>;
}

/// Implemented by components that can be created from yaml parameters.
pub trait ComponentFactory: Sized {
    fn new(name: &str, config: serde_yaml::Value, setup: &NegotiationSetup)
        -> anyhow::Result<Self>;
}
