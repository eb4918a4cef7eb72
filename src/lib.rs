//! BOA negotiation strategy for bilateral alternating-offers negotiations
//! over discrete multi-issue domains.
pub mod aggregator;
mod composite;
pub mod factory;
mod negotiators;

pub use aggregator::{ResultsAggregator, Statistics, TournamentSummary};
pub use composite::BoaNegotiator;
pub use factory::{create_negotiator, NegotiatorConfig};

pub use negotiators::{Action, Deadline, SessionResult, SessionStatus, TerminalState};

pub use boa_negotiator_component::{
    AcceptanceChain, Decision, DecisionReason, NegotiationSetup, OpponentSnapshot, Phase,
};
pub use boa_outcome_utils::{Domain, Issue, Outcome, OutcomeSpace, UtilityFunction};

pub mod builtin {
    pub use boa_builtin_negotiators::{
        register_negotiators, FrequencyOpponentModel, OpponentTrend, RelativeBest,
        ReservationFloor, TimeDependentBidding, TimePressure, UtilityThreshold,
    };
}

pub mod analysis {
    pub use boa_analysis::*;
}

pub mod component {
    pub use boa_negotiator_component::static_lib::{
        register_bidding_strategy, register_criterion, register_opponent_model,
    };
    pub use boa_negotiator_component::{
        AcceptanceContext, AcceptanceCriterion, AcceptanceStrategy, BiddingStrategy,
        ComponentFactory, NegotiationState, OfferHistory, OfferRecord, OpponentModel, Party,
        TrendPoint, Verdict,
    };
}
