//! Building blocks of BOA negotiation strategy: Bidding strategy,
//! Opponent model and Acceptance strategy, together with session data
//! passed between them.
pub mod chain;
pub mod component;
pub mod error;
pub mod history;
pub mod reason;
pub mod static_lib;

pub use chain::AcceptanceChain;
pub use component::{
    AcceptanceContext, AcceptanceCriterion, AcceptanceStrategy, BiddingStrategy, ComponentFactory,
    Decision, NegotiationSetup, OpponentModel, OpponentSnapshot, Phase, TrendPoint, Verdict,
};
pub use error::{DegenerateDomainError, InsufficientDataWarning};
pub use history::{NegotiationState, OfferHistory, OfferRecord, Party};
pub use reason::DecisionReason;
