pub mod domains;
pub mod error;
mod framework;
pub mod mock;
mod negotiation_record;

pub use framework::{
    analyze_scenario, scenario_negotiator, with_analysis, Framework, FrameworkError,
    NamedNegotiator, Participant,
};
pub use mock::{ConcessionCurve, MockOpponent};
pub use negotiation_record::{NegotiationRecord, NegotiationStage};
