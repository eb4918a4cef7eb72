pub mod domain;
mod error;
pub mod profile;
mod space;
pub mod utility;

pub use domain::{Domain, Issue, Outcome};
pub use error::Error;
pub use profile::{DomainConfig, IssueConfig, ProfileConfig, Scenario, ScenarioConfig};
pub use space::{OutcomeSpace, ScoredOutcome, DEFAULT_SAMPLE_SIZE, ENUMERATION_THRESHOLD};
pub use utility::UtilityFunction;
