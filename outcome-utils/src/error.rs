#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid outcome: value index {value} is outside domain of issue '{issue}'.")]
    InvalidOutcome { issue: String, value: usize },
    #[error("Invalid outcome: expected {expected} issue values, got {got}.")]
    OutcomeArity { expected: usize, got: usize },
    #[error("Issue '{0}' doesn't exist in domain.")]
    UnknownIssue(String),
    #[error("Issue '{0}' has no value assigned.")]
    MissingIssue(String),
    #[error("Value '{value}' doesn't belong to issue '{issue}'.")]
    UnknownValue { issue: String, value: String },
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),
    #[error("Invalid evaluation for issue '{issue}': {reason}")]
    InvalidEvaluation { issue: String, reason: String },
    #[error("Domain has no outcomes: {0}")]
    EmptyDomain(String),
    #[error("Reservation value {0} is outside [0, 1].")]
    InvalidReservation(f64),
    #[error("Can't parse yaml. {0}")]
    Yaml(#[from] serde_yaml::Error),
}
