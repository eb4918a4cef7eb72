#[derive(thiserror::Error, Debug)]
pub enum HarnessError {
    #[error("Party '{0}' accepted, but no offer was made")]
    NothingToAccept(String),
    #[error("Scenario '{name}' is invalid: {error}")]
    InvalidScenario { name: String, error: String },
}
