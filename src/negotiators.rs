use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use boa_analysis::OutcomeAnalysis;
use boa_negotiator_component::Phase;
use boa_outcome_utils::Outcome;

/// Response of the strategy for single turn.
#[derive(Debug, Clone, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    #[display(fmt = "Accept {:?}", "outcome.values()")]
    Accept { outcome: Outcome },
    #[display(fmt = "Offer {:?}", "outcome.values()")]
    Offer { outcome: Outcome },
}

impl Action {
    pub fn outcome(&self) -> &Outcome {
        match self {
            Action::Accept { outcome } | Action::Offer { outcome } => outcome,
        }
    }
}

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalState {
    Accepted,
    TimedOut,
}

/// Lifecycle of single negotiation session.
#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Idle,
    #[display(fmt = "Active({})", _0)]
    Active(Phase),
    #[display(fmt = "Terminal({})", _0)]
    Terminal(TerminalState),
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Terminal(_))
    }
}

/// Hard negotiation deadline, either in number of own turns or in wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deadline {
    Rounds {
        rounds: u32,
    },
    Duration {
        #[serde(with = "humantime_serde")]
        duration: Duration,
    },
}

impl Deadline {
    /// Relative time in [0, 1]. In rounds mode the last round is at t = 1.
    pub fn relative_time(&self, round: u32, elapsed: chrono::Duration) -> f64 {
        match self {
            Deadline::Rounds { rounds } => match *rounds {
                0 | 1 => 1.0,
                rounds => (round as f64 / (rounds - 1) as f64).min(1.0),
            },
            Deadline::Duration { duration } => {
                let total = duration.as_secs_f64();
                let elapsed = elapsed
                    .to_std()
                    .map(|elapsed| elapsed.as_secs_f64())
                    .unwrap_or(0.0);
                match total > 0.0 {
                    true => (elapsed / total).min(1.0),
                    false => 1.0,
                }
            }
        }
    }

    /// No more decisions can be made.
    pub fn is_expired(&self, round: u32, elapsed: chrono::Duration) -> bool {
        match self {
            Deadline::Rounds { rounds } => round >= *rounds,
            Deadline::Duration { duration } => elapsed
                .to_std()
                .map(|elapsed| elapsed > *duration)
                .unwrap_or(false),
        }
    }
}

/// Immutable summary of finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub status: TerminalState,
    pub agreement: Option<Outcome>,
    /// Utility of agreement, or own reservation value without agreement.
    pub utility: f64,
    /// Number of our turns.
    pub rounds: u32,
    /// Relative time at which session ended.
    pub time: f64,
    /// Filled by harness knowing both profiles.
    pub analysis: Option<OutcomeAnalysis>,
}

impl SessionResult {
    pub fn with_analysis(mut self, analysis: OutcomeAnalysis) -> SessionResult {
        self.analysis = Some(analysis);
        self
    }

    pub fn is_agreement(&self) -> bool {
        self.agreement.is_some()
    }
}
