use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;

use boa_analysis::{analyze, analyze_outcome, DomainAnalysis};
use boa_negotiators::factory::{create_negotiator, NegotiatorConfig, ReservationPolicy};
use boa_negotiators::{Action, BoaNegotiator, Deadline, Outcome, SessionResult};
use boa_outcome_utils::Scenario;

use crate::domains::space;
use crate::error::HarnessError;
use crate::mock::MockOpponent;
use crate::negotiation_record::NegotiationRecord;

#[derive(thiserror::Error)]
#[error("{error}\nNegotiation traceback:\n\n{negotiation_traceback}")]
pub struct FrameworkError {
    error: anyhow::Error,
    negotiation_traceback: NegotiationRecord,
}

/// Side of bilateral alternating-offers negotiation.
pub trait Participant {
    fn name(&self) -> String;

    /// Reacts to the last offer of the other side (`None` when opening).
    /// Returns `None` when the participant leaves the negotiation.
    fn respond(
        &mut self,
        offer: Option<&Outcome>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Action>>;

    /// Other side accepted our last offer.
    fn on_accepted(&mut self, now: DateTime<Utc>) -> anyhow::Result<()>;
}

/// `BoaNegotiator` with name for records.
pub struct NamedNegotiator {
    pub name: String,
    pub negotiator: BoaNegotiator,
}

impl Participant for NamedNegotiator {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn respond(
        &mut self,
        offer: Option<&Outcome>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Action>> {
        if let Some(offer) = offer {
            self.negotiator.on_opponent_offer(offer.clone(), now)?;
        }
        self.negotiator.request_next_action(now)
    }

    fn on_accepted(&mut self, now: DateTime<Utc>) -> anyhow::Result<()> {
        self.negotiator.on_opponent_accept(now)
    }
}

impl Participant for MockOpponent {
    fn name(&self) -> String {
        self.curve().to_string()
    }

    fn respond(
        &mut self,
        offer: Option<&Outcome>,
        _now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Action>> {
        Ok(MockOpponent::respond(self, offer))
    }

    fn on_accepted(&mut self, _now: DateTime<Utc>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Emulates bilateral negotiation with alternating offers.
pub struct Framework {
    pub max_steps: usize,
}

impl Framework {
    pub fn new(test_name: &str) -> Framework {
        let _ = env_logger::builder().is_test(true).try_init();
        log::info!("Starting negotiation test: {test_name}");

        Framework { max_steps: 1000 }
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Runs negotiation until agreement, until one side leaves or `max_steps` actions.
    /// `first` opens the negotiation.
    pub fn run(
        &self,
        first: &mut dyn Participant,
        second: &mut dyn Participant,
    ) -> Result<NegotiationRecord, FrameworkError> {
        let mut record = NegotiationRecord::new(self.max_steps);
        let mut parties: [&mut dyn Participant; 2] = [first, second];
        let mut offer: Option<Outcome> = None;

        for step in 0..self.max_steps {
            let now = Utc::now();
            let (active, passive) = (step % 2, (step + 1) % 2);
            let name = parties[active].name();

            let action = match parties[active].respond(offer.as_ref(), now) {
                Ok(action) => action,
                Err(e) => {
                    record.error(&name, &e);
                    return Err(FrameworkError::from(e, &record));
                }
            };

            match action {
                None => {
                    log::info!("[{name}] left negotiation after {step} step(s).");
                    record.timeout(&name);
                    return Ok(record);
                }
                Some(Action::Accept { outcome }) => {
                    if offer.as_ref() != Some(&outcome) {
                        let e = anyhow!(HarnessError::NothingToAccept(name.clone()));
                        record.error(&name, &e);
                        return Err(FrameworkError::from(e, &record));
                    }

                    log::info!("[{name}] accepted {:?} in step {step}.", outcome.values());
                    record.action(&name, Action::Accept { outcome });
                    parties[passive]
                        .on_accepted(now)
                        .map_err(|e| FrameworkError::from(e, &record))?;
                    return Ok(record);
                }
                Some(action) => {
                    log::debug!("[{name}] {action}");
                    offer = Some(action.outcome().clone());
                    record.action(&name, action);
                }
            }
        }

        Err(FrameworkError::from(
            anyhow!("Negotiation didn't finish in {} steps.", self.max_steps),
            &record,
        ))
    }
}

/// Negotiator for `scenario` with its own reservation value and round deadline.
pub fn scenario_negotiator(
    name: &str,
    scenario: &Scenario,
    rounds: u32,
) -> anyhow::Result<NamedNegotiator> {
    let config = NegotiatorConfig {
        deadline: Deadline::Rounds { rounds },
        reservation: ReservationPolicy::Fixed {
            value: scenario.own_reservation,
        },
        ..Default::default()
    };

    Ok(NamedNegotiator {
        name: name.to_string(),
        negotiator: create_negotiator(config, space(scenario), scenario.own.clone())?,
    })
}

/// Analysis of `scenario` with both true profiles.
pub fn analyze_scenario(scenario: &Scenario) -> DomainAnalysis {
    let mut rng = StdRng::seed_from_u64(0);
    analyze(
        &scenario.own,
        &scenario.opponent,
        scenario.own_reservation,
        scenario.opponent_reservation,
        &space(scenario).outcomes(&mut rng),
    )
}

/// Attaches analysis of agreement, if any.
pub fn with_analysis(
    result: SessionResult,
    scenario: &Scenario,
    analysis: &DomainAnalysis,
) -> SessionResult {
    match result.agreement.clone() {
        Some(agreement) => result.with_analysis(analyze_outcome(
            &agreement,
            &scenario.own,
            &scenario.opponent,
            analysis,
        )),
        None => result,
    }
}

impl FrameworkError {
    pub fn from(error: impl Into<anyhow::Error>, record: &NegotiationRecord) -> FrameworkError {
        FrameworkError {
            error: error.into(),
            negotiation_traceback: record.clone(),
        }
    }
}

impl fmt::Debug for FrameworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
