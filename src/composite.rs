use anyhow::{anyhow, bail};
use chrono::{DateTime, Utc};

use boa_negotiator_component::{
    AcceptanceChain, AcceptanceContext, AcceptanceStrategy, BiddingStrategy, Decision,
    NegotiationSetup, NegotiationState, OfferHistory, OfferRecord, OpponentModel,
    OpponentSnapshot, Party,
};
use boa_outcome_utils::Outcome;

use crate::negotiators::{Action, Deadline, SessionResult, SessionStatus, TerminalState};

/// Negotiation strategy composed of Bidding strategy, Opponent model and
/// Acceptance strategy. Single instance serves exactly one session.
///
/// Host drives the session by reporting opponent offers with `on_opponent_offer`
/// and asking for our move with `request_next_action`. Every own turn counts
/// as one round.
pub struct BoaNegotiator {
    setup: NegotiationSetup,
    deadline: Deadline,
    opponent: Box<dyn OpponentModel>,
    bidding: Box<dyn BiddingStrategy>,
    acceptance: AcceptanceChain,

    state: NegotiationState,
    status: SessionStatus,
    started: Option<DateTime<Utc>>,
    /// Opponent offer received since our last action.
    pending: Option<Outcome>,
    agreement: Option<Outcome>,
}

impl BoaNegotiator {
    pub fn new(
        setup: NegotiationSetup,
        deadline: Deadline,
        opponent: Box<dyn OpponentModel>,
        bidding: Box<dyn BiddingStrategy>,
        acceptance: AcceptanceChain,
    ) -> BoaNegotiator {
        BoaNegotiator {
            setup,
            deadline,
            opponent,
            bidding,
            acceptance,
            state: NegotiationState::new(),
            status: SessionStatus::Idle,
            started: None,
            pending: None,
            agreement: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn state(&self) -> &NegotiationState {
        &self.state
    }

    pub fn history(&self) -> &OfferHistory {
        &self.state.history
    }

    pub fn setup(&self) -> &NegotiationSetup {
        &self.setup
    }

    pub fn acceptance(&self) -> &AcceptanceChain {
        &self.acceptance
    }

    pub fn agreement(&self) -> Option<&Outcome> {
        self.agreement.as_ref()
    }

    pub fn opponent_snapshot(&self) -> OpponentSnapshot {
        self.opponent.snapshot()
    }

    /// Updates relative time. Returns false if deadline has passed,
    /// in which case session is moved to `TimedOut`.
    fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let started = *self.started.get_or_insert(now);
        let elapsed = now - started;

        if self.deadline.is_expired(self.state.round, elapsed) {
            if !self.status.is_terminal() {
                log::info!(
                    "Negotiation deadline reached after {} round(s) without agreement.",
                    self.state.round
                );
                self.status = SessionStatus::Terminal(TerminalState::TimedOut);
            }
            return false;
        }

        self.state.time = self.deadline.relative_time(self.state.round, elapsed);
        if !self.status.is_terminal() {
            let phase = self.bidding.phase(self.state.time);
            if self.status != SessionStatus::Active(phase) {
                log::debug!(
                    "Negotiation session is {} at t={:.3}.",
                    SessionStatus::Active(phase),
                    self.state.time
                );
            }
            self.status = SessionStatus::Active(phase);
        }
        true
    }

    fn ensure_active(&self) -> anyhow::Result<()> {
        match self.status {
            SessionStatus::Terminal(state) => bail!("Negotiation session already finished: {state}"),
            _ => Ok(()),
        }
    }

    /// Ingests opponent offer into history and opponent model.
    /// Invalid outcomes are rejected without affecting the session.
    pub fn on_opponent_offer(&mut self, outcome: Outcome, now: DateTime<Utc>) -> anyhow::Result<()> {
        self.ensure_active()?;
        self.setup.space.domain().validate(&outcome)?;

        if !self.tick(now) {
            return Ok(());
        }

        let utility = self.setup.utility.utility(&outcome);
        log::debug!(
            "Opponent offer {} at t={:.3} with utility {utility:.3}.",
            self.setup.space.domain().display(&outcome),
            self.state.time
        );

        self.state.history.push(OfferRecord {
            outcome: outcome.clone(),
            utility,
            round: self.state.round,
            time: self.state.time,
            source: Party::Opponent,
        });
        self.opponent
            .update(&self.state.history)
            .map_err(|e| anyhow!("Opponent model failed to process offer. {e}"))?;
        self.pending = Some(outcome);
        Ok(())
    }

    /// Acceptance decision about `offer` in current state. Doesn't change session state.
    pub fn decide(&self, offer: &Outcome) -> anyhow::Result<Decision> {
        self.setup.space.domain().validate(offer)?;

        let context = AcceptanceContext {
            offer,
            utility: self.setup.utility.utility(offer),
            state: &self.state,
            opponent: self.opponent.as_ref(),
            bidding: self.bidding.as_ref(),
        };
        self.acceptance.decide(&context)
    }

    /// Offer we would make in current state. Nothing is recorded in history.
    pub fn propose(&mut self) -> anyhow::Result<Outcome> {
        self.bidding.propose(&self.state, self.opponent.as_ref())
    }

    /// Accepts pending opponent offer or makes counter offer.
    /// Returns `None` once the session has finished.
    pub fn request_next_action(&mut self, now: DateTime<Utc>) -> anyhow::Result<Option<Action>> {
        if self.status.is_terminal() || !self.tick(now) {
            return Ok(None);
        }

        if let Some(offer) = self.pending.take() {
            if let Decision::Accept { criterion, reason } = self.decide(&offer)? {
                log::info!(
                    "Accepting offer {} at t={:.3}. Criterion '{criterion}': {reason}",
                    self.setup.space.domain().display(&offer),
                    self.state.time
                );
                self.agreement = Some(offer.clone());
                self.status = SessionStatus::Terminal(TerminalState::Accepted);
                return Ok(Some(Action::Accept { outcome: offer }));
            }
        }

        let outcome = self.propose()?;
        let utility = self.setup.utility.utility(&outcome);
        log::debug!(
            "Proposing {} at t={:.3} with utility {utility:.3} (target {:.3}).",
            self.setup.space.domain().display(&outcome),
            self.state.time,
            self.bidding.target_utility(self.state.time)
        );

        self.state.history.push(OfferRecord {
            outcome: outcome.clone(),
            utility,
            round: self.state.round,
            time: self.state.time,
            source: Party::Own,
        });
        self.state.round += 1;
        Ok(Some(Action::Offer { outcome }))
    }

    /// Opponent accepted our last offer.
    pub fn on_opponent_accept(&mut self, now: DateTime<Utc>) -> anyhow::Result<()> {
        self.ensure_active()?;
        let outcome = self
            .state
            .history
            .last_own_offer()
            .map(|record| record.outcome.clone())
            .ok_or_else(|| anyhow!("Opponent accepted, but we didn't make any offer."))?;

        self.tick(now);
        log::info!(
            "Opponent accepted our offer {}.",
            self.setup.space.domain().display(&outcome)
        );
        self.agreement = Some(outcome);
        self.status = SessionStatus::Terminal(TerminalState::Accepted);
        Ok(())
    }

    /// Closes the session. Without agreement it ends as `TimedOut`.
    pub fn finish(&mut self) -> SessionResult {
        if self.agreement.is_none() {
            self.status = SessionStatus::Terminal(TerminalState::TimedOut);
        }

        let status = match self.status {
            SessionStatus::Terminal(state) => state,
            _ => TerminalState::TimedOut,
        };

        SessionResult {
            status,
            utility: self
                .agreement
                .as_ref()
                .map(|outcome| self.setup.utility.utility(outcome))
                .unwrap_or(self.setup.reservation),
            agreement: self.agreement.clone(),
            rounds: self.state.round,
            time: self.state.time,
            analysis: None,
        }
    }
}
