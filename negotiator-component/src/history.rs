use derive_more::Display;
use serde::{Deserialize, Serialize};

use boa_outcome_utils::Outcome;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Own,
    Opponent,
}

/// Single offer exchanged during the session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OfferRecord {
    pub outcome: Outcome,
    /// Utility of the outcome for us, regardless of who made the offer.
    pub utility: f64,
    pub round: u32,
    /// Relative time in [0, 1].
    pub time: f64,
    pub source: Party,
}

/// Append-only, time-ordered log of offers made by both parties in one session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OfferHistory {
    records: Vec<OfferRecord>,
}

impl OfferHistory {
    pub fn new() -> OfferHistory {
        OfferHistory::default()
    }

    /// Records with time earlier than the last one are clamped to keep the log ordered.
    pub fn push(&mut self, mut record: OfferRecord) {
        if let Some(last) = self.records.last() {
            record.time = record.time.max(last.time);
            record.round = record.round.max(last.round);
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[OfferRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn by(&self, party: Party) -> impl DoubleEndedIterator<Item = &OfferRecord> + '_ {
        self.records
            .iter()
            .filter(move |record| record.source == party)
    }

    pub fn opponent_offers(&self) -> impl DoubleEndedIterator<Item = &OfferRecord> + '_ {
        self.by(Party::Opponent)
    }

    pub fn own_offers(&self) -> impl DoubleEndedIterator<Item = &OfferRecord> + '_ {
        self.by(Party::Own)
    }

    pub fn num_opponent_offers(&self) -> usize {
        self.opponent_offers().count()
    }

    pub fn last_opponent_offer(&self) -> Option<&OfferRecord> {
        self.opponent_offers().next_back()
    }

    pub fn last_own_offer(&self) -> Option<&OfferRecord> {
        self.own_offers().next_back()
    }

    /// Our most recent `count` offers, newest first.
    pub fn recent_own_offers(&self, count: usize) -> Vec<&Outcome> {
        self.own_offers()
            .rev()
            .take(count)
            .map(|record| &record.outcome)
            .collect()
    }

    /// Best utility for us among all opponent offers.
    pub fn best_opponent_utility(&self) -> Option<f64> {
        self.opponent_offers()
            .map(|record| record.utility)
            .fold(None, |best, utility| match best {
                Some(best) if best >= utility => Some(best),
                _ => Some(utility),
            })
    }

    /// Number of opponent offers made after the session-best opponent offer first appeared.
    pub fn offers_since_best_opponent_offer(&self) -> usize {
        let utilities = self
            .opponent_offers()
            .map(|record| record.utility)
            .collect::<Vec<_>>();

        let mut best_idx = 0;
        for (idx, utility) in utilities.iter().enumerate() {
            if *utility > utilities[best_idx] {
                best_idx = idx;
            }
        }
        utilities.len().saturating_sub(best_idx + 1)
    }
}

/// State of a single negotiation session as seen by the strategy.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NegotiationState {
    /// Relative time: 0 at session start, 1 at deadline.
    pub time: f64,
    pub round: u32,
    pub history: OfferHistory,
}

impl NegotiationState {
    pub fn new() -> NegotiationState {
        NegotiationState::default()
    }

    pub fn at(&self, time: f64, round: u32) -> NegotiationState {
        NegotiationState {
            time: time.clamp(0.0, 1.0),
            round,
            history: self.history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: usize, utility: f64, round: u32, source: Party) -> OfferRecord {
        OfferRecord {
            outcome: Outcome::new(vec![value]),
            utility,
            round,
            time: round as f64 / 10.0,
            source,
        }
    }

    #[test]
    fn test_history_queries() {
        let mut history = OfferHistory::new();
        history.push(record(0, 1.0, 0, Party::Own));
        history.push(record(1, 0.2, 0, Party::Opponent));
        history.push(record(2, 0.9, 1, Party::Own));
        history.push(record(3, 0.5, 1, Party::Opponent));
        history.push(record(4, 0.4, 2, Party::Opponent));

        assert_eq!(history.len(), 5);
        assert_eq!(history.num_opponent_offers(), 3);
        assert_eq!(history.best_opponent_utility(), Some(0.5));
        assert_eq!(history.offers_since_best_opponent_offer(), 1);
        assert_eq!(
            history.recent_own_offers(5),
            vec![&Outcome::new(vec![2]), &Outcome::new(vec![0])]
        );
        assert_eq!(
            history.last_opponent_offer().unwrap().outcome,
            Outcome::new(vec![4])
        );
    }

    #[test]
    fn test_history_keeps_time_order() {
        let mut history = OfferHistory::new();
        history.push(record(0, 1.0, 5, Party::Own));
        history.push(record(1, 1.0, 3, Party::Opponent));

        assert_eq!(history.records()[1].round, 5);
        assert_eq!(history.records()[1].time, 0.5);
    }

    #[test]
    fn test_empty_history() {
        let history = OfferHistory::new();
        assert_eq!(history.best_opponent_utility(), None);
        assert_eq!(history.offers_since_best_opponent_offer(), 0);
        assert!(history.recent_own_offers(3).is_empty());
    }
}
