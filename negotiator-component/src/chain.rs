use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::component::{
    AcceptanceContext, AcceptanceCriterion, AcceptanceStrategy, Decision, Verdict,
};

lazy_static! {
    // Constant pattern, covered by tests.
    static ref POSTFIX: Regex = Regex::new(r"#(?P<idx>[0-9]+)\z").unwrap();
}

/// Ordered set of named acceptance criteria.
///
/// Criteria are consulted in insertion order. A veto rejects the offer
/// immediately, regardless of earlier accept votes. Otherwise the first
/// criterion voting for acceptance decides. Without any accept vote the
/// offer is rejected.
#[derive(Default)]
pub struct AcceptanceChain {
    /// Ordered components. Evaluation order decides which accept reason is reported.
    components: Vec<(String, Box<dyn AcceptanceCriterion>)>,
    /// Named lookup.
    names: HashMap<String, usize>,
}

impl AcceptanceChain {
    pub fn new() -> AcceptanceChain {
        AcceptanceChain::default()
    }

    pub fn with(components: Vec<(String, Box<dyn AcceptanceCriterion>)>) -> AcceptanceChain {
        let mut chain = AcceptanceChain::default();
        for (name, component) in components {
            chain.add_component(name, component)
        }
        chain
    }

    /// Function will rename component, if the name was already used.
    /// Function adds subsequent numbers to string for example:
    /// from `TimePressure` it will make `TimePressure#1` and than `TimePressure#2`.
    pub fn add_component(&mut self, mut name: String, component: Box<dyn AcceptanceCriterion>) {
        while self.names.contains_key(&name) {
            if let Some(idx) = POSTFIX
                .captures(&name)
                .and_then(|caps| caps.name("idx"))
                .and_then(|capture| capture.as_str().parse::<u32>().map(|idx| idx + 1).ok())
            {
                name = POSTFIX.replace(&name, format!("#{idx}")).to_string()
            } else {
                name = format!("{name}#1");
            }
        }

        self.names.insert(name.clone(), self.components.len());
        self.components.push((name, component));
    }

    pub fn list_components(&self) -> Vec<String> {
        self.components
            .iter()
            .map(|(name, _)| name)
            .cloned()
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn AcceptanceCriterion> {
        self.names
            .get(name)
            .map(|idx| self.components[*idx].1.as_ref())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl AcceptanceStrategy for AcceptanceChain {
    fn decide(&self, context: &AcceptanceContext) -> anyhow::Result<Decision> {
        let mut accept = None;

        for (name, component) in self.components.iter() {
            let verdict = component.evaluate(context).map_err(|e| {
                anyhow!("Acceptance criterion '{name}' failed evaluating offer. {e}")
            })?;

            match verdict {
                Verdict::Veto { reason } => {
                    log::debug!(
                        "Acceptance criterion '{name}' vetoed offer with utility {:.3}: {reason}",
                        context.utility
                    );
                    return Ok(Decision::Reject {
                        reason: Some(reason),
                    });
                }
                Verdict::Accept { reason } => {
                    if accept.is_none() {
                        accept = Some((name.clone(), reason));
                    }
                }
                Verdict::Abstain => (),
            }
        }

        Ok(match accept {
            Some((criterion, reason)) => {
                log::debug!(
                    "Acceptance criterion '{criterion}' accepts offer with utility {:.3}: {reason}",
                    context.utility
                );
                Decision::Accept { criterion, reason }
            }
            None => Decision::Reject { reason: None },
        })
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::component::{BiddingStrategy, OpponentModel, Phase, TrendPoint};
    use crate::history::{NegotiationState, OfferHistory};
    use crate::reason::DecisionReason;
    use boa_outcome_utils::{Domain, Issue, Outcome, UtilityFunction};

    pub struct FixedVerdict(pub Verdict);

    impl AcceptanceCriterion for FixedVerdict {
        fn evaluate(&self, _context: &AcceptanceContext) -> anyhow::Result<Verdict> {
            Ok(self.0.clone())
        }
    }

    pub struct StubModel {
        profile: UtilityFunction,
    }

    impl StubModel {
        pub fn new() -> StubModel {
            let domain = Domain::new(vec![Issue::new("Issue", &["a", "b"])]).unwrap();
            StubModel {
                profile: UtilityFunction::uniform(&domain, 0.5),
            }
        }
    }

    impl OpponentModel for StubModel {
        fn update(&mut self, _history: &OfferHistory) -> anyhow::Result<()> {
            Ok(())
        }
        fn profile(&self) -> &UtilityFunction {
            &self.profile
        }
        fn estimated_reservation(&self) -> f64 {
            0.0
        }
        fn concession_rate(&self) -> f64 {
            0.0
        }
        fn utility_trend(&self) -> &[TrendPoint] {
            &[]
        }
        fn observed_offers(&self) -> usize {
            0
        }
        fn confidence(&self) -> f64 {
            0.0
        }
    }

    pub struct StubBidding;

    impl BiddingStrategy for StubBidding {
        fn target_utility(&self, time: f64) -> f64 {
            1.0 - time
        }
        fn phase(&self, _time: f64) -> Phase {
            Phase::Conservative
        }
        fn reservation(&self) -> f64 {
            0.0
        }
        fn propose(
            &mut self,
            _state: &NegotiationState,
            _opponent: &dyn OpponentModel,
        ) -> anyhow::Result<Outcome> {
            Ok(Outcome::new(vec![0]))
        }
    }

    fn named(name: &str, verdict: Verdict) -> (String, Box<dyn AcceptanceCriterion>) {
        (name.to_string(), Box::new(FixedVerdict(verdict)))
    }

    fn accept(message: &str) -> Verdict {
        Verdict::Accept {
            reason: DecisionReason::new(message),
        }
    }

    fn veto(message: &str) -> Verdict {
        Verdict::Veto {
            reason: DecisionReason::new(message),
        }
    }

    fn decide(chain: &AcceptanceChain) -> Decision {
        let offer = Outcome::new(vec![0]);
        let state = NegotiationState::new();
        let model = StubModel::new();
        let context = AcceptanceContext {
            offer: &offer,
            utility: 0.5,
            state: &state,
            opponent: &model,
            bidding: &StubBidding,
        };
        chain.decide(&context).unwrap()
    }

    #[test_case(
        &["ExampleCriterion"],
        &["ExampleCriterion"];
        "First element's name shouldn't change"
    )]
    #[test_case(
        &["ExampleCriterion", "ExampleCriterion"],
        &["ExampleCriterion", "ExampleCriterion#1"];
        "Second element should get #1 postfix"
    )]
    #[test_case(
        &["ExampleCriterion", "ExampleCriterion", "ExampleCriterion"],
        &["ExampleCriterion", "ExampleCriterion#1", "ExampleCriterion#2"];
        "Third element should get #2 postfix"
    )]
    #[test_case(
        &["ExampleCriterion", "ExampleCriterion", "ExampleCriterion", "ExampleCriterion", "ExampleCriterion"],
        &["ExampleCriterion", "ExampleCriterion#1", "ExampleCriterion#2", "ExampleCriterion#3", "ExampleCriterion#4"];
        "Check postfix for 5 elements to be sure"
    )]
    #[test_case(
        &["ExampleCriterion#1", "ExampleCriterion"],
        &["ExampleCriterion#1", "ExampleCriterion"];
        "First element already with postfix"
    )]
    #[test_case(
        &["ExampleCriterion#2", "ExampleCriterion", "ExampleCriterion"],
        &["ExampleCriterion#2", "ExampleCriterion", "ExampleCriterion#1"];
        "Postfix #2 on first position"
    )]
    #[test_case(
        &["ExampleCriterion#2", "ExampleCriterion#1", "ExampleCriterion#3"],
        &["ExampleCriterion#2", "ExampleCriterion#1", "ExampleCriterion#3"];
        "Keep postfixes in order if they exist"
    )]
    #[test_case(
        &["ExampleCriterion#", "ExampleCriterion"],
        &["ExampleCriterion#", "ExampleCriterion"];
        "Tricky name postfix"
    )]
    fn test_acceptance_chain_add_elements(names: &[&str], assert_names: &[&str]) {
        let criteria = names
            .iter()
            .map(|name| named(name, Verdict::Abstain))
            .collect();

        let chain = AcceptanceChain::with(criteria);
        let components = chain.list_components();

        assert_eq!(components, assert_names);
        for name in assert_names {
            assert!(chain.get(name).is_some());
        }
    }

    #[test]
    fn test_veto_overrides_accept() {
        let chain = AcceptanceChain::with(vec![
            named("Threshold", accept("good enough")),
            named("Floor", veto("below reservation")),
        ]);

        assert_eq!(
            decide(&chain),
            Decision::Reject {
                reason: Some(DecisionReason::new("below reservation"))
            }
        );
    }

    #[test]
    fn test_first_accept_reported() {
        let chain = AcceptanceChain::with(vec![
            named("Floor", Verdict::Abstain),
            named("Threshold", accept("above target")),
            named("Relative", accept("best seen")),
        ]);

        match decide(&chain) {
            Decision::Accept { criterion, reason } => {
                assert_eq!(criterion, "Threshold");
                assert_eq!(reason.message, "above target");
            }
            decision => panic!("Expected accept, got {decision:?}"),
        }
    }

    #[test]
    fn test_reject_without_votes() {
        let chain = AcceptanceChain::with(vec![named("Floor", Verdict::Abstain)]);
        assert_eq!(decide(&chain), Decision::Reject { reason: None });
        assert_eq!(
            decide(&AcceptanceChain::new()),
            Decision::Reject { reason: None }
        );
    }
}
