use boa_negotiator_component::{
    AcceptanceContext, AcceptanceCriterion, ComponentFactory, DecisionReason, NegotiationSetup,
    Verdict,
};

/// Absolute floor: offers worth less than our reservation value are never accepted.
pub struct ReservationFloor {
    reservation: f64,
}

impl ReservationFloor {
    pub fn new(reservation: f64) -> ReservationFloor {
        ReservationFloor { reservation }
    }
}

impl ComponentFactory for ReservationFloor {
    fn new(
        _name: &str,
        _config: serde_yaml::Value,
        setup: &NegotiationSetup,
    ) -> anyhow::Result<ReservationFloor> {
        Ok(ReservationFloor::new(setup.reservation))
    }
}

impl AcceptanceCriterion for ReservationFloor {
    fn evaluate(&self, context: &AcceptanceContext) -> anyhow::Result<Verdict> {
        Ok(match context.utility < self.reservation {
            true => Verdict::Veto {
                reason: DecisionReason::new("Offer below reservation value")
                    .utility(context.utility)
                    .threshold(self.reservation),
            },
            false => Verdict::Abstain,
        })
    }
}
