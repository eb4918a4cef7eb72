use serde::{Deserialize, Serialize};

use boa_negotiator_component::{
    AcceptanceContext, AcceptanceCriterion, ComponentFactory, DecisionReason, NegotiationSetup,
    Verdict,
};

/// Accepts offers close to the best one received in this session,
/// once the best offer hasn't improved for `patience` offers.
pub struct RelativeBest {
    config: Config,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub margin: f64,
    pub patience: usize,
    pub min_time: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            margin: 0.02,
            patience: 4,
            min_time: 0.8,
        }
    }
}

impl ComponentFactory for RelativeBest {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        _setup: &NegotiationSetup,
    ) -> anyhow::Result<RelativeBest> {
        let config: Config = match config {
            serde_yaml::Value::Null => Config::default(),
            config => serde_yaml::from_value(config)?,
        };
        Ok(RelativeBest { config })
    }
}

impl AcceptanceCriterion for RelativeBest {
    fn evaluate(&self, context: &AcceptanceContext) -> anyhow::Result<Verdict> {
        let history = &context.state.history;
        let best = match history.best_opponent_utility() {
            Some(best) => best.max(context.utility),
            None => return Ok(Verdict::Abstain),
        };

        if context.state.time < self.config.min_time
            || history.offers_since_best_opponent_offer() < self.config.patience
        {
            return Ok(Verdict::Abstain);
        }

        Ok(match context.utility >= best - self.config.margin {
            true => Verdict::Accept {
                reason: DecisionReason::new("Offer close to the best received so far")
                    .utility(context.utility)
                    .threshold(best - self.config.margin),
            },
            false => Verdict::Abstain,
        })
    }
}
