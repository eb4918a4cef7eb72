use serde::{Deserialize, Serialize};

use boa_negotiator_component::{
    AcceptanceContext, AcceptanceCriterion, ComponentFactory, DecisionReason, NegotiationSetup,
    Verdict,
};

/// Accepts offers at least as good as what we would propose ourselves now.
#[derive(Default)]
pub struct UtilityThreshold {
    config: Config,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Subtracted from current target before comparison.
    pub margin: f64,
}

impl ComponentFactory for UtilityThreshold {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        _setup: &NegotiationSetup,
    ) -> anyhow::Result<UtilityThreshold> {
        let config: Config = match config {
            serde_yaml::Value::Null => Config::default(),
            config => serde_yaml::from_value(config)?,
        };
        Ok(UtilityThreshold { config })
    }
}

impl AcceptanceCriterion for UtilityThreshold {
    fn evaluate(&self, context: &AcceptanceContext) -> anyhow::Result<Verdict> {
        let threshold = context.target() - self.config.margin;
        Ok(match context.utility >= threshold {
            true => Verdict::Accept {
                reason: DecisionReason::new("Offer meets current target utility")
                    .utility(context.utility)
                    .threshold(threshold),
            },
            false => Verdict::Abstain,
        })
    }
}
