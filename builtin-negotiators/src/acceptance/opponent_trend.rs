use serde::{Deserialize, Serialize};

use boa_negotiator_component::{
    AcceptanceContext, AcceptanceCriterion, ComponentFactory, DecisionReason, NegotiationSetup,
    Verdict,
};

/// Accepts when the opponent stopped conceding: their estimated self-utility
/// is flat or growing over last `window` offers, so waiting won't help.
pub struct OpponentTrend {
    config: Config,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: usize,
    /// Allowed drop of opponent self-utility over the window still treated as flat.
    pub tolerance: f64,
    pub min_time: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window: 3,
            tolerance: 0.01,
            min_time: 0.7,
        }
    }
}

impl ComponentFactory for OpponentTrend {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        _setup: &NegotiationSetup,
    ) -> anyhow::Result<OpponentTrend> {
        let config: Config = match config {
            serde_yaml::Value::Null => Config::default(),
            config => serde_yaml::from_value(config)?,
        };
        Ok(OpponentTrend { config })
    }
}

impl AcceptanceCriterion for OpponentTrend {
    fn evaluate(&self, context: &AcceptanceContext) -> anyhow::Result<Verdict> {
        let window = self.config.window.max(2);
        let trend = context.opponent.utility_trend();

        if context.state.time < self.config.min_time
            || trend.len() < window
            || context.utility < context.bidding.reservation()
        {
            return Ok(Verdict::Abstain);
        }

        let recent = &trend[trend.len() - window..];
        let change = recent[window - 1].utility - recent[0].utility;

        Ok(match change >= -self.config.tolerance {
            true => Verdict::Accept {
                reason: DecisionReason::new("Opponent stopped conceding")
                    .utility(context.utility)
                    .entry("opponent_change", change),
            },
            false => Verdict::Abstain,
        })
    }
}
