use anyhow::bail;
use serde::{Deserialize, Serialize};

use boa_negotiator_component::{
    AcceptanceContext, AcceptanceCriterion, ComponentFactory, DecisionReason, NegotiationSetup,
    Phase, Verdict,
};

/// Lowers acceptance threshold close to deadline to avoid ending without agreement.
///
/// From `start` the threshold drops linearly below target, reaching
/// `max_discount` at deadline. After `emergency` anything at or above
/// reservation value is accepted. Active only in Concessive phase.
pub struct TimePressure {
    config: Config,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub start: f64,
    pub max_discount: f64,
    pub emergency: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            start: 0.85,
            max_discount: 0.1,
            emergency: 0.95,
        }
    }
}

impl ComponentFactory for TimePressure {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        _setup: &NegotiationSetup,
    ) -> anyhow::Result<TimePressure> {
        let config: Config = match config {
            serde_yaml::Value::Null => Config::default(),
            config => serde_yaml::from_value(config)?,
        };
        TimePressure::with_config(config)
    }
}

impl TimePressure {
    pub fn with_config(config: Config) -> anyhow::Result<TimePressure> {
        if !(0.0..1.0).contains(&config.start) || config.emergency < config.start {
            bail!(
                "Time pressure must start in [0, 1) and before emergency, got start: {}, emergency: {}",
                config.start,
                config.emergency
            );
        }
        Ok(TimePressure { config })
    }

    pub fn threshold(&self, target: f64, reservation: f64, time: f64) -> Option<f64> {
        if time < self.config.start {
            return None;
        }
        if time >= self.config.emergency {
            return Some(reservation);
        }

        let progress = (time - self.config.start) / (1.0 - self.config.start);
        Some((target - self.config.max_discount * progress).max(reservation))
    }
}

impl AcceptanceCriterion for TimePressure {
    fn evaluate(&self, context: &AcceptanceContext) -> anyhow::Result<Verdict> {
        if context.phase() != Phase::Concessive {
            return Ok(Verdict::Abstain);
        }

        let reservation = context.bidding.reservation();
        let threshold = match self.threshold(context.target(), reservation, context.state.time) {
            Some(threshold) => threshold,
            None => return Ok(Verdict::Abstain),
        };

        Ok(match context.utility >= threshold {
            true => Verdict::Accept {
                reason: DecisionReason::new("Deadline is close, offer is good enough")
                    .utility(context.utility)
                    .threshold(threshold)
                    .entry("time", context.state.time),
            },
            false => Verdict::Abstain,
        })
    }
}
