use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Human readable explanation of accept, veto or reject decision,
/// with additional machine readable entries.
#[derive(Clone, Display, Debug, PartialEq, Serialize, Deserialize)]
#[display(fmt = "'{}'", message)]
pub struct DecisionReason {
    pub message: String,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl DecisionReason {
    pub fn new(message: impl ToString) -> DecisionReason {
        DecisionReason {
            message: message.to_string(),
            extra: serde_json::json!({}),
        }
    }

    pub fn entry<T: Into<serde_json::Value>>(
        mut self,
        key: impl ToString,
        value: T,
    ) -> DecisionReason {
        if let serde_json::Value::Object(map) = &mut self.extra {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn utility(self, utility: f64) -> DecisionReason {
        self.entry("utility", utility)
    }

    pub fn threshold(self, threshold: f64) -> DecisionReason {
        self.entry("threshold", threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_entries() {
        let reason = DecisionReason::new("Offer below reservation")
            .utility(0.25)
            .threshold(0.3);

        assert_eq!(reason.to_string(), "'Offer below reservation'");
        assert_eq!(reason.extra["utility"], 0.25);
        assert_eq!(reason.extra["threshold"], 0.3);

        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["message"], "Offer below reservation");
        assert_eq!(json["threshold"], 0.3);
    }
}
