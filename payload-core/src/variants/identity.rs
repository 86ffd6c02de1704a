//! Passthrough strategy

use crate::builder::{PayloadBuilder, Reshape};
use crate::config::PayloadConfig;
use crate::error::ReshapeError;
use crate::record::{Payload, Record};

/// Keeps the pre-filtered record as the payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityPayload {
    config: PayloadConfig,
}

impl IdentityPayload {
    /// Strategy with the given drop-key options
    pub fn new(config: PayloadConfig) -> Self {
        Self { config }
    }

    /// Build a payload from one record
    pub fn build(record: Record, config: PayloadConfig) -> PayloadBuilder<Self> {
        PayloadBuilder::new(Self::new(config), record)
    }
}

impl Reshape for IdentityPayload {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn base_config(&self) -> &PayloadConfig {
        &self.config
    }

    fn make_message(&self, _record: &Record, _payload: &mut Payload) -> Result<(), ReshapeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::from_value;
    use serde_json::json;

    #[test]
    fn empty_config_copies_record() {
        let record = from_value(json!({"temp": 72.5, "humidity": 40})).unwrap();
        let builder = IdentityPayload::build(record.clone(), PayloadConfig::new());
        assert_eq!(builder.message(), &record);
        assert!(!builder.is_degraded());
    }

    #[test]
    fn drops_before_and_after() {
        let record = from_value(json!({"temp": 72.5, "device": "a1", "unit": "F"})).unwrap();
        let config = PayloadConfig::new()
            .with_pre_drop_keys(["device"])
            .with_post_drop_keys(["unit", "missing"]);
        let builder = IdentityPayload::build(record, config);
        assert_eq!(builder.message(), &from_value(json!({"temp": 72.5})).unwrap());
    }

    #[test]
    fn sentinel_empty_key_is_always_dropped() {
        let record = from_value(json!({"": "stray", "temp": 1})).unwrap();
        let builder = IdentityPayload::build(record, PayloadConfig::new());
        assert!(!builder.message().contains_key(""));
        assert_eq!(builder.message().len(), 1);
    }
}
