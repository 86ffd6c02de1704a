//! Metric/reading reshape without a timestamp
//!
//! For sinks that stamp time at ingestion: same reshape as
//! [`super::DynamicPayload`], and the time field never reaches the payload.

use super::dynamic::reshape_metric;
use crate::builder::{PayloadBuilder, Reshape};
use crate::config::{Config, PayloadConfig, UntimedConfig};
use crate::error::{ReshapeError, Result};
use crate::record::{Payload, Record};

/// Dynamic reshape that also strips the time field
#[derive(Debug, Clone, Default)]
pub struct UntimedDynamicPayload {
    config: UntimedConfig,
}

impl UntimedDynamicPayload {
    /// Strategy with validated options
    pub fn new(config: UntimedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Build a payload from one record
    pub fn build(record: Record, config: UntimedConfig) -> Result<PayloadBuilder<Self>> {
        Ok(PayloadBuilder::new(Self::new(config)?, record))
    }

    /// Options in use
    pub fn config(&self) -> &UntimedConfig {
        &self.config
    }
}

impl Reshape for UntimedDynamicPayload {
    fn name(&self) -> &'static str {
        "untimed-dynamic"
    }

    fn base_config(&self) -> &PayloadConfig {
        &self.config.dynamic.base
    }

    fn make_message(
        &self,
        record: &Record,
        payload: &mut Payload,
    ) -> std::result::Result<(), ReshapeError> {
        reshape_metric(&self.config.dynamic, record, payload)
    }

    fn post_drop_keys(&self) -> Vec<&str> {
        vec![self.config.time_field_name.as_str()]
    }

    fn bookkeeping_keys(&self) -> Vec<&str> {
        vec![
            self.config.dynamic.metric_key.as_str(),
            self.config.dynamic.reading_key.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DynamicConfig;
    use crate::record::from_value;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        from_value(value).unwrap()
    }

    #[test]
    fn strips_timestamp() {
        let builder = UntimedDynamicPayload::build(
            record(json!({
                "status": "temp",
                "value": "72.5",
                "timestamp": "2024-01-01T00:00:00Z"
            })),
            UntimedConfig::new(),
        )
        .unwrap();
        assert_eq!(builder.message(), &record(json!({"temp": 72.5})));
    }

    #[test]
    fn timestamp_is_stripped_on_degrade_too() {
        let builder = UntimedDynamicPayload::build(
            record(json!({"status": "temp", "timestamp": 1_700_000_000})),
            UntimedConfig::new(),
        )
        .unwrap();
        assert!(builder.is_degraded());
        assert_eq!(builder.message(), &record(json!({"status": "temp"})));
    }

    #[test]
    fn custom_time_field() {
        let config = UntimedConfig::new()
            .with_time_field("ts")
            .with_dynamic(DynamicConfig::new().with_metric_key("sensor"));
        let builder = UntimedDynamicPayload::build(
            record(json!({"sensor": "rpm", "value": 900, "ts": 5, "timestamp": 6})),
            config,
        )
        .unwrap();
        assert_eq!(
            builder.message(),
            &record(json!({"rpm": 900.0, "timestamp": 6}))
        );
    }

    #[test]
    fn absent_timestamp_is_fine() {
        let builder = UntimedDynamicPayload::build(
            record(json!({"status": "temp", "value": 3})),
            UntimedConfig::new(),
        )
        .unwrap();
        assert_eq!(builder.message(), &record(json!({"temp": 3.0})));
    }
}
