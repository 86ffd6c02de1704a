//! Metric/reading reshape
//!
//! Records arrive as `{"status": "temp", "value": "72.5", ...}`: one field
//! names the metric, another carries the reading. The payload keeps the
//! other fields and gains `{"temp": 72.5}`; the two source fields are
//! dropped once they have been consumed.
//!
//! When the reshape cannot be done (missing field, unusable metric name,
//! transform failure) the builder keeps the pre-filtered record, source
//! fields included, and reports [`crate::ReshapeOutcome::Degraded`].

use crate::builder::{PayloadBuilder, Reshape};
use crate::config::{Config, DynamicConfig, PayloadConfig};
use crate::error::{type_name, ReshapeError, Result};
use crate::record::{Payload, Record};
use serde_json::Value;

/// Reshapes `{metricKey: name, readingKey: reading}` into `{name: reading}`
#[derive(Debug, Clone, Default)]
pub struct DynamicPayload {
    config: DynamicConfig,
}

impl DynamicPayload {
    /// Strategy with validated options
    pub fn new(config: DynamicConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Build a payload from one record
    pub fn build(record: Record, config: DynamicConfig) -> Result<PayloadBuilder<Self>> {
        Ok(PayloadBuilder::new(Self::new(config)?, record))
    }

    /// Options in use
    pub fn config(&self) -> &DynamicConfig {
        &self.config
    }
}

impl Reshape for DynamicPayload {
    fn name(&self) -> &'static str {
        "dynamic"
    }

    fn base_config(&self) -> &PayloadConfig {
        &self.config.base
    }

    fn make_message(
        &self,
        record: &Record,
        payload: &mut Payload,
    ) -> std::result::Result<(), ReshapeError> {
        reshape_metric(&self.config, record, payload)
    }

    fn bookkeeping_keys(&self) -> Vec<&str> {
        vec![self.config.metric_key.as_str(), self.config.reading_key.as_str()]
    }
}

/// Write `payload[record[metric_key]] = transform(record[reading_key])`
pub(crate) fn reshape_metric(
    config: &DynamicConfig,
    record: &Record,
    payload: &mut Payload,
) -> std::result::Result<(), ReshapeError> {
    let metric = field(record, &config.metric_key)?;
    let reading = field(record, &config.reading_key)?;
    let name = metric_name(&config.metric_key, metric)?;
    let value = config
        .value_transform
        .apply(reading)
        .map_err(|source| ReshapeError::Transform {
            field: config.reading_key.clone(),
            transform: config.value_transform.name().to_string(),
            source,
        })?;
    payload.insert(name, value);
    Ok(())
}

fn field<'a>(record: &'a Record, key: &str) -> std::result::Result<&'a Value, ReshapeError> {
    record.get(key).ok_or_else(|| ReshapeError::MissingField {
        field: key.to_string(),
    })
}

/// Strings name the metric as-is (the empty string included); numbers and
/// booleans by their JSON text
fn metric_name(field: &str, value: &Value) -> std::result::Result<String, ReshapeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ReshapeError::InvalidMetricName {
            field: field.to_string(),
            found_type: type_name(other).to_string(),
        }),
    }
}
