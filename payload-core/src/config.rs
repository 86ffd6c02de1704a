//! Builder configuration
//!
//! Configurations are plain values: defaults are filled in per instance and
//! strategies derive their effective drop sets without mutating the config
//! they were given. Field names follow the camelCase spelling used in
//! configuration files (`preDropKeys`, `metricKey`, ...).

use crate::error::{type_name, PayloadError, Result};
use crate::transform::ValueTransform;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Key that is always part of the pre-drop set
pub const SENTINEL_DROP_KEY: &str = "";

/// Default field whose value names the metric
pub const DEFAULT_METRIC_KEY: &str = "status";

/// Default field holding the raw reading
pub const DEFAULT_READING_KEY: &str = "value";

/// Default field removed by the untimed strategy
pub const DEFAULT_TIME_FIELD: &str = "timestamp";

/// Loading and validation shared by every configuration type
pub trait Config: DeserializeOwned + Sized {
    /// Check semantic constraints that deserialization cannot express
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Build from a JSON object, filling defaults for absent keys
    fn from_json_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(PayloadError::ConfigNotAnObject {
                found_type: type_name(&value).to_string(),
            });
        }
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Build from a TOML document, filling defaults for absent keys
    fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Options shared by all strategies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayloadConfig {
    /// Fields removed from the record before the payload snapshot
    pub pre_drop_keys: Vec<String>,
    /// Fields removed from the payload after reshaping
    pub post_drop_keys: Vec<String>,
}

impl PayloadConfig {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pre-drop keys
    pub fn with_pre_drop_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pre_drop_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the post-drop keys
    pub fn with_post_drop_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.post_drop_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Pre-drop keys including the sentinel empty key
    pub fn effective_pre_drop_keys(&self) -> BTreeSet<&str> {
        self.pre_drop_keys
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(SENTINEL_DROP_KEY))
            .collect()
    }
}

impl Config for PayloadConfig {}

/// Options for the metric/reading reshape
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynamicConfig {
    /// Shared drop-key options
    #[serde(flatten)]
    pub base: PayloadConfig,
    /// Field whose value names the output metric
    #[serde(alias = "metric_key")]
    pub metric_key: String,
    /// Field holding the raw reading
    #[serde(alias = "reading_key")]
    pub reading_key: String,
    /// Conversion applied to the reading
    #[serde(alias = "value_transform_function", alias = "value_transform")]
    pub value_transform: ValueTransform,
}

impl Default for DynamicConfig {
    fn default() -> Self {
        Self {
            base: PayloadConfig::default(),
            metric_key: DEFAULT_METRIC_KEY.to_string(),
            reading_key: DEFAULT_READING_KEY.to_string(),
            value_transform: ValueTransform::default(),
        }
    }
}

impl DynamicConfig {
    /// Defaults: `status` names the metric, `value` holds the reading,
    /// readings are parsed as floats
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the shared drop-key options
    pub fn with_base(mut self, base: PayloadConfig) -> Self {
        self.base = base;
        self
    }

    /// Set the field naming the metric
    pub fn with_metric_key(mut self, key: impl Into<String>) -> Self {
        self.metric_key = key.into();
        self
    }

    /// Set the field holding the reading
    pub fn with_reading_key(mut self, key: impl Into<String>) -> Self {
        self.reading_key = key.into();
        self
    }

    /// Set the conversion applied to the reading
    pub fn with_transform(mut self, transform: impl Into<ValueTransform>) -> Self {
        self.value_transform = transform.into();
        self
    }
}

impl Config for DynamicConfig {
    fn validate(&self) -> Result<()> {
        if self.metric_key.is_empty() {
            return Err(PayloadError::InvalidConfig {
                reason: "metricKey must not be empty".to_string(),
            });
        }
        if self.reading_key.is_empty() {
            return Err(PayloadError::InvalidConfig {
                reason: "readingKey must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Options for the metric/reading reshape without a timestamp
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UntimedConfig {
    /// Metric/reading options
    #[serde(flatten)]
    pub dynamic: DynamicConfig,
    /// Field removed from the final payload
    #[serde(alias = "time_col_name", alias = "time_field_name")]
    pub time_field_name: String,
}

impl Default for UntimedConfig {
    fn default() -> Self {
        Self {
            dynamic: DynamicConfig::default(),
            time_field_name: DEFAULT_TIME_FIELD.to_string(),
        }
    }
}

impl UntimedConfig {
    /// Dynamic defaults plus `timestamp` as the time field
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the metric/reading options
    pub fn with_dynamic(mut self, dynamic: DynamicConfig) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Set the time field to strip
    pub fn with_time_field(mut self, field: impl Into<String>) -> Self {
        self.time_field_name = field.into();
        self
    }
}

impl Config for UntimedConfig {
    fn validate(&self) -> Result<()> {
        self.dynamic.validate()?;
        if self.time_field_name.is_empty() {
            return Err(PayloadError::InvalidConfig {
                reason: "timeFieldName must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn effective_pre_drop_keys_contains_sentinel() {
        let config = PayloadConfig::new().with_pre_drop_keys(["secret", "secret"]);
        let keys = config.effective_pre_drop_keys();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(""));
        assert!(keys.contains("secret"));
        // the config itself is left untouched
        assert_eq!(config.pre_drop_keys, vec!["secret", "secret"]);
    }

    #[test]
    fn dynamic_defaults_fill_absent_keys() {
        let config = DynamicConfig::from_json_value(json!({"preDropKeys": ["id"]})).unwrap();
        assert_eq!(config.metric_key, "status");
        assert_eq!(config.reading_key, "value");
        assert_eq!(config.value_transform.name(), "float");
        assert_eq!(config.base.pre_drop_keys, vec!["id"]);
        assert!(config.base.post_drop_keys.is_empty());
    }

    #[test]
    fn untimed_accepts_legacy_time_column_name() {
        let config = UntimedConfig::from_json_value(json!({
            "time_col_name": "ts",
            "metricKey": "name",
            "valueTransform": "integer"
        }))
        .unwrap();
        assert_eq!(config.time_field_name, "ts");
        assert_eq!(config.dynamic.metric_key, "name");
        assert_eq!(config.dynamic.value_transform.name(), "integer");
    }

    #[test]
    fn loads_from_toml() {
        let config = UntimedConfig::from_toml_str(
            r#"
            preDropKeys = ["device_id"]
            postDropKeys = ["unit"]
            readingKey = "reading"
            timeFieldName = "time"
            "#,
        )
        .unwrap();
        assert_eq!(config.dynamic.base.pre_drop_keys, vec!["device_id"]);
        assert_eq!(config.dynamic.base.post_drop_keys, vec!["unit"]);
        assert_eq!(config.dynamic.reading_key, "reading");
        assert_eq!(config.time_field_name, "time");
    }

    #[test]
    fn rejects_non_object_config() {
        assert!(matches!(
            PayloadConfig::from_json_value(json!(["a"])),
            Err(PayloadError::ConfigNotAnObject { .. })
        ));
    }

    #[test]
    fn rejects_empty_metric_key() {
        assert!(matches!(
            DynamicConfig::from_json_value(json!({"metricKey": ""})),
            Err(PayloadError::InvalidConfig { .. })
        ));
        assert!(matches!(
            UntimedConfig::from_toml_str("timeFieldName = \"\""),
            Err(PayloadError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_unknown_transform_name() {
        assert!(DynamicConfig::from_json_value(json!({"valueTransform": "celsius"})).is_err());
    }
}
