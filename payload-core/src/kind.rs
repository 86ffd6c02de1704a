//! Runtime selection of a strategy
//!
//! [`BuilderSpec`] is the configuration file form: a `kind` tag plus the
//! options of that kind. It turns into a [`Strategy`], which dispatches to
//! the concrete strategy.
//!
//! ```toml
//! kind = "untimed-dynamic"
//! preDropKeys = ["device_id"]
//! metricKey = "status"
//! readingKey = "value"
//! valueTransform = "float"
//! timeFieldName = "timestamp"
//! ```

use crate::builder::{PayloadBuilder, Reshape};
use crate::config::{Config, DynamicConfig, PayloadConfig, UntimedConfig};
use crate::error::{PayloadError, ReshapeError, Result};
use crate::record::{Payload, Record};
use crate::variants::{DynamicPayload, IdentityPayload, UntimedDynamicPayload};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadKind {
    /// Pass the filtered record through
    #[serde(alias = "simple-labelled")]
    Identity,
    /// Metric/reading reshape
    #[serde(alias = "dynamic-labelled")]
    Dynamic,
    /// Metric/reading reshape without the time field
    #[serde(alias = "untimed-dynamic-labelled")]
    UntimedDynamic,
}

impl PayloadKind {
    /// All kinds
    pub const ALL: [PayloadKind; 3] = [
        PayloadKind::Identity,
        PayloadKind::Dynamic,
        PayloadKind::UntimedDynamic,
    ];

    /// Configuration name
    pub fn name(&self) -> &'static str {
        match self {
            PayloadKind::Identity => "identity",
            PayloadKind::Dynamic => "dynamic",
            PayloadKind::UntimedDynamic => "untimed-dynamic",
        }
    }

    /// Earlier name still accepted in configs and on the command line
    pub fn legacy_name(&self) -> &'static str {
        match self {
            PayloadKind::Identity => "simple-labelled",
            PayloadKind::Dynamic => "dynamic-labelled",
            PayloadKind::UntimedDynamic => "untimed-dynamic-labelled",
        }
    }

    /// One-line summary
    pub fn description(&self) -> &'static str {
        match self {
            PayloadKind::Identity => "record is already {label: value}; pass it through",
            PayloadKind::Dynamic => "{metricKey: name, readingKey: reading} becomes {name: reading}",
            PayloadKind::UntimedDynamic => "as dynamic, and the time field is removed",
        }
    }

    /// Spec of this kind with default options
    pub fn default_spec(&self) -> BuilderSpec {
        match self {
            PayloadKind::Identity => BuilderSpec::Identity(PayloadConfig::default()),
            PayloadKind::Dynamic => BuilderSpec::Dynamic(DynamicConfig::default()),
            PayloadKind::UntimedDynamic => BuilderSpec::UntimedDynamic(UntimedConfig::default()),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PayloadKind {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        PayloadKind::ALL
            .into_iter()
            .find(|kind| {
                kind.name().eq_ignore_ascii_case(s) || kind.legacy_name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| PayloadError::InvalidConfig {
                reason: format!(
                    "unknown payload kind '{s}' (expected identity, dynamic or untimed-dynamic)"
                ),
            })
    }
}

/// Strategy kind plus its options
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BuilderSpec {
    /// Passthrough
    #[serde(alias = "simple-labelled")]
    Identity(PayloadConfig),
    /// Metric/reading reshape
    #[serde(alias = "dynamic-labelled")]
    Dynamic(DynamicConfig),
    /// Metric/reading reshape without the time field
    #[serde(alias = "untimed-dynamic-labelled")]
    UntimedDynamic(UntimedConfig),
}

impl BuilderSpec {
    /// Kind tag of this spec
    pub fn kind(&self) -> PayloadKind {
        match self {
            BuilderSpec::Identity(_) => PayloadKind::Identity,
            BuilderSpec::Dynamic(_) => PayloadKind::Dynamic,
            BuilderSpec::UntimedDynamic(_) => PayloadKind::UntimedDynamic,
        }
    }

    /// Shared drop-key options
    pub fn base(&self) -> &PayloadConfig {
        match self {
            BuilderSpec::Identity(config) => config,
            BuilderSpec::Dynamic(config) => &config.base,
            BuilderSpec::UntimedDynamic(config) => &config.dynamic.base,
        }
    }

    /// Validate and turn into a strategy
    pub fn into_strategy(self) -> Result<Strategy> {
        Ok(match self {
            BuilderSpec::Identity(config) => Strategy::Identity(IdentityPayload::new(config)),
            BuilderSpec::Dynamic(config) => Strategy::Dynamic(DynamicPayload::new(config)?),
            BuilderSpec::UntimedDynamic(config) => {
                Strategy::UntimedDynamic(UntimedDynamicPayload::new(config)?)
            }
        })
    }

    /// Build a payload from one record; the spec can be reused
    pub fn build(&self, record: Record) -> Result<PayloadBuilder<Strategy>> {
        Ok(PayloadBuilder::new(self.clone().into_strategy()?, record))
    }
}

impl Config for BuilderSpec {
    fn validate(&self) -> Result<()> {
        match self {
            BuilderSpec::Identity(config) => config.validate(),
            BuilderSpec::Dynamic(config) => config.validate(),
            BuilderSpec::UntimedDynamic(config) => config.validate(),
        }
    }
}

/// Any of the built-in strategies
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Passthrough
    Identity(IdentityPayload),
    /// Metric/reading reshape
    Dynamic(DynamicPayload),
    /// Metric/reading reshape without the time field
    UntimedDynamic(UntimedDynamicPayload),
}

impl Strategy {
    fn inner(&self) -> &dyn Reshape {
        match self {
            Strategy::Identity(s) => s,
            Strategy::Dynamic(s) => s,
            Strategy::UntimedDynamic(s) => s,
        }
    }

    /// Kind of the wrapped strategy
    pub fn kind(&self) -> PayloadKind {
        match self {
            Strategy::Identity(_) => PayloadKind::Identity,
            Strategy::Dynamic(_) => PayloadKind::Dynamic,
            Strategy::UntimedDynamic(_) => PayloadKind::UntimedDynamic,
        }
    }
}

impl Reshape for Strategy {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn base_config(&self) -> &PayloadConfig {
        self.inner().base_config()
    }

    fn make_message(
        &self,
        record: &Record,
        payload: &mut Payload,
    ) -> std::result::Result<(), ReshapeError> {
        self.inner().make_message(record, payload)
    }

    fn post_drop_keys(&self) -> Vec<&str> {
        self.inner().post_drop_keys()
    }

    fn bookkeeping_keys(&self) -> Vec<&str> {
        self.inner().bookkeeping_keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::from_value;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        from_value(value).unwrap()
    }

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in PayloadKind::ALL {
            assert_eq!(kind.name().parse::<PayloadKind>().unwrap(), kind);
        }
        assert!("labelled".parse::<PayloadKind>().is_err());
    }

    #[test]
    fn legacy_kind_names_parse_like_config_aliases() {
        for kind in PayloadKind::ALL {
            assert_eq!(kind.legacy_name().parse::<PayloadKind>().unwrap(), kind);
            let from_config: PayloadKind = serde_json::from_value(json!(kind.legacy_name())).unwrap();
            assert_eq!(from_config, kind);
        }
    }

    #[test]
    fn spec_from_toml_builds_untimed() {
        let spec = BuilderSpec::from_toml_str(
            r#"
            kind = "untimed-dynamic"
            preDropKeys = ["device_id"]
            "#,
        )
        .unwrap();
        assert_eq!(spec.kind(), PayloadKind::UntimedDynamic);
        assert_eq!(spec.base().pre_drop_keys, vec!["device_id"]);

        let builder = spec
            .build(record(json!({
                "device_id": "a1",
                "status": "temp",
                "value": "72.5",
                "timestamp": "2024-01-01T00:00:00Z"
            })))
            .unwrap();
        assert_eq!(builder.strategy().kind(), PayloadKind::UntimedDynamic);
        assert_eq!(builder.message(), &record(json!({"temp": 72.5})));
    }

    #[test]
    fn spec_from_json_accepts_legacy_names() {
        let spec = BuilderSpec::from_json_value(json!({
            "kind": "dynamic-labelled",
            "metricKey": "name",
            "value_transform_function": "integer"
        }))
        .unwrap();
        assert_eq!(spec.kind(), PayloadKind::Dynamic);

        let builder = spec
            .build(record(json!({"name": "count", "value": "3"})))
            .unwrap();
        assert_eq!(builder.message(), &record(json!({"count": 3})));
    }

    #[test]
    fn spec_is_reusable_across_records() {
        let spec = PayloadKind::Dynamic.default_spec();
        let first = spec
            .build(record(json!({"status": "a", "value": "1"})))
            .unwrap();
        let second = spec
            .build(record(json!({"status": "b", "value": "2"})))
            .unwrap();
        assert_eq!(first.message(), &record(json!({"a": 1.0})));
        assert_eq!(second.message(), &record(json!({"b": 2.0})));
        // no drop keys leak from one build into the spec
        assert!(spec.base().post_drop_keys.is_empty());
    }

    #[test]
    fn spec_requires_kind() {
        assert!(matches!(
            BuilderSpec::from_json_value(json!({"preDropKeys": []})),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn spec_validation_rejects_empty_keys() {
        assert!(matches!(
            BuilderSpec::from_toml_str("kind = \"dynamic\"\nreadingKey = \"\""),
            Err(PayloadError::InvalidConfig { .. })
        ));
    }
}
