//! Value transforms applied to readings
//!
//! A [`ValueTransform`] converts the raw reading of a record into the value
//! stored in the payload. Built-in transforms are selected by name from
//! configuration ([`TransformKind`]); callers can also provide their own
//! closure with [`ValueTransform::custom`].

use crate::error::{type_name, PayloadError, TransformError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Signature shared by all transforms
pub type TransformFn = dyn Fn(&Value) -> Result<Value, TransformError> + Send + Sync;

/// Built-in transform kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    /// Numeric parse to a 64-bit float
    #[default]
    Float,
    /// Numeric parse to a 64-bit signed integer
    Integer,
    /// Boolean parse (`true`/`false`, `yes`/`no`, `on`/`off`, `1`/`0`)
    Boolean,
    /// Render scalars as text
    String,
    /// Keep the reading unchanged
    Identity,
}

impl TransformKind {
    /// All built-in kinds, in documentation order
    pub const ALL: [TransformKind; 5] = [
        TransformKind::Float,
        TransformKind::Integer,
        TransformKind::Boolean,
        TransformKind::String,
        TransformKind::Identity,
    ];

    /// Configuration name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::Float => "float",
            TransformKind::Integer => "integer",
            TransformKind::Boolean => "boolean",
            TransformKind::String => "string",
            TransformKind::Identity => "identity",
        }
    }

    fn apply(&self, value: &Value) -> Result<Value, TransformError> {
        match self {
            TransformKind::Float => to_float(value),
            TransformKind::Integer => to_integer(value),
            TransformKind::Boolean => to_boolean(value),
            TransformKind::String => to_text(value),
            TransformKind::Identity => Ok(value.clone()),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformKind {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransformKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PayloadError::UnknownTransform {
                name: s.to_string(),
            })
    }
}

/// Named conversion applied to a reading before it is stored
#[derive(Clone)]
pub struct ValueTransform {
    name: String,
    func: Arc<TransformFn>,
}

impl ValueTransform {
    /// Wrap a caller-supplied conversion
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Name used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Convert a raw reading
    pub fn apply(&self, value: &Value) -> Result<Value, TransformError> {
        (self.func)(value)
    }
}

impl From<TransformKind> for ValueTransform {
    fn from(kind: TransformKind) -> Self {
        Self {
            name: kind.name().to_string(),
            func: Arc::new(move |value: &Value| kind.apply(value)),
        }
    }
}

impl Default for ValueTransform {
    fn default() -> Self {
        TransformKind::default().into()
    }
}

impl fmt::Debug for ValueTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueTransform")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<'de> Deserialize<'de> for ValueTransform {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        TransformKind::deserialize(deserializer).map(Self::from)
    }
}

fn finite(number: f64, raw: &str) -> Result<Value, TransformError> {
    Number::from_f64(number)
        .map(Value::Number)
        .ok_or_else(|| TransformError::NonFinite {
            value: raw.to_string(),
        })
}

fn to_float(value: &Value) -> Result<Value, TransformError> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => finite(f, &n.to_string()),
            None => Err(TransformError::NotNumeric {
                value: n.to_string(),
            }),
        },
        Value::String(s) => {
            let trimmed = s.trim();
            let parsed: f64 = trimmed.parse().map_err(|_| TransformError::NotNumeric {
                value: s.clone(),
            })?;
            finite(parsed, trimmed)
        }
        Value::Bool(b) => finite(if *b { 1.0 } else { 0.0 }, "bool"),
        other => Err(TransformError::UnsupportedType {
            found_type: type_name(other).to_string(),
        }),
    }
}

fn whole_float_to_i64(f: f64) -> Option<i64> {
    // i64::MAX is not exactly representable; keep to the safe range
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn to_integer(value: &Value) -> Result<Value, TransformError> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::Number(n.clone())),
        Value::Number(n) => n
            .as_f64()
            .and_then(whole_float_to_i64)
            .map(Value::from)
            .ok_or_else(|| TransformError::NotNumeric {
                value: n.to_string(),
            }),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::from(i));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(whole_float_to_i64)
                .map(Value::from)
                .ok_or_else(|| TransformError::NotNumeric { value: s.clone() })
        }
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        other => Err(TransformError::UnsupportedType {
            found_type: type_name(other).to_string(),
        }),
    }
}

fn to_boolean(value: &Value) -> Result<Value, TransformError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Number(n) => Ok(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(TransformError::NotBoolean { value: s.clone() }),
        },
        other => Err(TransformError::UnsupportedType {
            found_type: type_name(other).to_string(),
        }),
    }
}

fn to_text(value: &Value) -> Result<Value, TransformError> {
    match value {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(TransformError::UnsupportedType {
            found_type: type_name(other).to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn float() -> ValueTransform {
        TransformKind::Float.into()
    }

    #[test]
    fn float_parses_numeric_strings() {
        assert_eq!(float().apply(&json!("72.5")).unwrap(), json!(72.5));
        assert_eq!(float().apply(&json!("  -3 ")).unwrap(), json!(-3.0));
        assert_eq!(float().apply(&json!("1e3")).unwrap(), json!(1000.0));
    }

    #[test]
    fn float_widens_numbers_and_booleans() {
        assert_eq!(float().apply(&json!(72)).unwrap(), json!(72.0));
        assert_eq!(float().apply(&json!(true)).unwrap(), json!(1.0));
        assert_eq!(float().apply(&json!(false)).unwrap(), json!(0.0));
    }

    #[test]
    fn float_rejects_garbage_and_non_finite() {
        assert!(matches!(
            float().apply(&json!("warm")),
            Err(TransformError::NotNumeric { .. })
        ));
        assert!(matches!(
            float().apply(&json!("NaN")),
            Err(TransformError::NonFinite { .. })
        ));
        assert!(matches!(
            float().apply(&json!("inf")),
            Err(TransformError::NonFinite { .. })
        ));
        assert!(matches!(
            float().apply(&json!(null)),
            Err(TransformError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn integer_accepts_whole_values_only() {
        let t: ValueTransform = TransformKind::Integer.into();
        assert_eq!(t.apply(&json!("42")).unwrap(), json!(42));
        assert_eq!(t.apply(&json!("42.0")).unwrap(), json!(42));
        assert_eq!(t.apply(&json!(7.0)).unwrap(), json!(7));
        assert_eq!(t.apply(&json!(true)).unwrap(), json!(1));
        assert!(t.apply(&json!("42.5")).is_err());
        assert!(t.apply(&json!([1])).is_err());
    }

    #[test]
    fn boolean_understands_common_spellings() {
        let t: ValueTransform = TransformKind::Boolean.into();
        assert_eq!(t.apply(&json!("Yes")).unwrap(), json!(true));
        assert_eq!(t.apply(&json!("off")).unwrap(), json!(false));
        assert_eq!(t.apply(&json!(0)).unwrap(), json!(false));
        assert!(matches!(
            t.apply(&json!("maybe")),
            Err(TransformError::NotBoolean { .. })
        ));
    }

    #[test]
    fn string_and_identity() {
        let text: ValueTransform = TransformKind::String.into();
        assert_eq!(text.apply(&json!(1.5)).unwrap(), json!("1.5"));
        assert_eq!(text.apply(&json!(false)).unwrap(), json!("false"));

        let identity: ValueTransform = TransformKind::Identity.into();
        assert_eq!(identity.apply(&json!({"a": 1})).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn kind_from_str_is_case_insensitive() {
        assert_eq!("FLOAT".parse::<TransformKind>().unwrap(), TransformKind::Float);
        assert_eq!(" integer".parse::<TransformKind>().unwrap(), TransformKind::Integer);
        assert!(matches!(
            "celsius".parse::<TransformKind>(),
            Err(PayloadError::UnknownTransform { .. })
        ));
    }

    #[test]
    fn custom_transform_is_named() {
        let t = ValueTransform::custom("celsius", |value: &Value| {
            let f = value
                .as_f64()
                .ok_or_else(|| TransformError::Custom("expected a number".to_string()))?;
            Ok(json!((f - 32.0) * 5.0 / 9.0))
        });
        assert_eq!(t.name(), "celsius");
        assert_eq!(t.apply(&json!(212.0)).unwrap(), json!(100.0));
        assert_eq!(
            t.apply(&json!("hot")).unwrap_err(),
            TransformError::Custom("expected a number".to_string())
        );
    }

    #[test]
    fn deserializes_from_kind_name() {
        let t: ValueTransform = serde_json::from_value(json!("integer")).unwrap();
        assert_eq!(t.name(), "integer");
        assert!(serde_json::from_value::<ValueTransform>(json!("celsius")).is_err());
    }
}
