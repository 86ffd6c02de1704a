//! Payload Kit core - canonical payloads from flat key/value records
//!
//! A [`PayloadBuilder`] turns one record into one payload through a fixed
//! pipeline: pre-drop keys, snapshot, strategy-specific reshape, post-drop
//! keys. This crate provides:
//!
//! - Record/payload mappings and conversion from parsed JSON
//! - Configuration types with defaults and validation
//! - Value transforms for readings
//! - The pipeline and the [`Reshape`] hook
//! - Identity, dynamic, and untimed-dynamic strategies
//! - Runtime strategy selection from configuration
//! - Payload renderers
//!
//! ```
//! use payload_core::{record, DynamicConfig, DynamicPayload};
//! use serde_json::json;
//!
//! let record = record::from_value(json!({"status": "temp", "value": "72.5"})).unwrap();
//! let builder = DynamicPayload::build(record, DynamicConfig::new()).unwrap();
//! assert_eq!(builder.message()["temp"], json!(72.5));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod error;
pub mod format;
pub mod kind;
pub mod record;
pub mod transform;
pub mod variants;

// Re-export commonly used types
pub use builder::{PayloadBuilder, Reshape, ReshapeOutcome};
pub use config::{Config, DynamicConfig, PayloadConfig, UntimedConfig};
pub use error::{PayloadError, ReshapeError, Result, TransformError};
pub use kind::{BuilderSpec, PayloadKind, Strategy};
pub use record::{Payload, Record};
pub use transform::{TransformKind, ValueTransform};
pub use variants::{DynamicPayload, IdentityPayload, UntimedDynamicPayload};
