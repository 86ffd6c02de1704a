//! Reshape strategies
//!
//! - [`IdentityPayload`]: record is already `{label: value}`; pass it through
//! - [`DynamicPayload`]: `{metricKey: name, readingKey: reading}` becomes
//!   `{name: transform(reading)}`
//! - [`UntimedDynamicPayload`]: as dynamic, and the time field is removed

pub mod dynamic;
pub mod identity;
pub mod untimed;

pub use dynamic::DynamicPayload;
pub use identity::IdentityPayload;
pub use untimed::UntimedDynamicPayload;
