//! Fixed payload pipeline
//!
//! [`PayloadBuilder`] runs the same four steps for every strategy:
//!
//! 1. remove the pre-drop keys (plus the sentinel empty key) from the record
//! 2. snapshot the filtered record into the payload
//! 3. call the strategy's [`Reshape::make_message`] hook
//! 4. remove the post-drop keys from the payload
//!
//! Strategies only supply step 3 and the keys they add to step 4. They cannot
//! reorder or skip steps, and a builder cannot exist without a strategy.

use crate::config::PayloadConfig;
use crate::error::{ReshapeError, Result};
use crate::record::{self, drop_keys, Payload, Record};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Variant-specific reshape hook
pub trait Reshape {
    /// Short strategy name used in diagnostics
    fn name(&self) -> &'static str;

    /// Shared drop-key options
    fn base_config(&self) -> &PayloadConfig;

    /// Read from the pre-filtered record and write into the payload.
    ///
    /// On error the builder discards any partial writes and keeps the
    /// pre-filtered snapshot.
    fn make_message(
        &self,
        record: &Record,
        payload: &mut Payload,
    ) -> std::result::Result<(), ReshapeError>;

    /// Keys removed from the payload after every reshape, on top of the
    /// configured post-drop keys
    fn post_drop_keys(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Keys consumed by a successful reshape; removed only when
    /// [`Reshape::make_message`] succeeded
    fn bookkeeping_keys(&self) -> Vec<&str> {
        Vec::new()
    }
}

/// Result of the reshape step
#[derive(Debug, Clone, PartialEq)]
pub enum ReshapeOutcome {
    /// The strategy reshaped the record
    Reshaped,
    /// The strategy failed; the payload is the pre-filtered snapshot
    Degraded(ReshapeError),
}

impl ReshapeOutcome {
    /// True when the payload fell back to the pre-filtered snapshot
    pub fn is_degraded(&self) -> bool {
        matches!(self, ReshapeOutcome::Degraded(_))
    }

    /// Reason for the fallback, if any
    pub fn error(&self) -> Option<&ReshapeError> {
        match self {
            ReshapeOutcome::Reshaped => None,
            ReshapeOutcome::Degraded(err) => Some(err),
        }
    }
}

/// A payload built from one record by one strategy
#[derive(Debug, Clone)]
pub struct PayloadBuilder<S: Reshape> {
    strategy: S,
    payload: Payload,
    outcome: ReshapeOutcome,
}

impl<S: Reshape> PayloadBuilder<S> {
    /// Build from an owned record.
    ///
    /// The record is consumed; nothing outside the builder observes the
    /// pre-drop step.
    pub fn new(strategy: S, mut record: Record) -> Self {
        Self::from_record_mut(strategy, &mut record)
    }

    /// Build from a parsed JSON document, which must be an object
    pub fn from_value(strategy: S, value: Value) -> Result<Self> {
        let record = record::from_value(value)?;
        Ok(Self::new(strategy, record))
    }

    /// Build while removing the pre-drop keys from the caller's record in
    /// place.
    ///
    /// Only the pre-drop step touches `record`; the reshape hook reads it and
    /// the payload is a separate copy.
    pub fn from_record_mut(strategy: S, record: &mut Record) -> Self {
        let pre_drop = strategy.base_config().effective_pre_drop_keys();
        let removed = drop_keys(record, pre_drop);
        if !removed.is_empty() {
            debug!(strategy = strategy.name(), keys = ?removed, "pre-drop removed keys");
        }

        let mut payload = record.clone();
        let outcome = match strategy.make_message(record, &mut payload) {
            Ok(()) => ReshapeOutcome::Reshaped,
            Err(err) => {
                warn!(
                    strategy = strategy.name(),
                    error = %err,
                    "reshape failed, keeping the pre-filtered record"
                );
                payload = record.clone();
                ReshapeOutcome::Degraded(err)
            }
        };

        let mut post_drop: BTreeSet<&str> = strategy
            .base_config()
            .post_drop_keys
            .iter()
            .map(String::as_str)
            .collect();
        post_drop.extend(strategy.post_drop_keys());
        if !outcome.is_degraded() {
            post_drop.extend(strategy.bookkeeping_keys());
        }
        let removed = drop_keys(&mut payload, post_drop);
        debug!(
            strategy = strategy.name(),
            keys = ?removed,
            fields = payload.len(),
            degraded = outcome.is_degraded(),
            "payload built"
        );

        Self {
            strategy,
            payload,
            outcome,
        }
    }

    /// The built payload
    pub fn message(&self) -> &Payload {
        &self.payload
    }

    /// Render the payload with a custom formatter
    pub fn message_with<T, F>(&self, formatter: F) -> T
    where
        F: FnOnce(&Payload) -> T,
    {
        formatter(&self.payload)
    }

    /// Take ownership of the payload
    pub fn into_message(self) -> Payload {
        self.payload
    }

    /// Take the payload together with the reshape outcome
    pub fn into_parts(self) -> (Payload, ReshapeOutcome) {
        (self.payload, self.outcome)
    }

    /// How the reshape step went
    pub fn outcome(&self) -> &ReshapeOutcome {
        &self.outcome
    }

    /// True when the payload fell back to the pre-filtered snapshot
    pub fn is_degraded(&self) -> bool {
        self.outcome.is_degraded()
    }

    /// Strategy that produced the payload
    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}
