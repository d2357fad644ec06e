//! Tank health evaluation and maintenance reminders for aquarium keepers.
//!
//! The evaluators in [`alerts`], [`health`] and [`dashboard`] are pure
//! projections over data already loaded into memory: nothing they produce is
//! cached or persisted. [`reminders`] owns the only mutable state, a small
//! JSON file of recurring reminders, and the polling loop that fires them.

pub mod alerts;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod history;
pub mod reminders;
pub mod thresholds;
pub mod validation;

pub use error::AquariumError;
pub use thresholds::{AlertThresholds, EvaluatorConfig, HealthPolicy};

#[cfg(test)]
pub(crate) mod fixtures;
