//! Perception layer: what kind of page are we looking at, who hosts it,
//! and is it behind a login wall.

mod ats;
mod classifier;
mod errors;
mod extractor;
pub mod keywords;
mod login;

#[cfg(test)]
mod testpage;

pub use ats::detect_ats;
pub use classifier::{ClassifierPolicy, PageClass, PageClassifier};
pub use errors::PerceiverError;
pub use extractor::FieldExtractor;
pub use login::{GateOutcome, GatePolicy, LoginGate};
