//! Error taxonomy for the classifier.
//!
//! Callers import the public enums from here; the definitions live in the
//! private `types` module.

mod types;

pub use types::{ClassifierError, DefinitionError, Result};
