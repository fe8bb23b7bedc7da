//! The viewport classifier: breakpoint membership, transition callbacks and
//! resize handling.

mod core;

pub use self::core::{DimensionChange, SharedClassifier, ViewportClassifier, WatchedClassifier};
