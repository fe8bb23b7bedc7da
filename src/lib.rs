//! Reactive viewport breakpoint classifier.
//!
//! A [`ViewportClassifier`] sorts the current viewport width into named
//! ranges ("breakpoints") and fires enter/inside/leave callbacks as the width
//! moves, plus width/height/size callbacks on every resize. Dimensions come
//! from a host-provided [`ViewportMetrics`] source; resize notifications come
//! from a [`ResizeSource`].

pub mod classifier;
pub mod config;
pub mod definitions;
pub mod error;
pub mod host;
pub mod logging;
pub mod metrics;

pub use classifier::{DimensionChange, SharedClassifier, ViewportClassifier, WatchedClassifier};
pub use config::ClassifierConfig;
pub use definitions::{
    Callback, Inclusion, Phase, RangeDefinition, WidthDefinitions, builtin_definitions,
    definitions_from_json, is_width_included, validate_definitions,
};
pub use error::{ClassifierError, DefinitionError, Result};
pub use host::{
    ResizeBus, ResizeListener, ResizeSource, SharedViewport, Subscription, SubscriptionId,
    TerminalResizePump, TerminalViewport, ViewportMetrics, ViewportReadings,
};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{ClassifierMetrics, MetricSnapshot};
