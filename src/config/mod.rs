//! Construction-time options for [`ViewportClassifier`](crate::ViewportClassifier).

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use crate::classifier::ViewportClassifier;
use crate::definitions::{Callback, WidthDefinitions, definitions_from_json, type_name};
use crate::error::{ClassifierError, Result};
use crate::logging::Logger;
use crate::metrics::ClassifierMetrics;

const DIMENSION_OPTIONS: [&str; 3] = ["heightChange", "widthChange", "sizeChange"];

/// Options recognised at construction. Everything is optional.
///
/// `width_definitions` follows a three-way merge rule:
/// - `None` keeps the six built-in breakpoints;
/// - `Some` non-empty overrides same-named built-ins and appends the rest;
/// - `Some` empty drops the built-ins entirely.
#[derive(Clone)]
pub struct ClassifierConfig {
    pub width_change: Option<Callback>,
    pub height_change: Option<Callback>,
    pub size_change: Option<Callback>,
    pub width_definitions: Option<WidthDefinitions>,
    /// Optional structured logger used by the classifier.
    pub logger: Option<Logger>,
    /// Counters updated on every pass and resize.
    pub metrics: Option<Arc<Mutex<ClassifierMetrics>>>,
    /// Minimum time between metrics snapshots written to `logger` after a
    /// resize. `None` disables snapshots; zero writes one on every resize.
    pub metrics_interval: Option<Duration>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            width_change: None,
            height_change: None,
            size_change: None,
            width_definitions: None,
            logger: None,
            metrics: None,
            metrics_interval: Some(Duration::from_secs(5)),
            metrics_target: "viewport::metrics".to_string(),
        }
    }
}

impl ClassifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ViewportClassifier) + Send + Sync + 'static,
    {
        self.width_change = Some(Arc::new(callback));
        self
    }

    pub fn with_height_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ViewportClassifier) + Send + Sync + 'static,
    {
        self.height_change = Some(Arc::new(callback));
        self
    }

    pub fn with_size_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ViewportClassifier) + Send + Sync + 'static,
    {
        self.size_change = Some(Arc::new(callback));
        self
    }

    pub fn with_width_definitions(mut self, defs: WidthDefinitions) -> Self {
        self.width_definitions = Some(defs);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(ClassifierMetrics::new())));
        }
    }

    pub fn with_metrics_interval(mut self, interval: Option<Duration>) -> Self {
        self.metrics_interval = interval;
        self
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<ClassifierMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    /// Loads options from a JSON document.
    ///
    /// Only `widthDefinitions` carries data. The dimension callbacks can only
    /// be attached in code, so a non-null `widthChange`, `heightChange` or
    /// `sizeChange` is a `ConfigType` error.
    pub fn from_json(value: &Value) -> Result<Self> {
        let options = value.as_object().ok_or(ClassifierError::ConfigType {
            option: "options",
            expected: "an object",
            found: type_name(value),
        })?;

        for option in DIMENSION_OPTIONS {
            match options.get(option) {
                None | Some(Value::Null) => {}
                Some(other) => {
                    return Err(ClassifierError::ConfigType {
                        option,
                        expected: "a function",
                        found: type_name(other),
                    });
                }
            }
        }

        let width_definitions = match options.get("widthDefinitions") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(definitions_from_json(map)?),
            Some(other) => {
                return Err(ClassifierError::ConfigType {
                    option: "widthDefinitions",
                    expected: "an object",
                    found: type_name(other),
                });
            }
        };

        Ok(Self {
            width_definitions,
            ..Self::default()
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json(&value)
    }
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("width_change", &self.width_change.is_some())
            .field("height_change", &self.height_change.is_some())
            .field("size_change", &self.size_change.is_some())
            .field("width_definitions", &self.width_definitions)
            .field("logger", &self.logger.is_some())
            .field("metrics", &self.metrics.is_some())
            .field("metrics_interval", &self.metrics_interval)
            .field("metrics_target", &self.metrics_target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DefinitionError;
    use serde_json::json;

    #[test]
    fn empty_document_keeps_defaults() {
        let config = ClassifierConfig::from_json(&json!({})).unwrap();
        assert!(config.width_definitions.is_none());
        assert!(config.width_change.is_none());
    }

    #[test]
    fn empty_definitions_survive_as_opt_out() {
        let config = ClassifierConfig::from_json(&json!({ "widthDefinitions": {} })).unwrap();
        assert_eq!(config.width_definitions.map(|d| d.len()), Some(0));
    }

    #[test]
    fn dimension_callbacks_cannot_be_data() {
        let err = ClassifierConfig::from_json(&json!({ "sizeChange": 3 })).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::ConfigType { option: "sizeChange", found: "a number", .. }
        ));
    }

    #[test]
    fn definitions_must_be_an_object() {
        let err = ClassifierConfig::from_json(&json!({ "widthDefinitions": [1, 2] })).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::ConfigType { option: "widthDefinitions", .. }
        ));
    }

    #[test]
    fn invalid_definition_is_wrapped() {
        let err = ClassifierConfig::from_json_str(
            r#"{ "widthDefinitions": { "tablet": { "min": 900, "max": 100, "inclusion": "[]" } } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::ConfigValidation(DefinitionError::RangeOrder { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ClassifierConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ClassifierError::Json(_)));
    }

    #[test]
    fn metrics_can_be_enabled_once() {
        let mut config = ClassifierConfig::new();
        config.enable_metrics();
        let first = config.metrics_handle().unwrap();
        config.enable_metrics();
        assert!(Arc::ptr_eq(&first, &config.metrics_handle().unwrap()));
    }
}
