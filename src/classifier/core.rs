use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde_json::json;

use crate::config::ClassifierConfig;
use crate::definitions::{
    Callback, Phase, RangeDefinition, WidthDefinitions, builtin_definitions, validate_definitions,
};
use crate::error::{ClassifierError, Result};
use crate::host::{ResizeSource, Subscription, ViewportMetrics};
use crate::logging::{CLASSIFIER_TARGET, LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::ClassifierMetrics;

/// Classifier shared with a resize listener.
pub type SharedClassifier = Arc<Mutex<ViewportClassifier>>;

/// Which dimension callback a resize resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionChange {
    Width,
    Height,
    Size,
    /// Both dimensions moved but one of the four values was zero.
    Suppressed,
    Unchanged,
}

impl DimensionChange {
    pub fn between(old_width: u32, old_height: u32, width: u32, height: u32) -> Self {
        let width_moved = old_width != width;
        let height_moved = old_height != height;
        match (width_moved, height_moved) {
            (false, false) => Self::Unchanged,
            (true, false) => Self::Width,
            (false, true) => Self::Height,
            (true, true) => {
                if [old_width, old_height, width, height].contains(&0) {
                    Self::Suppressed
                } else {
                    Self::Size
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::Size => "size",
            Self::Suppressed => "suppressed",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Classifies the viewport width into named breakpoints and fires transition
/// callbacks as the width moves between them.
///
/// Every callback receives `&mut ViewportClassifier` and may call the
/// mutation operations, which re-run the evaluation pass synchronously.
pub struct ViewportClassifier {
    width: u32,
    height: u32,
    definitions: WidthDefinitions,
    membership: IndexMap<String, bool>,
    width_change: Option<Callback>,
    height_change: Option<Callback>,
    size_change: Option<Callback>,
    viewport: Box<dyn ViewportMetrics>,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<ClassifierMetrics>>>,
    metrics_interval: Option<Duration>,
    metrics_target: String,
    last_metrics_emit: Instant,
}

/// A classifier attached to a resize source.
pub struct WatchedClassifier {
    pub classifier: SharedClassifier,
    pub subscription: Subscription,
}

impl WatchedClassifier {
    /// Detach from the source, keeping the classifier.
    pub fn cancel<S>(self, source: &mut S) -> SharedClassifier
    where
        S: ResizeSource + ?Sized,
    {
        self.subscription.cancel(source);
        self.classifier
    }
}

impl ViewportClassifier {
    /// Builds a classifier that is driven by explicit [`handle_resize`] calls.
    ///
    /// [`handle_resize`]: Self::handle_resize
    pub fn new<M>(config: ClassifierConfig, viewport: M) -> Result<Self>
    where
        M: ViewportMetrics + 'static,
    {
        let ClassifierConfig {
            width_change,
            height_change,
            size_change,
            width_definitions,
            logger,
            metrics,
            metrics_interval,
            metrics_target,
        } = config;

        let definitions = match width_definitions {
            None => builtin_definitions(),
            Some(defs) if defs.is_empty() => WidthDefinitions::new(),
            Some(defs) => {
                validate_definitions(&defs)?;
                let mut merged = builtin_definitions();
                merged.extend(defs);
                merged
            }
        };

        let membership = definitions
            .keys()
            .map(|name| (name.clone(), false))
            .collect();

        let mut classifier = Self {
            width: viewport.width(),
            height: viewport.height(),
            definitions,
            membership,
            width_change,
            height_change,
            size_change,
            viewport: Box::new(viewport),
            logger,
            metrics,
            metrics_interval,
            metrics_target,
            last_metrics_emit: Instant::now(),
        };

        classifier.log(
            LogLevel::Info,
            "classifier_constructed",
            [
                json_kv("width", classifier.width),
                json_kv("height", classifier.height),
                json_kv("breakpoints", classifier.definitions.len()),
            ],
        );
        classifier.compute_is_and_callbacks();
        Ok(classifier)
    }

    /// Builds a classifier and subscribes it once to `source`.
    ///
    /// The listener locks the shared classifier for the duration of each
    /// resize, so callbacks must use the `&mut` they are given rather than
    /// locking the shared handle again. A poisoned lock is recovered, so a
    /// callback that panicked once does not silence later resizes.
    pub fn watch<M, S>(config: ClassifierConfig, viewport: M, source: &mut S) -> Result<WatchedClassifier>
    where
        M: ViewportMetrics + 'static,
        S: ResizeSource + ?Sized,
    {
        let classifier: SharedClassifier = Arc::new(Mutex::new(Self::new(config, viewport)?));
        let listener = Arc::clone(&classifier);
        let id = source.subscribe(Box::new(move || {
            // A panicking callback poisons the lock; keep classifying anyway.
            let mut guard = listener.lock().unwrap_or_else(PoisonError::into_inner);
            guard.handle_resize();
        }));
        Ok(WatchedClassifier {
            classifier,
            subscription: Subscription::new(id),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Membership of `name`, `None` when no such breakpoint is tracked.
    pub fn is(&self, name: &str) -> Option<bool> {
        self.membership.get(name).copied()
    }

    pub fn membership(&self) -> &IndexMap<String, bool> {
        &self.membership
    }

    /// Names of the breakpoints the current width falls into.
    pub fn active_breakpoints(&self) -> impl Iterator<Item = &str> {
        self.membership
            .iter()
            .filter(|(_, inside)| **inside)
            .map(|(name, _)| name.as_str())
    }

    pub fn definitions(&self) -> &WidthDefinitions {
        &self.definitions
    }

    pub fn definition(&self, name: &str) -> Option<&RangeDefinition> {
        self.definitions.get(name)
    }

    /// Re-reads the viewport, re-evaluates every breakpoint, then fires at
    /// most one of the width/height/size callbacks.
    pub fn handle_resize(&mut self) {
        let (old_width, old_height) = (self.width, self.height);
        self.width = self.viewport.width();
        self.height = self.viewport.height();

        self.compute_is_and_callbacks();

        let change = DimensionChange::between(old_width, old_height, self.width, self.height);
        self.log(
            LogLevel::Debug,
            "resized",
            [
                json_kv("width", self.width),
                json_kv("height", self.height),
                json_kv("change", change.as_str()),
            ],
        );
        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_resize(change);
            }
        }
        self.maybe_emit_metrics();

        let callback = match change {
            DimensionChange::Width => self.width_change.clone(),
            DimensionChange::Height => self.height_change.clone(),
            DimensionChange::Size => self.size_change.clone(),
            DimensionChange::Suppressed | DimensionChange::Unchanged => None,
        };
        if let Some(callback) = callback {
            callback(self);
        }
    }

    /// Validates and merges `defs` (same names are overwritten in place),
    /// then re-evaluates.
    pub fn add_width_definitions(&mut self, defs: WidthDefinitions) -> Result<&mut Self> {
        validate_definitions(&defs)?;
        let names: Vec<String> = defs.keys().cloned().collect();
        self.definitions.extend(defs);
        self.log(
            LogLevel::Info,
            "definitions_added",
            [json_kv("names", json!(names))],
        );
        self.compute_is_and_callbacks();
        Ok(self)
    }

    /// Drops a definition and its membership. No callbacks fire.
    pub fn remove_width_definition(&mut self, name: &str) -> Result<&mut Self> {
        if self.definitions.shift_remove(name).is_none() {
            return Err(not_found(name));
        }
        self.membership.shift_remove(name);
        self.log(
            LogLevel::Info,
            "definition_removed",
            [json_kv("name", name)],
        );
        Ok(self)
    }

    /// Binds `callback` to `phase` of the named breakpoint, then re-evaluates.
    pub fn set_callback<F>(&mut self, name: &str, phase: Phase, callback: F) -> Result<&mut Self>
    where
        F: Fn(&mut ViewportClassifier) + Send + Sync + 'static,
    {
        let def = self
            .definitions
            .get_mut(name)
            .ok_or_else(|| not_found(name))?;
        *def.slot_mut(phase) = Some(Arc::new(callback));
        self.log(
            LogLevel::Debug,
            "callback_set",
            [json_kv("name", name), json_kv("phase", phase.token())],
        );
        self.compute_is_and_callbacks();
        Ok(self)
    }

    /// Clears `phase` of the named breakpoint. Membership is left untouched.
    pub fn remove_callback(&mut self, name: &str, phase: Phase) -> Result<&mut Self> {
        let def = self
            .definitions
            .get_mut(name)
            .ok_or_else(|| not_found(name))?;
        *def.slot_mut(phase) = None;
        self.log(
            LogLevel::Debug,
            "callback_removed",
            [json_kv("name", name), json_kv("phase", phase.token())],
        );
        Ok(self)
    }

    /// Completion hook for chained mutations.
    pub fn on_done<F>(&mut self, done: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        done(self);
        self
    }

    fn callback(&self, name: &str, phase: Phase) -> Option<Callback> {
        self.definitions
            .get(name)
            .and_then(|def| def.callback(phase))
            .cloned()
    }

    /// One evaluation pass over every breakpoint in definition order.
    ///
    /// Names are snapshotted up front and each definition is looked up again,
    /// so a callback that adds or removes definitions does not invalidate the
    /// iteration. Membership is stored before any callback runs, and enter or
    /// leave only fire if it still holds after `while_inside` returns.
    fn compute_is_and_callbacks(&mut self) {
        let defs = &self.definitions;
        self.membership.retain(|name, _| defs.contains_key(name));

        let names: Vec<String> = self.definitions.keys().cloned().collect();
        let (mut enters, mut leaves) = (0usize, 0usize);

        for name in names {
            let Some(inside) = self.definitions.get(&name).map(|def| def.contains(self.width))
            else {
                continue;
            };
            let was_inside = self
                .membership
                .insert(name.clone(), inside)
                .unwrap_or(false);

            if inside {
                if let Some(callback) = self.callback(&name, Phase::Inside) {
                    callback(self);
                }
                // The callback may have removed or replaced this breakpoint;
                // a nested pass has then already handled its transition.
                if self.membership.get(&name) != Some(&inside) {
                    continue;
                }
            }

            if !was_inside && inside {
                enters += 1;
                self.log(
                    LogLevel::Info,
                    "breakpoint_entered",
                    [json_kv("name", name.as_str()), json_kv("width", self.width)],
                );
                if let Some(callback) = self.callback(&name, Phase::Enter) {
                    callback(self);
                }
            }

            if was_inside && !inside {
                leaves += 1;
                self.log(
                    LogLevel::Info,
                    "breakpoint_left",
                    [json_kv("name", name.as_str()), json_kv("width", self.width)],
                );
                if let Some(callback) = self.callback(&name, Phase::Leave) {
                    callback(self);
                }
            }
        }

        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_pass(enters, leaves);
            }
        }
    }

    /// Writes a metrics snapshot to the logger once `metrics_interval` has
    /// elapsed since the previous one. Needs both a logger and metrics.
    fn maybe_emit_metrics(&mut self) {
        let Some(interval) = self.metrics_interval else {
            return;
        };
        let (Some(logger), Some(metrics)) = (self.logger.as_ref(), self.metrics.as_ref()) else {
            return;
        };

        let now = Instant::now();
        if now.duration_since(self.last_metrics_emit) < interval {
            return;
        }
        self.last_metrics_emit = now;

        if let Ok(guard) = metrics.lock() {
            let event = guard.snapshot().to_log_event(&self.metrics_target);
            let _ = logger.log_event(event);
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            let event = event_with_fields(level, CLASSIFIER_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

fn not_found(name: &str) -> ClassifierError {
    ClassifierError::NotFound {
        name: name.to_string(),
    }
}

impl fmt::Debug for ViewportClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportClassifier")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("definitions", &self.definitions)
            .field("membership", &self.membership)
            .finish_non_exhaustive()
    }
}
