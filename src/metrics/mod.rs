use crate::classifier::DimensionChange;
use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

#[derive(Debug, Default, Clone)]
pub struct ClassifierMetrics {
    passes: u64,
    resizes: u64,
    enters: u64,
    leaves: u64,
    width_changes: u64,
    height_changes: u64,
    size_changes: u64,
}

impl ClassifierMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&mut self, enters: usize, leaves: usize) {
        self.passes = self.passes.saturating_add(1);
        self.enters = self.enters.saturating_add(enters as u64);
        self.leaves = self.leaves.saturating_add(leaves as u64);
    }

    pub fn record_resize(&mut self, change: DimensionChange) {
        self.resizes = self.resizes.saturating_add(1);
        match change {
            DimensionChange::Width => self.width_changes = self.width_changes.saturating_add(1),
            DimensionChange::Height => self.height_changes = self.height_changes.saturating_add(1),
            DimensionChange::Size => self.size_changes = self.size_changes.saturating_add(1),
            DimensionChange::Suppressed | DimensionChange::Unchanged => {}
        }
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            passes: self.passes,
            resizes: self.resizes,
            enters: self.enters,
            leaves: self.leaves,
            width_changes: self.width_changes,
            height_changes: self.height_changes,
            size_changes: self.size_changes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub passes: u64,
    pub resizes: u64,
    pub enters: u64,
    pub leaves: u64,
    pub width_changes: u64,
    pub height_changes: u64,
    pub size_changes: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("passes".to_string(), json!(self.passes));
        map.insert("resizes".to_string(), json!(self.resizes));
        map.insert("enters".to_string(), json!(self.enters));
        map.insert("leaves".to_string(), json!(self.leaves));
        map.insert("width_changes".to_string(), json!(self.width_changes));
        map.insert("height_changes".to_string(), json!(self.height_changes));
        map.insert("size_changes".to_string(), json!(self.size_changes));
        map
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "classifier_metrics", self.as_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_counts_only_the_fired_dimension() {
        let mut metrics = ClassifierMetrics::new();
        metrics.record_resize(DimensionChange::Width);
        metrics.record_resize(DimensionChange::Size);
        metrics.record_resize(DimensionChange::Suppressed);

        let snap = metrics.snapshot();
        assert_eq!(snap.resizes, 3);
        assert_eq!(snap.width_changes, 1);
        assert_eq!(snap.size_changes, 1);
        assert_eq!(snap.height_changes, 0);
    }

    #[test]
    fn snapshot_log_event_carries_counters() {
        let mut metrics = ClassifierMetrics::new();
        metrics.record_pass(2, 1);
        let event = metrics.snapshot().to_log_event("viewport::metrics");
        assert_eq!(event.message, "classifier_metrics");
        assert_eq!(event.field("enters"), Some(&json!(2)));
        assert_eq!(event.field("leaves"), Some(&json!(1)));
        assert_eq!(event.field("passes"), Some(&json!(1)));
    }
}
