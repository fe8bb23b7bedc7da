//! Seams to the host environment.
//!
//! The classifier never measures anything itself. It reads dimensions from a
//! [`ViewportMetrics`] source and is told about resizes by a
//! [`ResizeSource`]. Subscriptions are explicit handles that can be cancelled.

use std::sync::{Arc, Mutex};

pub mod terminal;

pub use terminal::{TerminalResizePump, TerminalViewport};

/// Current viewport readings. Each dimension has two candidate readings; the
/// classifier uses the larger one and treats a missing reading as zero.
pub trait ViewportMetrics: Send {
    fn client_width(&self) -> Option<u32>;
    fn inner_width(&self) -> Option<u32>;
    fn client_height(&self) -> Option<u32>;
    fn inner_height(&self) -> Option<u32>;

    fn width(&self) -> u32 {
        self.client_width()
            .unwrap_or(0)
            .max(self.inner_width().unwrap_or(0))
    }

    fn height(&self) -> u32 {
        self.client_height()
            .unwrap_or(0)
            .max(self.inner_height().unwrap_or(0))
    }
}

/// Zero-argument resize notification.
pub type ResizeListener = Box<dyn FnMut() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Anything that can deliver resize notifications.
pub trait ResizeSource {
    fn subscribe(&mut self, listener: ResizeListener) -> SubscriptionId;

    /// Returns `false` when the id was not (or no longer) subscribed.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Handle returned when a listener is attached to a [`ResizeSource`].
#[must_use = "dropping the handle leaves the listener attached"]
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
}

impl Subscription {
    pub fn new(id: SubscriptionId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn cancel<S>(self, source: &mut S) -> bool
    where
        S: ResizeSource + ?Sized,
    {
        source.unsubscribe(self.id)
    }
}

/// In-process resize source; `notify` calls every listener synchronously in
/// subscription order.
#[derive(Default)]
pub struct ResizeBus {
    listeners: Vec<(SubscriptionId, ResizeListener)>,
    next_id: u64,
}

impl ResizeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ResizeSource for ResizeBus {
    fn subscribe(&mut self, listener: ResizeListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ViewportReadings {
    pub client_width: Option<u32>,
    pub inner_width: Option<u32>,
    pub client_height: Option<u32>,
    pub inner_height: Option<u32>,
}

/// Viewport whose readings are set by the host. Clones share state, so one
/// clone can be handed to the classifier while another is updated.
#[derive(Debug, Default, Clone)]
pub struct SharedViewport {
    inner: Arc<Mutex<ViewportReadings>>,
}

impl SharedViewport {
    pub fn new(width: u32, height: u32) -> Self {
        let viewport = Self::default();
        viewport.set_size(width, height);
        viewport
    }

    /// Sets both readings of each dimension.
    pub fn set_size(&self, width: u32, height: u32) {
        self.set_readings(ViewportReadings {
            client_width: Some(width),
            inner_width: Some(width),
            client_height: Some(height),
            inner_height: Some(height),
        });
    }

    pub fn set_readings(&self, readings: ViewportReadings) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = readings;
        }
    }

    fn readings(&self) -> ViewportReadings {
        self.inner.lock().map(|guard| *guard).unwrap_or_default()
    }
}

impl ViewportMetrics for SharedViewport {
    fn client_width(&self) -> Option<u32> {
        self.readings().client_width
    }

    fn inner_width(&self) -> Option<u32> {
        self.readings().inner_width
    }

    fn client_height(&self) -> Option<u32> {
        self.readings().client_height
    }

    fn inner_height(&self) -> Option<u32> {
        self.readings().inner_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn dimensions_take_the_larger_reading() {
        let viewport = SharedViewport::default();
        viewport.set_readings(ViewportReadings {
            client_width: Some(1004),
            inner_width: Some(1020),
            client_height: None,
            inner_height: Some(700),
        });
        assert_eq!(viewport.width(), 1020);
        assert_eq!(viewport.height(), 700);
    }

    #[test]
    fn missing_readings_fall_back_to_zero() {
        let viewport = SharedViewport::default();
        assert_eq!(viewport.width(), 0);
        assert_eq!(viewport.height(), 0);
    }

    #[test]
    fn cancelled_subscription_stops_notifications() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut bus = ResizeBus::new();
        let counter = Arc::clone(&hits);
        let sub = Subscription::new(bus.subscribe(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        bus.notify();
        let id = sub.id();
        assert!(sub.cancel(&mut bus));
        bus.notify();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
        assert!(!bus.unsubscribe(id));
    }
}
