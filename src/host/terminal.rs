use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent};
use crossterm::terminal;

use super::{ResizeBus, ViewportMetrics};

/// Treats the terminal as the viewport: width in columns, height in rows.
///
/// The "client" reading asks the terminal directly; the "inner" reading is the
/// size carried by the last resize event seen by a [`TerminalResizePump`].
#[derive(Debug, Default, Clone)]
pub struct TerminalViewport {
    last_event: Arc<Mutex<Option<(u16, u16)>>>,
}

impl TerminalViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_resize(&self, width: u16, height: u16) {
        if let Ok(mut guard) = self.last_event.lock() {
            *guard = Some((width, height));
        }
    }

    fn last_event(&self) -> Option<(u16, u16)> {
        self.last_event.lock().ok().and_then(|guard| *guard)
    }
}

impl ViewportMetrics for TerminalViewport {
    fn client_width(&self) -> Option<u32> {
        terminal::size().ok().map(|(w, _)| u32::from(w))
    }

    fn inner_width(&self) -> Option<u32> {
        self.last_event().map(|(w, _)| u32::from(w))
    }

    fn client_height(&self) -> Option<u32> {
        terminal::size().ok().map(|(_, h)| u32::from(h))
    }

    fn inner_height(&self) -> Option<u32> {
        self.last_event().map(|(_, h)| u32::from(h))
    }
}

/// Polls crossterm for resize events and forwards them to a [`ResizeBus`].
pub struct TerminalResizePump {
    viewport: TerminalViewport,
}

impl TerminalResizePump {
    pub fn new(viewport: TerminalViewport) -> Self {
        Self { viewport }
    }

    /// Waits up to `timeout` for one terminal event. Returns `true` when it
    /// was a resize and the bus has been notified.
    pub fn pump(&self, bus: &mut ResizeBus, timeout: Duration) -> io::Result<bool> {
        if !event::poll(timeout)? {
            return Ok(false);
        }
        self.dispatch(bus, event::read()?)
    }

    fn dispatch(&self, bus: &mut ResizeBus, event: CrosstermEvent) -> io::Result<bool> {
        match event {
            CrosstermEvent::Resize(width, height) => {
                self.viewport.record_resize(width, height);
                bus.notify();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
