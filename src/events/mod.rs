//! Event Bus
//!
//! Audits and the comparator report what they are doing by triggering events.
//! The bus can be muted (nothing fires, nothing is captured) and can capture
//! listener calls instead of running them. Captured calls are later either
//! released (replayed) or cleared (discarded), which is how combinators hide
//! the diagnostics of speculative branches.
//!
//! Capture sessions nest. Each `capture()` opens a fresh buffer; `release()`
//! and `clear()` close the innermost one. Releasing while an outer session is
//! still open hands the events to that outer session instead of running them,
//! so a combinator nested inside another combinator never leaks events past
//! its parent's decision.

pub mod event;
pub mod trace;

pub use event::{AuditSubject, CapturedEvent, CombinatorSubject, Event, EventName, Listener};

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{trace, warn};

/// Named listeners plus mute and capture state for one validation run
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventName, Vec<Listener>>,
    mute_depth: usize,
    frames: Vec<Vec<CapturedEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; several listeners may share a name and run in
    /// registration order
    pub fn add_listener<F>(&mut self, name: EventName, listener: F) -> &mut Self
    where
        F: Fn(&Event) + 'static,
    {
        self.add_shared_listener(name, Rc::new(listener))
    }

    pub fn add_shared_listener(&mut self, name: EventName, listener: Listener) -> &mut Self {
        self.listeners.entry(name).or_default().push(listener);
        self
    }

    pub fn listeners(&self, name: &EventName) -> &[Listener] {
        self.listeners.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn has_listeners(&self, name: &EventName) -> bool {
        !self.listeners(name).is_empty()
    }

    /// Fire an event at every listener registered under its name
    ///
    /// Does nothing while muted. While capturing, each listener call is
    /// buffered instead and observers of [`EventName::Captured`] are told.
    pub fn trigger(&mut self, event: Event) -> &mut Self {
        if self.is_silent() {
            return self;
        }

        let name = event.name();
        if name.is_reserved() {
            self.notify(&event);
            return self;
        }

        let listeners = match self.listeners.get(&name) {
            Some(listeners) if !listeners.is_empty() => listeners.clone(),
            _ => return self,
        };
        let watch_captures = self.has_listeners(&EventName::Captured);

        for listener in listeners {
            match self.frames.last_mut() {
                Some(frame) => {
                    let captured = CapturedEvent::new(name.clone(), listener, event.clone());
                    if watch_captures {
                        frame.push(captured.clone());
                        self.notify(&Event::Captured(Box::new(captured)));
                    } else {
                        frame.push(captured);
                    }
                }
                None => listener(&event),
            }
        }

        self
    }

    /// Deliver straight to listeners, never captured
    fn notify(&self, event: &Event) {
        if self.is_silent() {
            return;
        }
        for listener in self.listeners(&event.name()) {
            listener(event);
        }
    }

    pub fn mute(&mut self) -> &mut Self {
        self.mute_depth += 1;
        self
    }

    /// Undo one `mute()`; the bus speaks again once every mute is undone
    pub fn unmute(&mut self) -> &mut Self {
        if self.mute_depth == 0 {
            warn!("unmute called on an event bus that is not muted");
        } else {
            self.mute_depth -= 1;
        }
        self
    }

    pub fn is_silent(&self) -> bool {
        self.mute_depth > 0
    }

    /// Open a new capture session
    pub fn capture(&mut self) -> &mut Self {
        self.frames.push(Vec::new());
        trace!(depth = self.frames.len(), "capture session opened");
        self
    }

    pub fn is_capturing(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Number of open capture sessions
    pub fn capture_depth(&self) -> usize {
        self.frames.len()
    }

    /// Events held by the innermost capture session
    pub fn captured_events(&self) -> &[CapturedEvent] {
        self.frames.last().map_or(&[], Vec::as_slice)
    }

    /// Close the innermost capture session and replay what it held
    pub fn release(&mut self) -> &mut Self {
        let Some(events) = self.frames.pop() else {
            warn!("release called with no open capture session");
            return self;
        };
        trace!(depth = self.frames.len(), count = events.len(), "capture session released");

        if self.has_listeners(&EventName::CapturedReleased) {
            self.notify(&Event::CapturedReleased {
                events: events.clone(),
            });
        }
        self.replay(events)
    }

    /// Close the innermost capture session without running anything
    ///
    /// The discarded events are handed back so callers can keep a copy.
    pub fn clear(&mut self) -> Vec<CapturedEvent> {
        let Some(events) = self.frames.pop() else {
            warn!("clear called with no open capture session");
            return Vec::new();
        };
        trace!(depth = self.frames.len(), count = events.len(), "capture session cleared");

        if self.has_listeners(&EventName::CapturedCleared) {
            self.notify(&Event::CapturedCleared {
                events: events.clone(),
            });
        }
        events
    }

    /// Replay previously captured events
    ///
    /// If a capture session is open they join it, otherwise each listener
    /// runs now. A muted bus drops them.
    pub fn replay(&mut self, events: Vec<CapturedEvent>) -> &mut Self {
        if self.is_silent() || events.is_empty() {
            return self;
        }
        match self.frames.last_mut() {
            Some(frame) => frame.extend(events),
            None => {
                for captured in &events {
                    self.run_listener(captured);
                }
            }
        }
        self
    }

    /// Run one captured listener call directly
    pub fn run_listener(&self, captured: &CapturedEvent) {
        (captured.listener())(captured.event());
    }

    /// Drop every open capture session and mute level
    pub fn reset(&mut self) {
        if !self.frames.is_empty() || self.mute_depth > 0 {
            warn!(
                open_sessions = self.frames.len(),
                mute_depth = self.mute_depth,
                "resetting event bus with unbalanced state"
            );
        }
        self.frames.clear();
        self.mute_depth = 0;
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.listeners.keys().map(ToString::to_string).collect();
        names.sort();
        f.debug_struct("EventBus")
            .field("listeners", &names)
            .field("mute_depth", &self.mute_depth)
            .field("capture_depth", &self.frames.len())
            .finish()
    }
}
