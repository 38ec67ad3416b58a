//! Consent-change event bus.
//!
//! Publish/subscribe with an explicit delivery guarantee: synchronous,
//! single-threaded, at-least-once, handlers invoked in registration order.
//! A handler registered after consent is already known receives one
//! synthetic `Ready` delivery so late registrants never miss current state.

use crate::cookie::model::ConsentMap;

/// Lifecycle events signalling "consent is now known" and "consent
/// changed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentEventKind {
    Ready,
    Updated,
}

/// Which event kinds trigger a handler. Default: both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSelection {
    pub ready: bool,
    pub updated: bool,
}

impl Default for EventSelection {
    fn default() -> Self {
        Self { ready: true, updated: true }
    }
}

impl EventSelection {
    pub const ALL: EventSelection = EventSelection { ready: true, updated: true };

    pub fn ready_only() -> Self {
        Self { ready: true, updated: false }
    }

    pub fn updated_only() -> Self {
        Self { ready: false, updated: true }
    }

    pub fn includes(&self, kind: ConsentEventKind) -> bool {
        match kind {
            ConsentEventKind::Ready => self.ready,
            ConsentEventKind::Updated => self.updated,
        }
    }
}

/// Snapshot of canonical consent carried on each event.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsentEvent {
    pub kind: ConsentEventKind,
    pub consent: ConsentMap,
    pub consent_string: Option<String>,
}

type Handler = Box<dyn Fn(&ConsentEvent) + Send + Sync>;

/// Synchronous consent event bus.
#[derive(Default)]
pub struct ConsentEventBus {
    handlers: Vec<(EventSelection, Handler)>,
    current: Option<ConsentEvent>,
}

impl ConsentEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for the selected event kinds.
    ///
    /// If consent is already known, the handler fires once synthetically
    /// with a `Ready` event (provided its selection includes `Ready`).
    pub fn subscribe(
        &mut self,
        selection: EventSelection,
        handler: impl Fn(&ConsentEvent) + Send + Sync + 'static,
    ) {
        if selection.ready {
            if let Some(current) = &self.current {
                let replay = ConsentEvent {
                    kind: ConsentEventKind::Ready,
                    consent: current.consent.clone(),
                    consent_string: current.consent_string.clone(),
                };
                handler(&replay);
            }
        }
        self.handlers.push((selection, Box::new(handler)));
    }

    /// Deliver an event to every matching handler, in registration order,
    /// and remember it as the current snapshot for later subscribers.
    pub fn publish(&mut self, event: ConsentEvent) {
        for (selection, handler) in &self.handlers {
            if selection.includes(event.kind) {
                handler(&event);
            }
        }
        self.current = Some(event);
    }

    pub fn current(&self) -> Option<&ConsentEvent> {
        self.current.as_ref()
    }
}
