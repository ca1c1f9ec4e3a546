//! Zone event system following Game Engine Architecture Ch 16.8
//!
//! Key principles:
//! - Zones queue events right after the transition that caused them
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Registration system (only notify interested handlers)
//! - Delivery happens once per frame in the late update

use crate::ecs::Entity;
use std::collections::HashMap;
use std::fmt;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZoneEventType {
    /// An object stayed eligible in a zone for the confirmation time
    Detected,
    /// A detected object left the zone or was released
    Removed,
    /// An attached object reached its anchor pose
    Snapped,
    /// An attached object was let go by its zone
    Unsnapped,
    /// An object's pose came within tolerance of the reference
    PlacementMatched,
    /// An object's pose drifted out of tolerance
    PlacementUnmatched,
}

impl fmt::Display for ZoneEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Detected => "detected",
            Self::Removed => "removed",
            Self::Snapped => "snapped",
            Self::Unsnapped => "unsnapped",
            Self::PlacementMatched => "placement-matched",
            Self::PlacementUnmatched => "placement-unmatched",
        };
        f.write_str(name)
    }
}

/// Edge-triggered notification raised by a zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneEvent {
    /// Type of event
    pub event_type: ZoneEventType,
    /// Zone that raised the event
    pub zone: Entity,
    /// Object the event is about
    pub object: Entity,
    /// Simulation time of the zone when the event was raised (seconds)
    pub timestamp: f64,
}

impl ZoneEvent {
    /// Create a new event
    pub fn new(event_type: ZoneEventType, zone: Entity, object: Entity, timestamp: f64) -> Self {
        Self {
            event_type,
            zone,
            object,
            timestamp,
        }
    }
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
/// Returns false to allow forwarding to other handlers
pub trait ZoneEventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &ZoneEvent) -> bool;
}

impl<F> ZoneEventHandler for F
where
    F: FnMut(&ZoneEvent) -> bool,
{
    fn on_event(&mut self, event: &ZoneEvent) -> bool {
        self(event)
    }
}

/// Per-zone event queue with handler registration
/// Follows chain of responsibility pattern
pub struct EventSystem {
    queue: Vec<ZoneEvent>,
    handlers: HashMap<ZoneEventType, Vec<Box<dyn ZoneEventHandler>>>,
    current_time: f64,
}

impl EventSystem {
    /// Create a new empty event system
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            handlers: HashMap::new(),
            current_time: 0.0,
        }
    }

    /// Update current time (seconds since start)
    pub fn update_time(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Current time used to stamp queued events
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Register a handler for a specific event type
    /// Only handlers registered for this type will be notified
    pub fn register_handler(&mut self, event_type: ZoneEventType, handler: Box<dyn ZoneEventHandler>) {
        self.handlers.entry(event_type).or_default().push(handler);
    }

    /// Queue an event for delivery in the next dispatch
    pub fn send(&mut self, event: ZoneEvent) {
        self.queue.push(event);
    }

    /// Queue an event stamped with the current time
    pub fn emit(&mut self, event_type: ZoneEventType, zone: Entity, object: Entity) {
        log::debug!("Zone {:?} raised {} for {:?}", zone, event_type, object);
        self.send(ZoneEvent::new(event_type, zone, object, self.current_time));
    }

    /// Events waiting for dispatch
    pub fn pending(&self) -> &[ZoneEvent] {
        &self.queue
    }

    /// Dispatch all pending events in the order they were raised
    ///
    /// Returns the dispatched events so callers can also poll them.
    pub fn dispatch(&mut self) -> Vec<ZoneEvent> {
        let events = std::mem::take(&mut self.queue);
        for event in &events {
            self.dispatch_event(event);
        }
        events
    }

    /// Dispatch single event to registered handlers
    /// Stops on first handler that returns true (consumed)
    fn dispatch_event(&mut self, event: &ZoneEvent) {
        if let Some(handlers) = self.handlers.get_mut(&event.event_type) {
            for handler in handlers.iter_mut() {
                if handler.on_event(event) {
                    // Event consumed, stop forwarding
                    break;
                }
            }
        }
    }

    /// Clear all queued events
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSystem")
            .field("queued", &self.queue.len())
            .field("handler_types", &self.handlers.len())
            .field("current_time", &self.current_time)
            .finish()
    }
}
