//! Zone scenario tests
//!
//! `mock_host` drives zones through the [`ZoneHost`](crate::zones::ZoneHost)
//! seam directly; `system_integration` runs them inside the built-in world.

mod mock_host;

mod system_integration;

use crate::events::{ZoneEvent, ZoneEventType};

/// Event types in the order they were raised
pub(crate) fn event_types(events: &[ZoneEvent]) -> Vec<ZoneEventType> {
    events.iter().map(|e| e.event_type).collect()
}
