//! Broadcaster trait and the shared mapping/merge algorithm.

use serde_json::Value;

use crate::broadcast::events::{ConsentEvent, EventSelection};
use crate::cookie::model::ConsentMap;
use crate::migration::mapping::OrderedMapping;

/// Maps canonical consent into one vendor's consent vocabulary and pushes
/// it to that vendor's API.
pub trait ConsentBroadcaster: Send + Sync {
    fn name(&self) -> &'static str;

    /// Which lifecycle events trigger this broadcaster.
    fn selection(&self) -> EventSelection {
        EventSelection::default()
    }

    /// Push the event's consent snapshot to the vendor. Must never fail:
    /// an absent vendor global is a silent no-op.
    fn broadcast(&self, event: &ConsentEvent);

    /// Diagnostic read-back of the vendor's own consent state. Vendors
    /// that expose no read API return `None` — the canonical cookie stays
    /// the only source of truth.
    fn consent(&self) -> Option<Value> {
        None
    }
}

/// Shared mapping/merge step: canonical consent in, ordered vendor
/// category booleans out.
///
/// Mapping entries are walked in declaration order. Canonical keys absent
/// from the consent map are skipped, so partial configurations degrade
/// gracefully instead of defaulting to denied. When two canonical keys
/// list the same vendor category, the last key processed wins — a
/// documented insertion-order dependency that integrators rely on.
pub fn map_to_vendor(mapping: &OrderedMapping, consent: &ConsentMap) -> Vec<(String, bool)> {
    let mut out: Vec<(String, bool)> = Vec::new();
    for (key, categories) in mapping.iter() {
        let Some(value) = consent.get(key) else {
            continue;
        };
        let granted = value.is_granted();
        for category in categories {
            match out.iter_mut().find(|(existing, _)| existing == category) {
                Some((_, slot)) => *slot = granted,
                None => out.push((category.clone(), granted)),
            }
        }
    }
    out
}
