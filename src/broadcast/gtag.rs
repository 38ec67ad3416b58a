//! Binary granted/denied broadcaster (Google consent-mode shape).
//!
//! The vendor consumes `gtag("consent", "update", {...})` calls where every
//! category is either `"granted"` or `"denied"`. The page global is
//! injected behind [`GtagApi`]; when the vendor script has not loaded,
//! every broadcast is a silent no-op.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::broadcast::broadcaster::{map_to_vendor, ConsentBroadcaster};
use crate::broadcast::events::ConsentEvent;
use crate::migration::mapping::{parse_mapping, OrderedMapping};

pub const GRANTED: &str = "granted";
pub const DENIED: &str = "denied";

/// Injected handle for the vendor's global `gtag` function.
pub trait GtagApi: Send + Sync {
    /// Whether the vendor global is present on the page.
    fn is_loaded(&self) -> bool;

    /// `gtag("consent", "update", payload)`.
    fn consent_update(&self, payload: &[(String, String)]);

    /// Vendor-side consent read-back, when the vendor exposes one.
    fn read_consent(&self) -> Option<Value> {
        None
    }
}

/// Default canonical-key to consent-mode-category mapping.
pub fn default_mapping() -> OrderedMapping {
    OrderedMapping::from_entries(vec![
        ("analytics".into(), vec!["analytics_storage".into()]),
        (
            "advertising".into(),
            vec![
                "ad_storage".into(),
                "ad_personalization".into(),
                "ad_user_data".into(),
            ],
        ),
        (
            "marketing".into(),
            vec![
                "ad_storage".into(),
                "ad_personalization".into(),
                "ad_user_data".into(),
            ],
        ),
        (
            "functional".into(),
            vec![
                "functionality_storage".into(),
                "personalization_storage".into(),
            ],
        ),
        (
            "data_sales_and_sharing".into(),
            vec!["ad_personalization".into(), "ad_user_data".into()],
        ),
    ])
}

/// Broadcaster for the binary granted/denied vocabulary.
pub struct GtagBroadcaster {
    mapping: OrderedMapping,
    api: Arc<dyn GtagApi>,
}

impl GtagBroadcaster {
    pub fn new(api: Arc<dyn GtagApi>) -> Self {
        Self { mapping: default_mapping(), api }
    }

    /// Replace the built-in mapping with a fully custom one.
    pub fn with_mapping(mut self, mapping: OrderedMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Apply an integrator-supplied mapping string (URL-encoded JSON).
    /// Malformed configuration keeps the built-in defaults.
    pub fn with_mapping_config(self, raw: Option<&str>) -> Self {
        match raw.and_then(parse_mapping) {
            Some(mapping) => self.with_mapping(mapping),
            None => self,
        }
    }
}

impl ConsentBroadcaster for GtagBroadcaster {
    fn name(&self) -> &'static str {
        "gtag"
    }

    fn broadcast(&self, event: &ConsentEvent) {
        let payload: Vec<(String, String)> = map_to_vendor(&self.mapping, &event.consent)
            .into_iter()
            .map(|(category, granted)| {
                (category, if granted { GRANTED } else { DENIED }.to_string())
            })
            .collect();

        // Zero entries: skip the vendor call entirely.
        if payload.is_empty() {
            return;
        }
        if !self.api.is_loaded() {
            debug!("gtag global absent, skipping consent update");
            return;
        }
        self.api.consent_update(&payload);
    }

    fn consent(&self) -> Option<Value> {
        if !self.api.is_loaded() {
            return None;
        }
        self.api.read_consent()
    }
}
