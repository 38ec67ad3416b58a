//! Structured standard/version/value broadcaster.
//!
//! The vendor consumes an array of consent directives, one per named
//! permission flag, each independently in or out:
//!
//! ```json
//! [{"standard": "analytics", "version": "1.0", "value": true}]
//! ```
//!
//! The receiving global API is injected behind [`PermissionsApi`].

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::broadcast::broadcaster::{map_to_vendor, ConsentBroadcaster};
use crate::broadcast::events::ConsentEvent;
use crate::migration::mapping::{parse_mapping, OrderedMapping};

/// Directive vocabulary revision pushed alongside each flag.
pub const DIRECTIVE_VERSION: &str = "1.0";

/// One named permission flag in the vendor's structured vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsentDirective {
    pub standard: String,
    pub version: String,
    pub value: bool,
}

/// Injected handle for the vendor's structured consent API.
pub trait PermissionsApi: Send + Sync {
    fn is_loaded(&self) -> bool;

    fn push(&self, directives: &[ConsentDirective]);

    /// This vocabulary's vendors expose no read API by default.
    fn read_consent(&self) -> Option<Value> {
        None
    }
}

/// Default canonical-key to permission-flag mapping.
pub fn default_mapping() -> OrderedMapping {
    OrderedMapping::from_entries(vec![
        ("analytics".into(), vec!["analytics".into()]),
        ("advertising".into(), vec!["targeted_advertising".into()]),
        ("marketing".into(), vec!["targeted_advertising".into()]),
        ("functional".into(), vec!["functional".into()]),
        ("data_sales_and_sharing".into(), vec!["sale_of_info".into()]),
    ])
}

/// Broadcaster for the structured standard/version/value vocabulary.
pub struct PermissionsBroadcaster {
    mapping: OrderedMapping,
    version: String,
    api: Arc<dyn PermissionsApi>,
}

impl PermissionsBroadcaster {
    pub fn new(api: Arc<dyn PermissionsApi>) -> Self {
        Self {
            mapping: default_mapping(),
            version: DIRECTIVE_VERSION.to_string(),
            api,
        }
    }

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

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl ConsentBroadcaster for PermissionsBroadcaster {
    fn name(&self) -> &'static str {
        "permissions"
    }

    fn broadcast(&self, event: &ConsentEvent) {
        let directives: Vec<ConsentDirective> = map_to_vendor(&self.mapping, &event.consent)
            .into_iter()
            .map(|(standard, value)| ConsentDirective {
                standard,
                version: self.version.clone(),
                value,
            })
            .collect();

        if directives.is_empty() {
            return;
        }
        if !self.api.is_loaded() {
            debug!("permissions API absent, skipping consent push");
            return;
        }
        self.api.push(&directives);
    }

    fn consent(&self) -> Option<Value> {
        if !self.api.is_loaded() {
            return None;
        }
        self.api.read_consent()
    }
}
