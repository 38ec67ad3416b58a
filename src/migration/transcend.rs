//! Purpose-object provider (Transcend-style).
//!
//! The third-party cookie is a JSON object carrying a `purposes` map of
//! purpose name to `true`, `false`, or the string `"Auto"`. `true` and
//! `"Auto"` both count as consented; anything else does not. Purposes
//! absent from the cookie are skipped entirely, never defaulted to false.

use serde_json::Value;
use tracing::debug;

use crate::cookie::model::ConsentMap;
use crate::migration::mapping::parse_mapping;
use crate::migration::provider::{write_first, ConsentMigrationProvider, MigrationMethod};

/// Default cookie name used by the purpose-object tool.
pub const TRANSCEND_COOKIE_NAME: &str = "tcmConsent";

/// Migration provider for purpose-object consent cookies.
pub struct TranscendProvider {
    cookie_name: String,
    mapping_config: Option<String>,
}

impl TranscendProvider {
    /// `mapping_config` is a URL-encoded JSON object mapping purpose names
    /// to canonical consent keys, e.g.
    /// `{"Analytics":["analytics_opt_out"],"SaleOfInfo":["data_sales"]}`.
    pub fn new(mapping_config: Option<String>) -> Self {
        Self {
            cookie_name: TRANSCEND_COOKIE_NAME.to_string(),
            mapping_config,
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }
}

impl ConsentMigrationProvider for TranscendProvider {
    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn migration_method(&self) -> MigrationMethod {
        MigrationMethod::Transcend
    }

    fn convert(&self, raw: &str) -> Option<ConsentMap> {
        let mapping = parse_mapping(self.mapping_config.as_deref()?)?;

        let body: Value = match serde_json::from_str(raw) {
            Ok(body) => body,
            Err(err) => {
                debug!(error = %err, "purpose-object cookie is not valid JSON, trying next provider");
                return None;
            }
        };
        let purposes = body.get("purposes").and_then(Value::as_object)?;

        let mut consent = ConsentMap::new();
        for (purpose, keys) in mapping.iter() {
            // Absent purposes are skipped, not treated as refusals.
            let Some(value) = purposes.get(purpose) else {
                continue;
            };
            let consented = matches!(value, Value::Bool(true))
                || matches!(value, Value::String(s) if s == "Auto");
            write_first(&mut consent, keys, consented);
        }
        Some(consent)
    }
}
