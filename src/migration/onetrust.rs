//! Category-group provider (OneTrust-style).
//!
//! The third-party cookie is a query string whose `groups` value lists
//! `CATEGORY:FLAG` pairs, e.g. `...&groups=C0001:1,C0002:0`. A flag of `1`
//! means consented; anything else means not consented.

use url::form_urlencoded;

use crate::cookie::model::ConsentMap;
use crate::migration::mapping::parse_mapping;
use crate::migration::provider::{write_first, ConsentMigrationProvider, MigrationMethod};

/// Default cookie name used by the category-group tool.
pub const ONETRUST_COOKIE_NAME: &str = "OptanonConsent";

/// Migration provider for category-group consent cookies.
pub struct OneTrustProvider {
    cookie_name: String,
    mapping_config: Option<String>,
}

impl OneTrustProvider {
    /// `mapping_config` is a URL-encoded JSON object mapping category ids
    /// to canonical consent keys, e.g.
    /// `{"C0001":["essential"],"C0002":["performance"]}`.
    pub fn new(mapping_config: Option<String>) -> Self {
        Self {
            cookie_name: ONETRUST_COOKIE_NAME.to_string(),
            mapping_config,
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }
}

impl ConsentMigrationProvider for OneTrustProvider {
    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn migration_method(&self) -> MigrationMethod {
        MigrationMethod::OneTrust
    }

    fn convert(&self, raw: &str) -> Option<ConsentMap> {
        let mapping = parse_mapping(self.mapping_config.as_deref()?)?;

        let groups = form_urlencoded::parse(raw.as_bytes())
            .find(|(key, _)| key == "groups")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();

        let mut consent = ConsentMap::new();
        for segment in groups.split(',') {
            let mut parts = segment.splitn(2, ':');
            let Some(category) = parts.next() else { continue };
            let consented = parts.next() == Some("1");
            if let Some(keys) = mapping.get(category.trim()) {
                // First category that sets a canonical key wins.
                write_first(&mut consent, keys, consented);
            }
        }
        Some(consent)
    }
}
