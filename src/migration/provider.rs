//! Migration provider trait and registry.
//!
//! A provider knows how to read one third-party consent cookie and
//! translate it into the canonical consent map. The registry consults
//! providers in registration order and adopts the first one that both
//! finds its cookie and produces a translation; later providers are never
//! consulted.

use tracing::debug;

use crate::cookie::model::{ConsentMap, ConsentValue};
use crate::cookie::store::CookieStore;

/// Tag recorded on the canonical cookie when consent was seeded from a
/// third-party tool rather than chosen in-product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationMethod {
    OneTrust,
    Transcend,
    SourcePoint,
}

impl MigrationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationMethod::OneTrust => "onetrust",
            MigrationMethod::Transcend => "transcend",
            MigrationMethod::SourcePoint => "sourcepoint",
        }
    }
}

/// Adapter for one third-party consent cookie format.
pub trait ConsentMigrationProvider: Send + Sync {
    /// Name of the third-party cookie this provider reads.
    fn cookie_name(&self) -> &str;

    /// Method tag recorded on the resulting canonical cookie.
    fn migration_method(&self) -> MigrationMethod;

    /// Raw read of the named cookie.
    fn get_consent_cookie(&self, store: &dyn CookieStore) -> Option<String> {
        store.get(self.cookie_name())
    }

    /// Translate the raw cookie value into canonical consent.
    ///
    /// `None` means "not configured" (no mapping, or malformed mapping) and
    /// tells the registry to try the next provider. A provider that is
    /// configured but finds nothing to translate returns an empty map.
    fn convert(&self, raw: &str) -> Option<ConsentMap>;
}

/// Consent adopted from a migration provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SeededConsent {
    pub consent: ConsentMap,
    pub method: MigrationMethod,
}

/// Ordered collection of migration providers.
#[derive(Default)]
pub struct MigrationRegistry {
    providers: Vec<(String, Box<dyn ConsentMigrationProvider>)>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under a name. Registration order is consultation
    /// order.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        provider: Box<dyn ConsentMigrationProvider>,
    ) {
        self.providers.push((name.into(), provider));
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Seed canonical consent from the first applicable provider.
    ///
    /// A provider applies when its cookie is present and its translation is
    /// defined. Cookie-read failures and malformed mappings just move on to
    /// the next provider; if none applies, no seeding occurs and consent
    /// stays empty (never defaulted).
    pub fn seed(&self, store: &dyn CookieStore) -> Option<SeededConsent> {
        for (name, provider) in &self.providers {
            let Some(raw) = provider.get_consent_cookie(store) else {
                debug!(provider = %name, cookie = provider.cookie_name(), "cookie absent, trying next provider");
                continue;
            };
            match provider.convert(&raw) {
                Some(consent) => {
                    debug!(provider = %name, keys = consent.len(), "consent seeded from provider");
                    return Some(SeededConsent {
                        consent,
                        method: provider.migration_method(),
                    });
                }
                None => {
                    debug!(provider = %name, "provider not configured, trying next provider");
                }
            }
        }
        None
    }
}

/// First-write-wins: keys already set by an earlier category stay as they
/// are; only unset keys take the new value.
pub(crate) fn write_first(map: &mut ConsentMap, keys: &[String], consented: bool) {
    for key in keys {
        map.entry(key.clone())
            .or_insert(ConsentValue::Flag(consented));
    }
}
