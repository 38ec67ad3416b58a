use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::base::error::ConsentError;

/// Current cookie schema revision, recorded in [`CookieMeta::version`].
pub const COOKIE_SCHEMA_VERSION: &str = "1.0";

/// Identity key under which the generated device id lives. Reserved:
/// callers cannot overwrite it through [`Identity::insert`].
pub const DEVICE_ID_KEY: &str = "device_id";

/// Prefix for identity keys asserted server-side after verification.
/// They can never be set from the client.
pub const VERIFIED_KEY_PREFIX: &str = "verified_";

/// Canonical consent map: stable consent key -> recorded value.
pub type ConsentMap = BTreeMap<String, ConsentValue>;

/// A recorded consent value.
///
/// Values are either plain booleans or one of a fixed tri-state preference
/// vocabulary; no other shapes are valid. Unknown shapes fail
/// deserialization, which the decode chain converts into "no cookie".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsentValue {
    Flag(bool),
    Preference(UserPreference),
}

/// Tri-state preference vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserPreference {
    OptIn,
    OptOut,
    Acknowledge,
}

impl ConsentValue {
    /// Collapse to the boolean the broadcaster vocabularies need.
    /// `Acknowledge` counts as granted: it records that the notice was
    /// shown for a notice-only purpose, not a refusal.
    pub fn is_granted(&self) -> bool {
        match self {
            ConsentValue::Flag(b) => *b,
            ConsentValue::Preference(UserPreference::OptIn) => true,
            ConsentValue::Preference(UserPreference::OptOut) => false,
            ConsentValue::Preference(UserPreference::Acknowledge) => true,
        }
    }
}

impl From<bool> for ConsentValue {
    fn from(b: bool) -> Self {
        ConsentValue::Flag(b)
    }
}

/// Visitor identity: a generated device id plus any externally supplied ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    device_id: String,
    #[serde(flatten)]
    extra: BTreeMap<String, String>,
}

impl Identity {
    /// Generate a fresh identity. The device id is created exactly once
    /// here and is immutable for the lifetime of the cookie.
    pub fn generate() -> Self {
        Self {
            device_id: uuid::Uuid::new_v4().to_string(),
            extra: BTreeMap::new(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if key == DEVICE_ID_KEY {
            return Some(&self.device_id);
        }
        self.extra.get(key).map(String::as_str)
    }

    /// Set an externally supplied identity value.
    ///
    /// This is the one operation in the crate that deliberately returns
    /// errors to the caller: a reserved or verified key, an invalid key, or
    /// an empty-after-trim value is a programmer error in the integration,
    /// not runtime variability.
    pub fn insert(&mut self, key: &str, value: &str) -> Result<(), ConsentError> {
        if key == DEVICE_ID_KEY {
            return Err(ConsentError::reserved_identity_key(key));
        }
        if key.starts_with(VERIFIED_KEY_PREFIX) {
            return Err(ConsentError::verified_identity_key(key));
        }
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConsentError::invalid_identity_key(key));
        }
        let value = value.trim();
        if value.is_empty() {
            return Err(ConsentError::empty_identity_value(key));
        }
        self.extra.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// TCF-style per-purpose and per-system consent and legitimate-interest
/// maps. Populated only when a TCF-capable experience is active; empty maps
/// are skipped during serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcfConsent {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub purpose_consents: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub purpose_legitimate_interests: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub system_consents: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub system_legitimate_interests: BTreeMap<String, bool>,
}

impl TcfConsent {
    pub fn is_empty(&self) -> bool {
        self.purpose_consents.is_empty()
            && self.purpose_legitimate_interests.is_empty()
            && self.system_consents.is_empty()
            && self.system_legitimate_interests.is_empty()
    }
}

/// Cookie bookkeeping. `created_at` is immutable; `updated_at` is refreshed
/// on every persisted mutation; `consent_method` records which migration
/// provider seeded the consent, when one did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieMeta {
    pub version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_method: Option<String>,
}

/// The canonical, versioned, in-memory representation of a visitor's
/// consent. Modeled as a single unit of persisted state: either a whole
/// valid cookie is stored, or nothing is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentCookie {
    pub identity: Identity,
    #[serde(default)]
    pub consent: ConsentMap,
    #[serde(default, skip_serializing_if = "TcfConsent::is_empty")]
    pub tcf_consent: TcfConsent,
    pub meta: CookieMeta,
    /// Encoded combined consent string (TC string plus extensions), kept in
    /// sync for consumers that understand only the encoded form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_string: Option<String>,
}

impl ConsentCookie {
    /// First-visit cookie: fresh device id, empty consent.
    pub fn new() -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            identity: Identity::generate(),
            consent: ConsentMap::new(),
            tcf_consent: TcfConsent::default(),
            meta: CookieMeta {
                version: COOKIE_SCHEMA_VERSION.to_string(),
                created_at: now,
                updated_at: now,
                consent_method: None,
            },
            consent_string: None,
        }
    }

    /// Refresh `updated_at`. Called on every persisted mutation so that
    /// `updated_at >= created_at` always holds.
    pub fn touch(&mut self) {
        let now = OffsetDateTime::now_utc();
        if now > self.meta.updated_at {
            self.meta.updated_at = now;
        }
    }

    /// Merge new consent decisions over the current map.
    pub fn update_consent(&mut self, changes: ConsentMap) {
        self.consent.extend(changes);
        self.touch();
    }

    pub fn is_granted(&self, key: &str) -> bool {
        self.consent.get(key).map(ConsentValue::is_granted).unwrap_or(false)
    }
}

impl Default for ConsentCookie {
    fn default() -> Self {
        Self::new()
    }
}
