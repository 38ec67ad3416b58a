//! TCF-string provider (SourcePoint-style).
//!
//! The third-party cookie holds an IAB TC string. Decoding the string is
//! delegated to an injected [`TcfStringDecoder`]; this crate only consumes
//! the resulting purpose consent and legitimate-interest sets. A mapped
//! purpose counts as consented when it appears in either set.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::base::error::ConsentError;
use crate::cookie::model::ConsentMap;
use crate::migration::mapping::parse_mapping;
use crate::migration::provider::{write_first, ConsentMigrationProvider, MigrationMethod};

/// Default cookie name used by the TCF-string tool.
pub const SOURCEPOINT_COOKIE_NAME: &str = "euconsent-v2";

/// Purpose grants extracted from a TC string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TcfDecodeResult {
    pub purpose_consents: BTreeSet<u16>,
    pub purpose_legitimate_interests: BTreeSet<u16>,
}

/// External TC-string decoder, treated as a trusted black box.
pub trait TcfStringDecoder: Send + Sync {
    fn decode(&self, tc_string: &str) -> Result<TcfDecodeResult, ConsentError>;
}

/// Migration provider for TCF-string consent cookies.
pub struct SourcePointProvider {
    cookie_name: String,
    mapping_config: Option<String>,
    decoder: Arc<dyn TcfStringDecoder>,
}

impl SourcePointProvider {
    /// `mapping_config` is a URL-encoded JSON object mapping TCF purpose
    /// ids (as strings) to canonical consent keys, e.g.
    /// `{"1":["essential"],"4":["advertising"]}`.
    pub fn new(mapping_config: Option<String>, decoder: Arc<dyn TcfStringDecoder>) -> Self {
        Self {
            cookie_name: SOURCEPOINT_COOKIE_NAME.to_string(),
            mapping_config,
            decoder,
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }
}

impl ConsentMigrationProvider for SourcePointProvider {
    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn migration_method(&self) -> MigrationMethod {
        MigrationMethod::SourcePoint
    }

    fn convert(&self, raw: &str) -> Option<ConsentMap> {
        let mapping = parse_mapping(self.mapping_config.as_deref()?)?;

        // An invalid TC string means "no purposes consented", not "provider
        // absent": the provider was configured and did find a cookie, only
        // the decode failed, so the result stays defined.
        let decoded = match self.decoder.decode(raw) {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!(error = %err, "TC string failed to decode, treating as no purposes consented");
                TcfDecodeResult::default()
            }
        };

        let mut consent = ConsentMap::new();
        for (purpose, keys) in mapping.iter() {
            let Ok(id) = purpose.parse::<u16>() else {
                debug!(purpose, "mapping key is not a TCF purpose id, skipping");
                continue;
            };
            let consented = decoded.purpose_consents.contains(&id)
                || decoded.purpose_legitimate_interests.contains(&id);
            write_first(&mut consent, keys, consented);
        }
        Some(consent)
    }
}
