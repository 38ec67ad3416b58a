//! Mapping configuration: untyped JSON in, typed ordered mapping out.
//!
//! Mapping strings arrive URL-encoded, possibly wrapped in single quotes,
//! and are parsed once per read attempt. The parse is strict at the
//! boundary: anything malformed yields `None` ("not configured") and the
//! rest of the crate only ever sees a typed [`OrderedMapping`].

use std::fmt;

use percent_encoding::percent_decode_str;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// A JSON-object mapping whose entries keep their declaration order.
///
/// serde_json's default map type would alphabetize keys, but both the
/// provider conflict rule (first write wins) and the broadcaster conflict
/// rule (last key wins) are defined in terms of declaration order, so the
/// order must survive parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedMapping {
    entries: Vec<(String, Vec<String>)>,
}

impl OrderedMapping {
    pub fn from_entries(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<'de> Deserialize<'de> for OrderedMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = OrderedMapping;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object mapping keys to arrays of strings")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, Vec<String>>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMapping { entries })
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

/// Parse a mapping configuration string.
///
/// URL-decodes, strips optional enclosing single quotes, then parses JSON.
/// Malformed input returns `None`, signalling "not configured" rather than
/// "asserts no consent" — `"{}"` is the way to say "configured but empty".
pub fn parse_mapping(raw: &str) -> Option<OrderedMapping> {
    let decoded = match percent_decode_str(raw.trim()).decode_utf8() {
        Ok(decoded) => decoded,
        Err(err) => {
            debug!(error = %err, "mapping configuration is not valid utf-8 after url-decoding");
            return None;
        }
    };

    let trimmed = decoded.trim();
    let trimmed = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(trimmed);

    match serde_json::from_str(trimmed) {
        Ok(mapping) => Some(mapping),
        Err(err) => {
            debug!(error = %err, "mapping configuration failed to parse, provider disabled");
            None
        }
    }
}
