//! Consent cookie codec: JSON serialization with an optional compression
//! layer and a decode fallback chain.
//!
//! `encode` never fails; anything that goes wrong inside the pipeline
//! degrades to the plain-JSON form. `decode` never fails either; it tries
//! each representation in turn and returns `None` when all of them are
//! exhausted, so a corrupted cookie is indistinguishable from a missing one.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use tracing::debug;

use crate::base::error::ConsentError;
use crate::cookie::model::ConsentCookie;

/// Literal marker prefixed to gzip-compressed cookie values.
pub const GZIP_MARKER: &str = "gzip:";

/// Encoding selected for the stored cookie value.
///
/// `Base64` is for storage media that disallow arbitrary characters; `Gzip`
/// is a size optimization. Neither changes what the cookie means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionMode {
    #[default]
    None,
    Base64,
    Gzip,
}

impl std::str::FromStr for CompressionMode {
    type Err = ConsentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(CompressionMode::None),
            "base64" => Ok(CompressionMode::Base64),
            "gzip" => Ok(CompressionMode::Gzip),
            other => Err(ConsentError::storage(format!(
                "unknown compression mode: {other}"
            ))),
        }
    }
}

/// Serialize a cookie to its storage string.
///
/// Never fails. A serialization error falls back to an empty JSON object
/// (which decodes to "no cookie", never to corrupt state); a missing or
/// failing compression primitive falls back to the uncompressed JSON form.
pub fn encode(cookie: &ConsentCookie, mode: CompressionMode) -> String {
    let json = match serde_json::to_string(cookie) {
        Ok(json) => json,
        Err(err) => {
            debug!(error = %err, "consent cookie failed to serialize, storing empty object");
            return String::from("{}");
        }
    };

    match mode {
        CompressionMode::None => json,
        CompressionMode::Base64 => BASE64_STANDARD.encode(&json),
        CompressionMode::Gzip => match gzip_compress(&json) {
            Some(bytes) => format!("{GZIP_MARKER}{}", BASE64_STANDARD.encode(bytes)),
            None => json,
        },
    }
}

/// Deserialize a storage string back into a cookie.
///
/// Recognizes, in order: the gzip marker form, base64-encoded JSON, and raw
/// JSON. Each stage is a `Result`-returning step; failure short-circuits to
/// the next stage. Returns `None` when every stage fails — callers treat
/// that identically to "no cookie present".
pub fn decode(raw: &str) -> Option<ConsentCookie> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    decode_gzip(raw)
        .or_else(|_| decode_base64(raw))
        .or_else(|_| decode_json(raw))
        .map_err(|err| {
            debug!(error = %err, "stored consent cookie is undecodable, treating as absent");
            err
        })
        .ok()
}

fn decode_gzip(raw: &str) -> Result<ConsentCookie, ConsentError> {
    let payload = raw
        .strip_prefix(GZIP_MARKER)
        .ok_or_else(|| ConsentError::storage("no gzip marker"))?;
    let compressed = BASE64_STANDARD
        .decode(payload)
        .map_err(|err| ConsentError::storage(format!("gzip payload is not base64: {err}")))?;
    let json = gzip_decompress(&compressed)
        .ok_or_else(|| ConsentError::storage("gzip payload failed to decompress"))?;
    parse_cookie(&json)
}

fn decode_base64(raw: &str) -> Result<ConsentCookie, ConsentError> {
    let bytes = BASE64_STANDARD
        .decode(raw)
        .map_err(|err| ConsentError::storage(format!("not base64: {err}")))?;
    let json = String::from_utf8(bytes)
        .map_err(|err| ConsentError::storage(format!("base64 payload is not utf-8: {err}")))?;
    parse_cookie(&json)
}

fn decode_json(raw: &str) -> Result<ConsentCookie, ConsentError> {
    parse_cookie(raw)
}

fn parse_cookie(json: &str) -> Result<ConsentCookie, ConsentError> {
    serde_json::from_str(json)
        .map_err(|err| ConsentError::storage(format!("not a consent cookie: {err}")))
}

#[cfg(feature = "gzip")]
fn gzip_compress(json: &str) -> Option<Vec<u8>> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes()).ok()?;
    encoder.finish().ok()
}

#[cfg(feature = "gzip")]
fn gzip_decompress(compressed: &[u8]) -> Option<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut json = String::new();
    GzDecoder::new(compressed).read_to_string(&mut json).ok()?;
    Some(json)
}

// Without the gzip feature the runtime lacks a compression primitive:
// encode falls back to plain JSON, decode fails the marker stage over to
// the base64/JSON stages.
#[cfg(not(feature = "gzip"))]
fn gzip_compress(_json: &str) -> Option<Vec<u8>> {
    None
}

#[cfg(not(feature = "gzip"))]
fn gzip_decompress(_compressed: &[u8]) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::model::{ConsentMap, ConsentValue};

    fn sample_cookie() -> ConsentCookie {
        let mut cookie = ConsentCookie::new();
        cookie.update_consent(ConsentMap::from([
            ("analytics".to_string(), ConsentValue::Flag(true)),
            ("advertising".to_string(), ConsentValue::Flag(false)),
        ]));
        cookie
    }

    #[test]
    fn test_roundtrip_none() {
        let cookie = sample_cookie();
        let encoded = encode(&cookie, CompressionMode::None);
        assert_eq!(decode(&encoded), Some(cookie));
    }

    #[test]
    fn test_roundtrip_base64() {
        let cookie = sample_cookie();
        let encoded = encode(&cookie, CompressionMode::Base64);
        assert_ne!(encoded, encode(&cookie, CompressionMode::None));
        assert_eq!(decode(&encoded), Some(cookie));
    }

    #[test]
    fn test_roundtrip_gzip() {
        let cookie = sample_cookie();
        let encoded = encode(&cookie, CompressionMode::Gzip);
        #[cfg(feature = "gzip")]
        assert!(encoded.starts_with(GZIP_MARKER));
        assert_eq!(decode(&encoded), Some(cookie));
    }

    #[test]
    fn test_decode_garbage_is_none() {
        for raw in ["", "   ", "not json", "gzip:!!!", "gzip:aGVsbG8=", "e30=", "{}", "[1,2]"] {
            assert_eq!(decode(raw), None, "expected None for {raw:?}");
        }
    }

    #[test]
    fn test_decode_base64_of_garbage_falls_through() {
        // Valid base64, but the payload is not a consent cookie.
        let raw = BASE64_STANDARD.encode("still not json");
        assert_eq!(decode(&raw), None);
    }

    #[test]
    fn test_gzip_marker_with_bad_payload_does_not_poison_chain() {
        // Marker present but payload broken: the chain moves on and, since
        // nothing else matches, reports absence rather than erroring.
        assert_eq!(decode("gzip:%%%"), None);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("none".parse::<CompressionMode>().unwrap(), CompressionMode::None);
        assert_eq!("base64".parse::<CompressionMode>().unwrap(), CompressionMode::Base64);
        assert_eq!("gzip".parse::<CompressionMode>().unwrap(), CompressionMode::Gzip);
        assert!("zstd".parse::<CompressionMode>().is_err());
    }
}
