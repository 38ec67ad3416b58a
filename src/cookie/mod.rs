//! Canonical consent cookie: model, codec, and storage seam.
//!
//! | Piece | Responsibility |
//! |-------|----------------|
//! | [`model::ConsentCookie`] | Versioned in-memory consent representation |
//! | [`codec`] | Storage-string encode/decode with compression and fallback chain |
//! | [`store::CookieStore`] | Injected cookie read/write seam |
//!
//! The codec's contract is deliberately total: `encode` never fails and
//! `decode` returns `None` for anything it cannot understand, so storage
//! corruption can never surface as an error or corrupt user consent.

pub mod codec;
pub mod model;
pub mod store;

pub use codec::{decode, encode, CompressionMode, GZIP_MARKER};
pub use model::{
    ConsentCookie, ConsentMap, ConsentValue, CookieMeta, Identity, TcfConsent, UserPreference,
    COOKIE_SCHEMA_VERSION, DEVICE_ID_KEY,
};
pub use store::{CookieStore, MemoryCookieStore};
