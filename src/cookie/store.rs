//! Storage seam for the cookie codec.
//!
//! The codec never owns cookie storage; reads and writes go through this
//! trait so the host page (or a test) decides where the string actually
//! lives.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// String-valued cookie storage keyed by cookie name.
pub trait CookieStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str);
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a cookie, e.g. a third-party consent cookie in tests.
    pub fn with_cookie(self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.lock().ok()?.get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(name.to_string(), value.to_string());
        }
    }
}
