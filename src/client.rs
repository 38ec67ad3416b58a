//! Page-wide consent client.
//!
//! Owns the single in-memory [`ConsentCookie`], the storage seam, the
//! migration registry, and the event bus. Control flow on init: decode an
//! existing canonical cookie; if absent, consult migration providers to
//! seed consent from a third-party cookie; hold the result in memory,
//! persist it on every mutation, and publish consent events to registered
//! broadcasters.
//!
//! All calls are synchronous; persistence is last-write-correct by value,
//! so two mutations in quick succession always leave the store holding the
//! later cookie state.

use std::sync::Arc;

use tracing::debug;

use crate::base::error::ConsentError;
use crate::broadcast::broadcaster::ConsentBroadcaster;
use crate::broadcast::events::{ConsentEvent, ConsentEventBus, ConsentEventKind, EventSelection};
use crate::cookie::codec::{self, CompressionMode};
use crate::cookie::model::{ConsentCookie, ConsentMap, TcfConsent};
use crate::cookie::store::CookieStore;
use crate::migration::provider::{ConsentMigrationProvider, MigrationRegistry};

/// Default name of the canonical consent cookie.
pub const DEFAULT_COOKIE_NAME: &str = "consentnet_consent";

/// Builder for [`ConsentClient`].
pub struct ConsentClientBuilder {
    store: Arc<dyn CookieStore>,
    cookie_name: String,
    mode: CompressionMode,
    registry: MigrationRegistry,
}

impl ConsentClientBuilder {
    pub fn new(store: Arc<dyn CookieStore>) -> Self {
        Self {
            store,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            mode: CompressionMode::default(),
            registry: MigrationRegistry::new(),
        }
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn compression(mut self, mode: CompressionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Register a migration provider. Registration order is consultation
    /// order on first visit.
    pub fn provider(
        mut self,
        name: impl Into<String>,
        provider: Box<dyn ConsentMigrationProvider>,
    ) -> Self {
        self.registry.register(name, provider);
        self
    }

    /// Load or create the canonical cookie, persist it, and publish the
    /// initial `Ready` event.
    pub fn init(self) -> ConsentClient {
        let existing = self
            .store
            .get(&self.cookie_name)
            .and_then(|raw| codec::decode(&raw));

        let cookie = match existing {
            Some(cookie) => {
                debug!(device_id = cookie.identity.device_id(), "loaded existing consent cookie");
                cookie
            }
            None => {
                let mut cookie = ConsentCookie::new();
                if let Some(seeded) = self.registry.seed(&*self.store) {
                    cookie.meta.consent_method = Some(seeded.method.as_str().to_string());
                    cookie.update_consent(seeded.consent);
                }
                cookie
            }
        };

        let mut client = ConsentClient {
            store: self.store,
            cookie_name: self.cookie_name,
            mode: self.mode,
            cookie,
            bus: ConsentEventBus::new(),
            broadcasters: Vec::new(),
        };
        client.persist();
        client.publish(ConsentEventKind::Ready);
        client
    }
}

/// The single per-page holder of canonical consent state.
pub struct ConsentClient {
    store: Arc<dyn CookieStore>,
    cookie_name: String,
    mode: CompressionMode,
    cookie: ConsentCookie,
    bus: ConsentEventBus,
    broadcasters: Vec<Arc<dyn ConsentBroadcaster>>,
}

impl ConsentClient {
    pub fn builder(store: Arc<dyn CookieStore>) -> ConsentClientBuilder {
        ConsentClientBuilder::new(store)
    }

    pub fn cookie(&self) -> &ConsentCookie {
        &self.cookie
    }

    pub fn consent(&self) -> &ConsentMap {
        &self.cookie.consent
    }

    pub fn device_id(&self) -> &str {
        self.cookie.identity.device_id()
    }

    /// Record consent decisions, persist, and notify broadcasters.
    pub fn update_consent(&mut self, changes: ConsentMap) {
        self.cookie.update_consent(changes);
        self.persist();
        self.publish(ConsentEventKind::Updated);
    }

    /// Replace TCF consent state. Populated only while a TCF-capable
    /// experience is active; clearing it back to empty is a mutation too.
    pub fn update_tcf_consent(&mut self, tcf_consent: TcfConsent) {
        self.cookie.tcf_consent = tcf_consent;
        self.cookie.touch();
        self.persist();
        self.publish(ConsentEventKind::Updated);
    }

    /// Replace the encoded combined consent string, persist, and notify.
    pub fn set_consent_string(&mut self, consent_string: Option<String>) {
        self.cookie.consent_string = consent_string;
        self.cookie.touch();
        self.persist();
        self.publish(ConsentEventKind::Updated);
    }

    /// Set an externally supplied identity value.
    ///
    /// The only fallible operation on the client: reserved, verified,
    /// invalid, or empty identities are programmer errors and are returned
    /// to the caller instead of being swallowed.
    pub fn set_identity(&mut self, key: &str, value: &str) -> Result<(), ConsentError> {
        self.cookie.identity.insert(key, value)?;
        self.cookie.touch();
        self.persist();
        Ok(())
    }

    /// Wire a broadcaster into the event bus under its own selection.
    /// If consent is already known it receives one synthetic `Ready`
    /// delivery immediately.
    pub fn register_broadcaster(&mut self, broadcaster: Arc<dyn ConsentBroadcaster>) {
        let selection = broadcaster.selection();
        let handler = broadcaster.clone();
        self.bus
            .subscribe(selection, move |event| handler.broadcast(event));
        self.broadcasters.push(broadcaster);
    }

    /// Subscribe an arbitrary handler to consent events.
    pub fn subscribe(
        &mut self,
        selection: EventSelection,
        handler: impl Fn(&ConsentEvent) + Send + Sync + 'static,
    ) {
        self.bus.subscribe(selection, handler);
    }

    /// Diagnostic read-back from a registered broadcaster's vendor.
    pub fn broadcaster_consent(&self, name: &str) -> Option<serde_json::Value> {
        self.broadcasters
            .iter()
            .find(|b| b.name() == name)
            .and_then(|b| b.consent())
    }

    fn persist(&self) {
        let encoded = codec::encode(&self.cookie, self.mode);
        self.store.set(&self.cookie_name, &encoded);
    }

    fn publish(&mut self, kind: ConsentEventKind) {
        self.bus.publish(ConsentEvent {
            kind,
            consent: self.cookie.consent.clone(),
            consent_string: self.cookie.consent_string.clone(),
        });
    }
}
