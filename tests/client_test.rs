//! End-to-end flows: load/seed, persist, and broadcast through the client.

use std::sync::{Arc, Mutex};

use consentnet::broadcast::{ConsentEventKind, EventSelection, GtagApi, GtagBroadcaster, GRANTED};
use consentnet::client::{ConsentClient, DEFAULT_COOKIE_NAME};
use consentnet::cookie::{codec, CompressionMode, ConsentMap, ConsentValue, MemoryCookieStore};
use consentnet::migration::{OneTrustProvider, TranscendProvider, ONETRUST_COOKIE_NAME};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct RecordingGtag {
    loaded: bool,
    calls: Mutex<Vec<Vec<(String, String)>>>,
}

impl GtagApi for RecordingGtag {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn consent_update(&self, payload: &[(String, String)]) {
        self.calls.lock().unwrap().push(payload.to_vec());
    }
}

fn flag(key: &str, value: bool) -> (String, ConsentValue) {
    (key.to_string(), ConsentValue::Flag(value))
}

#[test]
fn test_first_visit_seeds_from_third_party_cookie() {
    let store = Arc::new(
        MemoryCookieStore::new()
            .with_cookie(ONETRUST_COOKIE_NAME, "otid=1&groups=C0001:1,C0002:0"),
    );

    let client = ConsentClient::builder(store.clone())
        .provider(
            "onetrust",
            Box::new(OneTrustProvider::new(Some(
                r#"{"C0001":["essential"],"C0002":["performance"]}"#.to_string(),
            ))),
        )
        .init();

    assert_eq!(client.consent().get("essential"), Some(&ConsentValue::Flag(true)));
    assert_eq!(client.consent().get("performance"), Some(&ConsentValue::Flag(false)));
    assert_eq!(client.cookie().meta.consent_method.as_deref(), Some("onetrust"));

    // Seeded consent was persisted as a canonical cookie.
    let stored = codec::decode(&stored_value(&store)).unwrap();
    assert_eq!(&stored, client.cookie());
}

fn stored_value(store: &MemoryCookieStore) -> String {
    use consentnet::cookie::CookieStore;
    store.get(DEFAULT_COOKIE_NAME).unwrap()
}

#[test]
fn test_existing_canonical_cookie_skips_migration() {
    let store = Arc::new(MemoryCookieStore::new());

    // First load writes a canonical cookie with explicit consent.
    let mut first = ConsentClient::builder(store.clone()).init();
    first.update_consent(ConsentMap::from([flag("analytics", true)]));
    let device_id = first.device_id().to_string();
    drop(first);

    // A third-party cookie appears later; it must not override canonical
    // state on the next load.
    {
        use consentnet::cookie::CookieStore;
        store.set(ONETRUST_COOKIE_NAME, "groups=C0001:0");
    }

    let second = ConsentClient::builder(store)
        .provider(
            "onetrust",
            Box::new(OneTrustProvider::new(Some(
                r#"{"C0001":["analytics"]}"#.to_string(),
            ))),
        )
        .init();

    assert_eq!(second.device_id(), device_id);
    assert_eq!(second.consent().get("analytics"), Some(&ConsentValue::Flag(true)));
    assert_eq!(second.cookie().meta.consent_method, None);
}

#[test]
fn test_broadcaster_registered_after_init_gets_current_state() {
    let store = Arc::new(MemoryCookieStore::new());
    let mut client = ConsentClient::builder(store).init();
    client.update_consent(ConsentMap::from([flag("analytics", true)]));

    let api = Arc::new(RecordingGtag { loaded: true, ..Default::default() });
    client.register_broadcaster(Arc::new(GtagBroadcaster::new(api.clone())));

    // Synthetic replay delivered the current state once.
    {
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec![("analytics_storage".to_string(), GRANTED.to_string())]);
    }

    client.update_consent(ConsentMap::from([flag("advertising", false)]));
    assert_eq!(api.calls.lock().unwrap().len(), 2);
}

#[test]
fn test_gzip_compression_end_to_end() {
    let store = Arc::new(MemoryCookieStore::new());
    let mut client = ConsentClient::builder(store.clone())
        .compression(CompressionMode::Gzip)
        .init();
    client.update_consent(ConsentMap::from([flag("analytics", true)]));

    let raw = stored_value(&store);
    #[cfg(feature = "gzip")]
    assert!(raw.starts_with(consentnet::cookie::GZIP_MARKER));

    // Either way the stored value decodes to the client's cookie.
    assert_eq!(codec::decode(&raw).as_ref(), Some(client.cookie()));
}

#[test]
fn test_subscriber_event_kinds() {
    let store = Arc::new(MemoryCookieStore::new());
    let mut client = ConsentClient::builder(store).init();

    let kinds = Arc::new(Mutex::new(Vec::new()));
    let sink = kinds.clone();
    client.subscribe(EventSelection::ALL, move |event| {
        sink.lock().unwrap().push(event.kind);
    });

    client.update_consent(ConsentMap::from([flag("analytics", true)]));
    client.set_consent_string(Some("CPz...".to_string()));

    // Ready replayed at subscribe time (consent already known), then one
    // Updated per mutation.
    assert_eq!(
        *kinds.lock().unwrap(),
        vec![
            ConsentEventKind::Ready,
            ConsentEventKind::Updated,
            ConsentEventKind::Updated,
        ]
    );
}

#[test]
fn test_two_transcend_style_mutations_persist_last_value() {
    let store = Arc::new(MemoryCookieStore::new());
    let mut client = ConsentClient::builder(store.clone())
        .provider(
            "transcend",
            Box::new(TranscendProvider::new(Some(
                r#"{"Analytics":["analytics"]}"#.to_string(),
            ))),
        )
        .init();

    client.update_consent(ConsentMap::from([flag("analytics", true)]));
    client.update_consent(ConsentMap::from([flag("analytics", false)]));

    let stored = codec::decode(&stored_value(&store)).unwrap();
    assert!(!stored.is_granted("analytics"));
}
