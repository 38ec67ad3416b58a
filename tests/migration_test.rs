use std::sync::Arc;

use consentnet::base::ConsentError;
use consentnet::cookie::{ConsentValue, MemoryCookieStore};
use consentnet::migration::{
    ConsentMigrationProvider, MigrationMethod, MigrationRegistry, OneTrustProvider,
    SourcePointProvider, TcfDecodeResult, TcfStringDecoder, TranscendProvider,
    ONETRUST_COOKIE_NAME, SOURCEPOINT_COOKIE_NAME, TRANSCEND_COOKIE_NAME,
};
use pretty_assertions::assert_eq;

struct StubDecoder {
    result: Result<TcfDecodeResult, ConsentError>,
}

impl TcfStringDecoder for StubDecoder {
    fn decode(&self, _tc_string: &str) -> Result<TcfDecodeResult, ConsentError> {
        self.result.clone()
    }
}

fn stub_decoder(consents: &[u16], li: &[u16]) -> Arc<dyn TcfStringDecoder> {
    Arc::new(StubDecoder {
        result: Ok(TcfDecodeResult {
            purpose_consents: consents.iter().copied().collect(),
            purpose_legitimate_interests: li.iter().copied().collect(),
        }),
    })
}

#[test]
fn test_onetrust_import_scenario() {
    let provider = OneTrustProvider::new(Some(
        r#"{"C0001":["essential"],"C0002":["performance"]}"#.to_string(),
    ));
    let consent = provider
        .convert("otid=9f2a&datestamp=2026&groups=C0001:1,C0002:0")
        .unwrap();

    assert_eq!(consent.get("essential"), Some(&ConsentValue::Flag(true)));
    assert_eq!(consent.get("performance"), Some(&ConsentValue::Flag(false)));
    assert_eq!(consent.len(), 2);
}

#[test]
fn test_transcend_import_scenario() {
    let provider = TranscendProvider::new(Some(
        r#"{"Analytics":["analytics_opt_out"],"SaleOfInfo":["data_sales"]}"#.to_string(),
    ));
    let consent = provider
        .convert(r#"{"purposes":{"Analytics":true,"SaleOfInfo":"Auto"}}"#)
        .unwrap();

    assert_eq!(consent.get("analytics_opt_out"), Some(&ConsentValue::Flag(true)));
    assert_eq!(consent.get("data_sales"), Some(&ConsentValue::Flag(true)));
}

#[test]
fn test_tcf_or_logic_scenario() {
    let provider = SourcePointProvider::new(
        Some(r#"{"1":["a"],"2":["b"]}"#.to_string()),
        stub_decoder(&[1], &[2]),
    );
    let consent = provider.convert("CPzvOIAPzvOIAAMABBENAUEAALAAAEOAAAAAAEA").unwrap();

    assert_eq!(consent.get("a"), Some(&ConsentValue::Flag(true)));
    assert_eq!(consent.get("b"), Some(&ConsentValue::Flag(true)));
}

#[test]
fn test_registry_adopts_second_provider_when_first_has_no_cookie() {
    let store = MemoryCookieStore::new().with_cookie(
        TRANSCEND_COOKIE_NAME,
        r#"{"purposes":{"Analytics":true}}"#,
    );

    let mut registry = MigrationRegistry::new();
    registry.register(
        "onetrust",
        Box::new(OneTrustProvider::new(Some(r#"{"C0001":["essential"]}"#.to_string()))),
    );
    registry.register(
        "transcend",
        Box::new(TranscendProvider::new(Some(
            r#"{"Analytics":["analytics"]}"#.to_string(),
        ))),
    );

    let seeded = registry.seed(&store).unwrap();
    assert_eq!(seeded.method, MigrationMethod::Transcend);
    assert_eq!(seeded.consent.get("analytics"), Some(&ConsentValue::Flag(true)));
}

#[test]
fn test_registry_stops_at_first_applicable_provider() {
    let store = MemoryCookieStore::new()
        .with_cookie(ONETRUST_COOKIE_NAME, "groups=C0001:1")
        .with_cookie(TRANSCEND_COOKIE_NAME, r#"{"purposes":{"Analytics":true}}"#);

    let mut registry = MigrationRegistry::new();
    registry.register(
        "onetrust",
        Box::new(OneTrustProvider::new(Some(r#"{"C0001":["essential"]}"#.to_string()))),
    );
    registry.register(
        "transcend",
        Box::new(TranscendProvider::new(Some(
            r#"{"Analytics":["analytics"]}"#.to_string(),
        ))),
    );

    // The later provider's cookie is present too, but never consulted.
    let seeded = registry.seed(&store).unwrap();
    assert_eq!(seeded.method, MigrationMethod::OneTrust);
    assert!(!seeded.consent.contains_key("analytics"));
}

#[test]
fn test_malformed_mapping_falls_through_to_next_provider() {
    let store = MemoryCookieStore::new()
        .with_cookie(ONETRUST_COOKIE_NAME, "groups=C0001:1")
        .with_cookie(SOURCEPOINT_COOKIE_NAME, "CPzvOIA");

    let mut registry = MigrationRegistry::new();
    registry.register(
        "onetrust",
        Box::new(OneTrustProvider::new(Some("{malformed".to_string()))),
    );
    registry.register(
        "sourcepoint",
        Box::new(SourcePointProvider::new(
            Some(r#"{"1":["essential"]}"#.to_string()),
            stub_decoder(&[1], &[]),
        )),
    );

    let seeded = registry.seed(&store).unwrap();
    assert_eq!(seeded.method, MigrationMethod::SourcePoint);
    assert_eq!(seeded.consent.get("essential"), Some(&ConsentValue::Flag(true)));
}

#[test]
fn test_invalid_tc_string_still_seeds_with_no_purposes_consented() {
    let store = MemoryCookieStore::new().with_cookie(SOURCEPOINT_COOKIE_NAME, "garbage");

    let mut registry = MigrationRegistry::new();
    registry.register(
        "sourcepoint",
        Box::new(SourcePointProvider::new(
            Some(r#"{"1":["essential"],"4":["advertising"]}"#.to_string()),
            Arc::new(StubDecoder {
                result: Err(ConsentError::tcf_decode("not a TC string")),
            }),
        )),
    );

    // Configured, cookie found, only the decode failed: the result is
    // defined, with every mapped purpose not consented.
    let seeded = registry.seed(&store).unwrap();
    assert_eq!(seeded.consent.get("essential"), Some(&ConsentValue::Flag(false)));
    assert_eq!(seeded.consent.get("advertising"), Some(&ConsentValue::Flag(false)));
}

#[test]
fn test_url_encoded_quoted_mapping_config() {
    // '{"C0001":["essential"]}' URL-encoded with enclosing single quotes.
    let raw = "%27%7B%22C0001%22%3A%5B%22essential%22%5D%7D%27";
    let provider = OneTrustProvider::new(Some(raw.to_string()));
    let consent = provider.convert("groups=C0001:1").unwrap();
    assert_eq!(consent.get("essential"), Some(&ConsentValue::Flag(true)));
}
