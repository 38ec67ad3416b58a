//! # consentnet
//!
//! A browser-resident consent-state client library.
//!
//! `consentnet` persists a visitor's consent decisions in a canonical,
//! versioned cookie, reconciles them with consent already recorded by
//! third-party consent-management tools on the same page, and rebroadcasts
//! the canonical state into vendor-specific consent vocabularies.
//!
//! ## Features
//!
//! - **Cookie Codec**: JSON / base64 / gzip storage encodings with a
//!   fallback decode chain that treats corruption as absence
//! - **Migration Providers**: import consent from category-group,
//!   purpose-object, and TCF-string cookies (first applicable provider wins)
//! - **Broadcasters**: binary granted/denied and structured
//!   standard/version/value vendor vocabularies, with configurable mappings
//! - **Event Bus**: synchronous consent events with replay-on-subscribe
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use consentnet::client::ConsentClient;
//! use consentnet::cookie::{ConsentMap, ConsentValue, MemoryCookieStore};
//! use consentnet::migration::OneTrustProvider;
//!
//! let store = Arc::new(MemoryCookieStore::new());
//! let mut client = ConsentClient::builder(store)
//!     .provider(
//!         "onetrust",
//!         Box::new(OneTrustProvider::new(Some(
//!             r#"{"C0001":["essential"]}"#.to_string(),
//!         ))),
//!     )
//!     .init();
//!
//! client.update_consent(ConsentMap::from([
//!     ("analytics".to_string(), ConsentValue::Flag(true)),
//! ]));
//! assert!(client.cookie().is_granted("analytics"));
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Core types and error definitions
//! - [`cookie`] - Canonical cookie model, codec, and storage seam
//! - [`migration`] - Third-party consent import providers
//! - [`broadcast`] - Event bus and vendor broadcasters
//! - [`client`] - Page-wide orchestration
//!
//! ## Failure Philosophy
//!
//! Nothing in this crate is fatal to the host page. Storage corruption
//! decodes to "no cookie"; malformed mapping configuration disables its
//! provider; an absent vendor global turns a broadcast into a no-op. The
//! one deliberate exception is identity validation, which surfaces
//! programmer errors to the integrator.

pub mod base;
pub mod broadcast;
pub mod client;
pub mod cookie;
pub mod migration;
