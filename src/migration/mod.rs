//! Migration providers: import consent recorded by other consent tools.
//!
//! Each provider reads one third-party cookie format and translates it into
//! the canonical consent map:
//!
//! | Provider | Wire format |
//! |----------|-------------|
//! | [`onetrust::OneTrustProvider`] | query-string cookie with a `groups` segment |
//! | [`transcend::TranscendProvider`] | JSON cookie with a `purposes` map |
//! | [`sourcepoint::SourcePointProvider`] | IAB TC string, decoded via an injected decoder |
//!
//! The [`provider::MigrationRegistry`] consults providers in registration
//! order and adopts the first applicable translation.

pub mod mapping;
pub mod onetrust;
pub mod provider;
pub mod sourcepoint;
pub mod transcend;

pub use mapping::{parse_mapping, OrderedMapping};
pub use onetrust::{OneTrustProvider, ONETRUST_COOKIE_NAME};
pub use provider::{ConsentMigrationProvider, MigrationMethod, MigrationRegistry, SeededConsent};
pub use sourcepoint::{
    SourcePointProvider, TcfDecodeResult, TcfStringDecoder, SOURCEPOINT_COOKIE_NAME,
};
pub use transcend::{TranscendProvider, TRANSCEND_COOKIE_NAME};
