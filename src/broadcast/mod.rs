//! Outbound broadcasters: push canonical consent into vendor vocabularies.
//!
//! | Piece | Responsibility |
//! |-------|----------------|
//! | [`events::ConsentEventBus`] | Synchronous pub/sub with replay-on-subscribe |
//! | [`broadcaster::ConsentBroadcaster`] | Vendor adapter trait + shared merge step |
//! | [`gtag::GtagBroadcaster`] | Binary granted/denied vocabulary |
//! | [`permissions::PermissionsBroadcaster`] | Structured standard/version/value vocabulary |
//!
//! Broadcasters never fail: an absent vendor global or an empty payload is
//! a silent no-op, logged at debug level only.

pub mod broadcaster;
pub mod events;
pub mod gtag;
pub mod permissions;

pub use broadcaster::{map_to_vendor, ConsentBroadcaster};
pub use events::{ConsentEvent, ConsentEventBus, ConsentEventKind, EventSelection};
pub use gtag::{GtagApi, GtagBroadcaster, DENIED, GRANTED};
pub use permissions::{
    ConsentDirective, PermissionsApi, PermissionsBroadcaster, DIRECTIVE_VERSION,
};
