use thiserror::Error;

/// Error type for the consent subsystem.
///
/// Only the identity-setting variants are ever surfaced to callers; they
/// represent programmer error in the integration (bad key, reserved key,
/// empty value). Everything else is internal plumbing that the public
/// surface converts into silent degradation: a corrupted cookie decodes to
/// "no cookie", a malformed mapping disables its provider, an absent vendor
/// global turns a broadcast into a no-op.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConsentError {
    // Identity validation (intentionally thrown)
    #[error("Invalid identity key: {key}")]
    InvalidIdentityKey { key: String },
    #[error("Identity key is reserved: {key}")]
    ReservedIdentityKey { key: String },
    #[error("Identity key is verified and cannot be set client-side: {key}")]
    VerifiedIdentityKey { key: String },
    #[error("Identity value for {key} is empty")]
    EmptyIdentityValue { key: String },

    // Internal (never surfaced past debug logs)
    #[error("Mapping configuration failed to parse: {reason}")]
    MappingParse { reason: String },
    #[error("TC string failed to decode: {reason}")]
    TcfDecode { reason: String },
    #[error("Cookie storage failure: {reason}")]
    Storage { reason: String },
}

impl ConsentError {
    pub fn invalid_identity_key(key: impl Into<String>) -> Self {
        Self::InvalidIdentityKey { key: key.into() }
    }

    pub fn reserved_identity_key(key: impl Into<String>) -> Self {
        Self::ReservedIdentityKey { key: key.into() }
    }

    pub fn verified_identity_key(key: impl Into<String>) -> Self {
        Self::VerifiedIdentityKey { key: key.into() }
    }

    pub fn empty_identity_value(key: impl Into<String>) -> Self {
        Self::EmptyIdentityValue { key: key.into() }
    }

    pub fn mapping_parse(reason: impl Into<String>) -> Self {
        Self::MappingParse { reason: reason.into() }
    }

    pub fn tcf_decode(reason: impl Into<String>) -> Self {
        Self::TcfDecode { reason: reason.into() }
    }

    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage { reason: reason.into() }
    }
}
