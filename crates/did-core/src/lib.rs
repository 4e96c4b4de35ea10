//! # DID Core
//! Types, traits and functions for working with Decentralized Identifiers (DIDs) and DID Documents.

pub mod document;
pub mod error;
pub(crate) mod resolver;
pub mod test_utils;

pub use document::{DidDocument, Endpoint, PublicKey, PublicKeyFormat, Service, DID_CONTEXT};
pub use resolver::{Resolution, Resolver};

/// Result type for DID Core.
pub type Result<T, E = error::Error> = core::result::Result<T, E>;

/// A DID of the form `did:<method>:<identifier>`.
pub type Did = String;

/// Check a string has the `did:<method>:<identifier>` shape: a lowercase alphanumeric method and a
/// non-empty method-specific identifier.
#[must_use]
pub fn is_did(s: &str) -> bool {
    let mut parts = s.splitn(3, ':');
    let (Some("did"), Some(method), Some(id)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !method.is_empty()
        && method.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && !id.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn did_syntax() {
        assert!(is_did("did:example:abc"));
        assert!(is_did("did:web:example.com:user:alice"));
        assert!(!is_did("did:example"));
        assert!(!is_did("did::abc"));
        assert!(!is_did("did:Example:abc"));
        assert!(!is_did("uri:example:abc"));
    }
}
