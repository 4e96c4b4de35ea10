//! # DID Pairwise
//!
//! Decentralized Identifier (DID) utilities:
//!
//! - [`document`]: parse and query DID documents.
//! - [`http`]: resolve DID documents through a universal resolver (feature `http`).
//! - [`keyring`]: key material held by a crypto provider, and deterministic per-peer ("pairwise")
//!   key pairs derived from a single master seed.
//!
//! ```
//! use std::sync::Arc;
//!
//! use did_pairwise::keyring::{Algorithm, DidKey, EphemeralCrypto, KeySource, KeyType, KeyUse};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> did_pairwise::Result<()> {
//! let key = DidKey::new(
//!     Arc::new(EphemeralCrypto::new()),
//!     Algorithm::ecdh("K-256"),
//!     KeyType::Ec,
//!     KeyUse::Encryption,
//!     KeySource::Generate,
//! );
//!
//! let seed = [0u8; 32];
//! let pairwise = key.derive_pairwise(&seed, "did:example:abc", "did:example:peer1").await?;
//! let public = pairwise.public_jwk().await?;
//! assert_eq!(public.crv.as_deref(), Some("K-256"));
//! # Ok(())
//! # }
//! ```

pub use did_core::{document, error, is_did, test_utils, Did, Resolution, Resolver, Result};
#[cfg(feature = "http")]
pub use did_http as http;
pub use keyring;
