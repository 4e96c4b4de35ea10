//! # Key Ring
//!
//! Key management for DID workflows. A [`DidKey`] holds key material resolved through a
//! [`CryptoProvider`] and signs and verifies with it. From a single seed, a `DidKey` derives a
//! distinct, reproducible key pair per peer ([`DidKey::derive_pairwise`]), so a subject can present
//! an unlinkable public key to each counterparty and regenerate it on demand.
//!
//! [`EphemeralCrypto`] is an in-memory software provider. Other providers (HSMs, platform key
//! stores) plug in by implementing [`CryptoProvider`].

pub mod cache;
pub mod curve;
pub mod did_key;
pub mod ephemeral;
pub mod jwk;
pub mod key;
pub mod material;
pub mod pairwise;
pub mod provider;
pub mod test_utils;

pub use cache::{MasterKey, MasterKeyCache};
pub use curve::NamedCurve;
pub use did_key::{DidKey, KeySource, DEFAULT_SECRET_LEN};
pub use ephemeral::{EphemeralCrypto, EphemeralKey};
pub use jwk::Jwk;
pub use key::{KeySpec, KeyType, KeyUsage, KeyUse};
pub use material::{Handles, KeyMaterial};
pub use pairwise::{PairwiseKeyDeriver, MIN_MASTER_KEY_LEN};
pub use provider::{Algorithm, CryptoProvider, GeneratedKey, KeyHandle, KeyKind};
