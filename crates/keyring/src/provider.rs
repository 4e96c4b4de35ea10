//! The cryptographic capability consumed by `DidKey`.
//!
//! A `CryptoProvider` supplies the primitives (key generation, import and export, signing,
//! verification and random bytes). Key material resolution and pairwise derivation only
//! orchestrate calls into it, so any backing implementation (in-memory, HSM, platform key store)
//! can be substituted, and tests can inject instrumented or deterministic providers.

use serde::{Deserialize, Serialize};

use crate::jwk::Jwk;
use crate::key::KeyUsage;
use did_core::Result;

/// Algorithm descriptor, interpreted by the provider.
///
/// Mirrors the shape of a Web Crypto algorithm object, e.g. `{"name": "hmac", "hash": "SHA-512"}`
/// or `{"name": "ECDH", "namedCurve": "K-256"}`.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Algorithm {
    /// Algorithm name, compared case-insensitively.
    pub name: String,
    /// Hash function, for HMAC and ECDSA.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Curve name, for elliptic curve algorithms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_curve: Option<String>,
    /// Key length in bytes, for symmetric keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl Algorithm {
    /// HMAC with the given hash, e.g. `SHA-512`.
    #[must_use]
    pub fn hmac(hash: &str) -> Self {
        Self {
            name: "hmac".to_string(),
            hash: Some(hash.to_string()),
            ..Self::default()
        }
    }

    /// Elliptic curve Diffie-Hellman on the named curve.
    #[must_use]
    pub fn ecdh(named_curve: &str) -> Self {
        Self {
            name: "ECDH".to_string(),
            named_curve: Some(named_curve.to_string()),
            ..Self::default()
        }
    }

    /// ECDSA on the named curve with the given hash.
    #[must_use]
    pub fn ecdsa(named_curve: &str, hash: &str) -> Self {
        Self {
            name: "ECDSA".to_string(),
            hash: Some(hash.to_string()),
            named_curve: Some(named_curve.to_string()),
            ..Self::default()
        }
    }

    /// Set the key length in bytes.
    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Case-insensitive check of the algorithm name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Which half of a key a provider handle holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyKind {
    /// Symmetric secret.
    Secret,
    /// Private half of a key pair.
    Private,
    /// Public half of a key pair.
    Public,
}

/// A key handle issued by a provider.
pub trait KeyHandle: Clone + Send + Sync {
    /// Which half of a key this handle holds.
    fn kind(&self) -> KeyKind;
}

/// The result of a key generation request.
#[derive(Clone, Debug)]
pub enum GeneratedKey<K> {
    /// A symmetric key.
    Secret(K),
    /// An asymmetric key pair.
    Pair {
        /// Private half.
        private: K,
        /// Public half.
        public: K,
    },
}

/// Cryptographic primitives, keyed by an algorithm descriptor and a usage list. Keys are
/// exchanged in JWK format.
#[allow(async_fn_in_trait)]
pub trait CryptoProvider {
    /// Provider-specific key handle.
    type Key: KeyHandle;

    /// Generate a new key or key pair.
    ///
    /// # Errors
    ///
    /// Provider failure, for example an unsupported algorithm or usage.
    async fn generate_key(
        &self, algorithm: &Algorithm, extractable: bool, usages: &[KeyUsage],
    ) -> Result<GeneratedKey<Self::Key>>;

    /// Import a key from its JWK representation.
    ///
    /// # Errors
    ///
    /// Provider failure, for example malformed key data.
    async fn import_key(
        &self, jwk: &Jwk, algorithm: &Algorithm, extractable: bool, usages: &[KeyUsage],
    ) -> Result<Self::Key>;

    /// Export a key to its JWK representation.
    ///
    /// # Errors
    ///
    /// Provider failure, for example the key is not extractable.
    async fn export_key(&self, key: &Self::Key) -> Result<Jwk>;

    /// Sign `data` with `key`.
    ///
    /// # Errors
    ///
    /// Provider failure, for example the key does not permit signing.
    async fn sign(&self, algorithm: &Algorithm, key: &Self::Key, data: &[u8]) -> Result<Vec<u8>>;

    /// Check `signature` over `data` with `key`.
    ///
    /// # Errors
    ///
    /// Provider failure. An invalid signature is `Ok(false)`, not an error.
    async fn verify(
        &self, algorithm: &Algorithm, key: &Self::Key, signature: &[u8], data: &[u8],
    ) -> Result<bool>;

    /// Fill a buffer of `length` bytes from a secure random source.
    ///
    /// # Errors
    ///
    /// Provider failure.
    fn random_bytes(&self, length: usize) -> Result<Vec<u8>>;
}
