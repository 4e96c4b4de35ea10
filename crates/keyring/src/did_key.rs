//! # DID Key
//!
//! A `DidKey` binds a key spec (algorithm, type, use, exportability) to key material held by a
//! [`CryptoProvider`]. Material is resolved on demand: a new key starts `Pending` with its source
//! (fresh generation, raw secret bytes or a JWK) and becomes `Resolved` the first time it is
//! needed. Failed resolution leaves the key pending so a later call can retry.
//!
//! A `DidKey` is also the entry point for pairwise derivation. Master keys derived from a seed are
//! cached per subject DID on the key that derived them.

use std::fmt;
use std::sync::Arc;

use did_core::error::Err;
use did_core::{tracerr, Result};
use tokio::sync::{Mutex, OnceCell};

use crate::cache::{MasterKey, MasterKeyCache};
use crate::jwk::Jwk;
use crate::key::{KeySpec, KeyType, KeyUse};
use crate::material::{Handles, KeyMaterial};
use crate::pairwise::PairwiseKeyDeriver;
use crate::provider::{Algorithm, CryptoProvider, GeneratedKey, KeyHandle, KeyKind};

/// Length in bytes of a generated symmetric key when the algorithm does not set one.
pub const DEFAULT_SECRET_LEN: usize = 16;

/// Where a key's material comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Ask the provider for a new key.
    Generate,
    /// Raw secret bytes, for symmetric keys.
    Bytes(Vec<u8>),
    /// A JWK, public or private.
    Jwk(Jwk),
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate => write!(f, "Generate"),
            Self::Bytes(_) => write!(f, "Bytes(<redacted>)"),
            Self::Jwk(jwk) => write!(f, "Jwk({})", jwk.kty),
        }
    }
}

enum KeyState<K> {
    Pending(KeySource),
    Resolved(Arc<KeyMaterial<K>>),
}

/// A key backed by a crypto provider.
pub struct DidKey<P: CryptoProvider> {
    provider: Arc<P>,
    spec: KeySpec,
    state: Mutex<KeyState<P::Key>>,
    exported: OnceCell<Jwk>,
    master_keys: MasterKeyCache,
}

impl<P: CryptoProvider> DidKey<P> {
    /// Create an exportable key of the given algorithm, type and use.
    pub fn new(
        provider: Arc<P>, algorithm: Algorithm, key_type: KeyType, key_use: KeyUse,
        source: KeySource,
    ) -> Self {
        Self::with_spec(provider, KeySpec::new(algorithm, key_type, key_use), source)
    }

    /// Create a key from a full spec.
    pub fn with_spec(provider: Arc<P>, spec: KeySpec, source: KeySource) -> Self {
        Self {
            provider,
            spec,
            state: Mutex::new(KeyState::Pending(source)),
            exported: OnceCell::new(),
            master_keys: MasterKeyCache::new(),
        }
    }

    /// The key spec.
    pub const fn spec(&self) -> &KeySpec {
        &self.spec
    }

    /// The algorithm descriptor passed to the provider.
    pub const fn algorithm(&self) -> &Algorithm {
        &self.spec.algorithm
    }

    /// Key family.
    pub const fn key_type(&self) -> KeyType {
        self.spec.key_type
    }

    /// Intended use.
    pub const fn key_use(&self) -> KeyUse {
        self.spec.key_use
    }

    /// Whether the provider may export the key.
    pub const fn exportable(&self) -> bool {
        self.spec.exportable
    }

    /// True for key types that come as a private/public pair.
    pub const fn is_key_pair(&self) -> bool {
        self.spec.is_key_pair()
    }

    /// The provider backing this key.
    pub fn provider(&self) -> Arc<P> {
        self.provider.clone()
    }

    /// Master keys derived so far by [`DidKey::derive_pairwise`].
    pub const fn master_keys(&self) -> &MasterKeyCache {
        &self.master_keys
    }

    /// True once key material has been resolved.
    pub async fn is_resolved(&self) -> bool {
        matches!(*self.state.lock().await, KeyState::Resolved(_))
    }

    /// Resolve the key material, generating or importing it on first call.
    ///
    /// # Errors
    ///
    /// * `Err::UnsupportedKeyType` - the key type has no resolution path.
    /// * `Err::InvalidKey` - the key source does not fit the key type.
    /// * provider failures, propagated.
    pub async fn resolve_key(&self) -> Result<Arc<KeyMaterial<P::Key>>> {
        let mut state = self.state.lock().await;
        let material = match &*state {
            KeyState::Resolved(material) => return Ok(material.clone()),
            KeyState::Pending(source) => match self.spec.key_type {
                KeyType::Oct => self.resolve_secret(source).await?,
                KeyType::Ec => self.resolve_pair(source).await?,
                key_type @ KeyType::Rsa => {
                    tracerr!(Err::UnsupportedKeyType, "Key type '{key_type}' is not supported.")
                }
            },
        };

        let material = Arc::new(material);
        *state = KeyState::Resolved(material.clone());
        Ok(material)
    }

    /// Sign `data` with the secret or private half of the key.
    ///
    /// # Errors
    ///
    /// * `Err::NoSigningKey` - the key holds only a public half.
    /// * resolution and provider failures, propagated.
    pub async fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let material = self.resolve_key().await?;
        let Some(key) = material.signing_key() else {
            tracerr!(Err::NoSigningKey, "The key has no private key for signing");
        };
        self.provider.sign(&self.spec.algorithm, key, data).await
    }

    /// Check `signature` over `data` with the secret or public half of the key.
    ///
    /// # Errors
    ///
    /// * `Err::NoVerificationKey` - the key holds no public half.
    /// * resolution and provider failures, propagated.
    pub async fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool> {
        let material = self.resolve_key().await?;
        let Some(key) = material.verification_key() else {
            tracerr!(Err::NoVerificationKey, "The key has no public key for verification");
        };
        self.provider.verify(&self.spec.algorithm, key, signature, data).await
    }

    /// The key as exported by the provider, including private material when held. The first
    /// successful export is memoized.
    ///
    /// # Errors
    ///
    /// * `Err::CryptoProvider` - the key is not exportable.
    /// * resolution and provider failures, propagated.
    pub async fn jwk(&self) -> Result<Jwk> {
        let jwk = self.exported.get_or_try_init(|| self.export()).await?;
        Ok(jwk.clone())
    }

    /// The public half of a key pair as a JWK.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidKey` - the key is symmetric.
    /// * resolution and provider failures, propagated.
    pub async fn public_jwk(&self) -> Result<Jwk> {
        let material = self.resolve_key().await?;
        let Handles::Pair { public, .. } = material.handles() else {
            tracerr!(Err::InvalidKey, "a symmetric key has no public half");
        };
        let Some(public) = public else {
            tracerr!(Err::NoVerificationKey, "The key has no public key");
        };
        Ok(self.provider.export_key(public).await?.to_public())
    }

    /// Derive the key for (`subject_did`, `peer_id`) with this key's spec.
    ///
    /// The subject's master key is `HMAC-SHA512(seed, subject_did)`, derived once and cached on
    /// this key. The same seed, subject and peer always give the same key.
    ///
    /// # Errors
    ///
    /// * `Err::UnsupportedPairwiseKeyType` - this key is not an EC key.
    /// * derivation and provider failures, propagated. A failed master key derivation is not
    ///   cached.
    pub async fn derive_pairwise(
        &self, seed: &[u8], subject_did: &str, peer_id: &str,
    ) -> Result<Self> {
        let master = self
            .master_keys
            .get_or_create(subject_did, || self.derive_master_key(seed, subject_did))
            .await?;

        match self.spec.key_type {
            KeyType::Ec => {
                PairwiseKeyDeriver::new(self.provider.clone())
                    .generate(master.key_bytes(), subject_did, peer_id, &self.spec)
                    .await
            }
            key_type => tracerr!(
                Err::UnsupportedPairwiseKeyType,
                "Pairwise key for type '{key_type}' is not supported."
            ),
        }
    }

    async fn derive_master_key(&self, seed: &[u8], subject_did: &str) -> Result<MasterKey> {
        let hmac = Self::new(
            self.provider.clone(),
            Algorithm::hmac("SHA-512"),
            KeyType::Oct,
            KeyUse::Signature,
            KeySource::Bytes(seed.to_vec()),
        );
        let key_bytes = hmac.sign(subject_did.as_bytes()).await?;
        Ok(MasterKey::new(subject_did.to_string(), key_bytes))
    }

    async fn export(&self) -> Result<Jwk> {
        let material = self.resolve_key().await?;
        let Some(key) = material.signing_key().or_else(|| material.verification_key()) else {
            tracerr!(Err::KeyNotFound, "key material holds no key to export");
        };
        let mut jwk = self.provider.export_key(key).await?;
        if !material.is_public_key_crypto() {
            jwk.use_ = Some(self.spec.key_use.to_string());
        }
        Ok(jwk)
    }

    async fn resolve_secret(&self, source: &KeySource) -> Result<KeyMaterial<P::Key>> {
        let jwk = match source {
            KeySource::Jwk(jwk) => jwk.clone(),
            KeySource::Bytes(bytes) => Jwk::oct(bytes, Some(self.spec.key_use)),
            KeySource::Generate => {
                let length = self.spec.algorithm.length.unwrap_or(DEFAULT_SECRET_LEN);
                Jwk::oct(&self.provider.random_bytes(length)?, Some(self.spec.key_use))
            }
        };
        let secret = self
            .provider
            .import_key(&jwk, &self.spec.algorithm, self.spec.exportable, &self.spec.usages())
            .await?;
        if secret.kind() != KeyKind::Secret {
            tracerr!(Err::InvalidKey, "expected a secret key for key type oct");
        }

        Ok(KeyMaterial::new(self.spec.clone(), Handles::Secret(secret)))
    }

    async fn resolve_pair(&self, source: &KeySource) -> Result<KeyMaterial<P::Key>> {
        let algorithm = &self.spec.algorithm;

        let handles = match source {
            KeySource::Generate => {
                let generated = self
                    .provider
                    .generate_key(algorithm, self.spec.exportable, &self.spec.usages())
                    .await?;
                let GeneratedKey::Pair { private, public } = generated else {
                    tracerr!(Err::CryptoProvider, "provider generated a secret for an EC key");
                };
                Handles::Pair {
                    private: Some(private),
                    public: Some(public),
                }
            }
            KeySource::Jwk(jwk) if jwk.is_private() => {
                let private = self
                    .provider
                    .import_key(jwk, algorithm, self.spec.exportable, &self.spec.private_usages())
                    .await?;

                // materialize the public half so both halves are always held
                let public_jwk = if jwk.has_coordinates() {
                    jwk.to_public()
                } else {
                    self.provider.export_key(&private).await?.to_public()
                };
                let public = self
                    .provider
                    .import_key(&public_jwk, algorithm, true, &self.spec.public_usages())
                    .await?;

                Handles::Pair {
                    private: Some(private),
                    public: Some(public),
                }
            }
            KeySource::Jwk(jwk) => {
                let public = self
                    .provider
                    .import_key(jwk, algorithm, true, &self.spec.public_usages())
                    .await?;
                Handles::Pair {
                    private: None,
                    public: Some(public),
                }
            }
            KeySource::Bytes(_) => {
                tracerr!(Err::InvalidKey, "EC keys are supplied as a JWK, not raw bytes")
            }
        };

        Ok(KeyMaterial::new(self.spec.clone(), handles))
    }
}

impl<P: CryptoProvider> fmt::Debug for DidKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DidKey")
            .field("spec", &self.spec)
            .field("master_keys", &self.master_keys)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeral::EphemeralCrypto;

    fn provider() -> Arc<EphemeralCrypto> {
        Arc::new(EphemeralCrypto::new())
    }

    #[tokio::test]
    async fn lazy_resolution() {
        let key = DidKey::new(
            provider(),
            Algorithm::hmac("SHA-256"),
            KeyType::Oct,
            KeyUse::Signature,
            KeySource::Generate,
        );
        assert!(!key.is_resolved().await);

        let material = key.resolve_key().await.expect("should resolve");
        assert!(!material.is_public_key_crypto());
        assert!(key.is_resolved().await);

        let again = key.resolve_key().await.expect("should resolve");
        assert!(Arc::ptr_eq(&material, &again));
    }

    #[tokio::test]
    async fn generated_secret_length() {
        let key = DidKey::new(
            provider(),
            Algorithm::hmac("SHA-256"),
            KeyType::Oct,
            KeyUse::Signature,
            KeySource::Generate,
        );
        let jwk = key.jwk().await.expect("should export");
        let k = jwk.k.expect("should have k");
        // 16 bytes, unpadded base64url
        assert_eq!(k.len(), 22);
        assert_eq!(jwk.use_.as_deref(), Some("sig"));
    }

    #[tokio::test]
    async fn hmac_sign_verify() {
        let key = DidKey::new(
            provider(),
            Algorithm::hmac("SHA-512"),
            KeyType::Oct,
            KeyUse::Signature,
            KeySource::Bytes(vec![0; 32]),
        );
        let sig = key.sign(b"did:example:abc").await.expect("should sign");
        assert_eq!(sig.len(), 64);
        assert!(key.verify(b"did:example:abc", &sig).await.expect("should verify"));
        assert!(!key.verify(b"did:example:xyz", &sig).await.expect("should verify"));
    }

    #[tokio::test]
    async fn ecdsa_sign_verify() {
        let key = DidKey::new(
            provider(),
            Algorithm::ecdsa("P-256", "SHA-256"),
            KeyType::Ec,
            KeyUse::Signature,
            KeySource::Generate,
        );
        let sig = key.sign(b"hello").await.expect("should sign");
        assert!(key.verify(b"hello", &sig).await.expect("should verify"));

        let public = DidKey::new(
            provider(),
            Algorithm::ecdsa("P-256", "SHA-256"),
            KeyType::Ec,
            KeyUse::Signature,
            KeySource::Jwk(key.public_jwk().await.expect("should export")),
        );
        assert!(public.verify(b"hello", &sig).await.expect("should verify"));

        let err = public.sign(b"hello").await.expect_err("should fail");
        assert!(err.is(Err::NoSigningKey));
    }

    #[tokio::test]
    async fn private_import_materializes_public_half() {
        let source = DidKey::new(
            provider(),
            Algorithm::ecdsa("K-256", "SHA-256"),
            KeyType::Ec,
            KeyUse::Signature,
            KeySource::Generate,
        );
        let jwk = source.jwk().await.expect("should export");
        assert!(jwk.is_private());

        let imported = DidKey::with_spec(
            provider(),
            KeySpec::new(Algorithm::ecdsa("K-256", "SHA-256"), KeyType::Ec, KeyUse::Signature)
                .exportable(false),
            KeySource::Jwk(jwk.clone()),
        );
        let material = imported.resolve_key().await.expect("should resolve");
        assert!(material.signing_key().is_some());
        assert!(material.verification_key().is_some());
        assert_eq!(imported.public_jwk().await.expect("should export"), jwk.to_public());

        let err = imported.jwk().await.expect_err("should fail");
        assert!(err.is(Err::CryptoProvider));
    }

    #[tokio::test]
    async fn unsupported_key_type() {
        let key = DidKey::new(
            provider(),
            Algorithm::default(),
            KeyType::Rsa,
            KeyUse::Signature,
            KeySource::Generate,
        );
        let err = key.resolve_key().await.expect_err("should fail");
        assert!(err.is(Err::UnsupportedKeyType));
        assert!(!key.is_resolved().await);
    }

    #[tokio::test]
    async fn failed_resolution_stays_pending() {
        let key = DidKey::new(
            provider(),
            Algorithm::ecdh("K-256"),
            KeyType::Ec,
            KeyUse::Encryption,
            KeySource::Bytes(vec![1; 32]),
        );
        let err = key.sign(b"hello").await.expect_err("should fail");
        assert!(err.is(Err::InvalidKey));
        assert!(!key.is_resolved().await);
    }

    #[tokio::test]
    async fn symmetric_has_no_public_jwk() {
        let key = DidKey::new(
            provider(),
            Algorithm::hmac("SHA-256"),
            KeyType::Oct,
            KeyUse::Signature,
            KeySource::Generate,
        );
        let err = key.public_jwk().await.expect_err("should fail");
        assert!(err.is(Err::InvalidKey));
    }
}
