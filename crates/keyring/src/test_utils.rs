//! Instrumented provider for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use did_core::Result;

use crate::ephemeral::EphemeralCrypto;
use crate::jwk::Jwk;
use crate::key::KeyUsage;
use crate::provider::{Algorithm, CryptoProvider, GeneratedKey};

/// Wraps a provider, counting calls and recording every message signed.
///
/// Each asynchronous operation yields to the runtime before delegating, so concurrent callers
/// interleave at every provider boundary.
#[derive(Debug, Default)]
pub struct CountingCrypto<P = EphemeralCrypto> {
    inner: P,
    calls: AtomicUsize,
    signed: Mutex<Vec<Vec<u8>>>,
}

impl CountingCrypto {
    /// Count calls into a new [`EphemeralCrypto`].
    #[must_use]
    pub fn new() -> Self {
        Self::wrap(EphemeralCrypto::new())
    }
}

impl<P> CountingCrypto<P> {
    /// Count calls into `inner`.
    pub const fn wrap(inner: P) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            signed: Mutex::new(Vec::new()),
        }
    }

    /// Total provider calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// How many times `data` has been signed. Master key derivation signs the subject DID, so
    /// `sign_count_for(did.as_bytes())` counts master key derivations.
    ///
    /// # Panics
    ///
    /// If the lock on the recorded messages is poisoned.
    pub fn sign_count_for(&self, data: &[u8]) -> usize {
        let signed = self.signed.lock().expect("lock on signed mutex failed");
        signed.iter().filter(|msg| msg.as_slice() == data).count()
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }
}

impl<P: CryptoProvider> CryptoProvider for CountingCrypto<P> {
    type Key = P::Key;

    async fn generate_key(
        &self, algorithm: &Algorithm, extractable: bool, usages: &[KeyUsage],
    ) -> Result<GeneratedKey<Self::Key>> {
        self.enter().await;
        self.inner.generate_key(algorithm, extractable, usages).await
    }

    async fn import_key(
        &self, jwk: &Jwk, algorithm: &Algorithm, extractable: bool, usages: &[KeyUsage],
    ) -> Result<Self::Key> {
        self.enter().await;
        self.inner.import_key(jwk, algorithm, extractable, usages).await
    }

    async fn export_key(&self, key: &Self::Key) -> Result<Jwk> {
        self.enter().await;
        self.inner.export_key(key).await
    }

    async fn sign(&self, algorithm: &Algorithm, key: &Self::Key, data: &[u8]) -> Result<Vec<u8>> {
        self.enter().await;
        self.signed.lock().expect("lock on signed mutex failed").push(data.to_vec());
        self.inner.sign(algorithm, key, data).await
    }

    async fn verify(
        &self, algorithm: &Algorithm, key: &Self::Key, signature: &[u8], data: &[u8],
    ) -> Result<bool> {
        self.enter().await;
        self.inner.verify(algorithm, key, signature, data).await
    }

    fn random_bytes(&self, length: usize) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.random_bytes(length)
    }
}
