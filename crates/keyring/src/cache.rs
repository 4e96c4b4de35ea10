//! Per-subject cache of pairwise master keys.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use did_core::Result;
use tokio::sync::OnceCell;

/// The secret from which all of a subject's pairwise keys are derived.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey {
    subject_did: String,
    key_bytes: Vec<u8>,
}

impl MasterKey {
    /// Create a master key for `subject_did`.
    #[must_use]
    pub const fn new(subject_did: String, key_bytes: Vec<u8>) -> Self {
        Self {
            subject_did,
            key_bytes,
        }
    }

    /// The subject DID the key belongs to.
    #[must_use]
    pub fn subject_did(&self) -> &str {
        &self.subject_did
    }

    /// Raw secret key material.
    #[must_use]
    pub fn key_bytes(&self) -> &[u8] {
        &self.key_bytes
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("subject_did", &self.subject_did)
            .field("key_bytes", &"<redacted>")
            .finish()
    }
}

type Slot = Arc<OnceCell<Arc<MasterKey>>>;

/// Master keys by subject DID.
///
/// Creation is serialized per subject: concurrent requests for the same DID wait on a single
/// in-flight derivation while other DIDs proceed independently. A failed derivation leaves the
/// slot empty, so the next request retries. Entries are never evicted.
#[derive(Default)]
pub struct MasterKeyCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MasterKeyCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the master key for `subject_did`, running `factory` to create it on a miss.
    ///
    /// # Errors
    ///
    /// Whatever `factory` fails with. Nothing is cached in that case.
    pub async fn get_or_create<F, Fut>(
        &self, subject_did: &str, factory: F,
    ) -> Result<Arc<MasterKey>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MasterKey>>,
    {
        let slot = {
            let mut slots = self.slots.lock().expect("lock on slots mutex failed");
            slots.entry(subject_did.to_string()).or_default().clone()
        };

        if let Some(master) = slot.get() {
            tracing::debug!("master key cache hit for {subject_did}");
            return Ok(master.clone());
        }

        let created = slot
            .get_or_try_init(|| async move {
                tracing::debug!("deriving master key for {subject_did}");
                factory().await.map(Arc::new)
            })
            .await;

        match created {
            Ok(master) => Ok(master.clone()),
            Err(e) => {
                self.release(subject_did, &slot);
                Err(e)
            }
        }
    }

    // Drop an empty slot once no other caller is waiting on it.
    fn release(&self, subject_did: &str, slot: &Slot) {
        let mut slots = self.slots.lock().expect("lock on slots mutex failed");
        let unused = slots.get(subject_did).is_some_and(|current| {
            Arc::ptr_eq(current, slot) && !current.initialized() && Arc::strong_count(current) == 2
        });
        if unused {
            slots.remove(subject_did);
        }
    }

    /// The cached master key for `subject_did`, if any.
    #[must_use]
    pub fn get(&self, subject_did: &str) -> Option<Arc<MasterKey>> {
        let slots = self.slots.lock().expect("lock on slots mutex failed");
        slots.get(subject_did).and_then(|slot| slot.get().cloned())
    }

    /// Number of subjects with a master key.
    #[must_use]
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().expect("lock on slots mutex failed");
        slots.values().filter(|slot| slot.initialized()).count()
    }

    /// True if no master key has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MasterKeyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKeyCache").field("len", &self.len()).finish()
    }
}
