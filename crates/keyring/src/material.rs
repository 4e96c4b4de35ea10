//! Resolved key material: the provider handles backing a `DidKey`.

use crate::key::KeySpec;

/// Provider handles, by shape of key.
#[derive(Clone, Debug)]
pub enum Handles<K> {
    /// A symmetric secret.
    Secret(K),
    /// An asymmetric pair. Either half may be absent, e.g. a key imported from a public JWK.
    Pair {
        /// Private half.
        private: Option<K>,
        /// Public half.
        public: Option<K>,
    },
}

/// Key material bound to the spec it was resolved for.
///
/// Immutable once built. A `DidKey` stores it behind an `Arc` and hands out clones.
#[derive(Clone, Debug)]
pub struct KeyMaterial<K> {
    spec: KeySpec,
    handles: Handles<K>,
}

impl<K> KeyMaterial<K> {
    /// Wrap resolved handles.
    pub const fn new(spec: KeySpec, handles: Handles<K>) -> Self {
        Self { spec, handles }
    }

    /// The spec the material was resolved for.
    pub const fn spec(&self) -> &KeySpec {
        &self.spec
    }

    /// The underlying handles.
    pub const fn handles(&self) -> &Handles<K> {
        &self.handles
    }

    /// The handle used to sign: the secret, or the private half of a pair.
    pub const fn signing_key(&self) -> Option<&K> {
        match &self.handles {
            Handles::Secret(k) => Some(k),
            Handles::Pair { private, .. } => private.as_ref(),
        }
    }

    /// The handle used to verify: the secret, or the public half of a pair.
    pub const fn verification_key(&self) -> Option<&K> {
        match &self.handles {
            Handles::Secret(k) => Some(k),
            Handles::Pair { public, .. } => public.as_ref(),
        }
    }

    /// True if the material is an asymmetric pair.
    pub const fn is_public_key_crypto(&self) -> bool {
        matches!(self.handles, Handles::Pair { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyType, KeyUse};
    use crate::provider::Algorithm;

    #[test]
    fn public_only_pair() {
        let spec =
            KeySpec::new(Algorithm::ecdsa("K-256", "SHA-256"), KeyType::Ec, KeyUse::Signature);
        let material = KeyMaterial::new(
            spec,
            Handles::Pair {
                private: None,
                public: Some("pub"),
            },
        );
        assert!(material.is_public_key_crypto());
        assert!(material.signing_key().is_none());
        assert_eq!(material.verification_key(), Some(&"pub"));
    }

    #[test]
    fn secret_signs_and_verifies() {
        let spec = KeySpec::new(Algorithm::hmac("SHA-256"), KeyType::Oct, KeyUse::Signature);
        let material = KeyMaterial::new(spec, Handles::Secret(7));
        assert!(!material.is_public_key_crypto());
        assert_eq!(material.signing_key(), Some(&7));
        assert_eq!(material.verification_key(), Some(&7));
    }
}
