//! Per-peer key pair derivation from a subject's master key.
//!
//! For counter `c = 0, 1, 2, ...` a candidate scalar is taken from the first 32 bytes of
//!
//! ```text
//! HMAC-SHA512(master_key, "did-pairwise" || len(subject_did) || subject_did
//!                         || len(peer_id) || peer_id || c)
//! ```
//!
//! where lengths and the counter are 32-bit big-endian. Candidates that are zero or not below the
//! curve order are rejected and the next counter is tried, so the resulting scalar is uniform over
//! the valid range. The same inputs always reproduce the same key.

use std::sync::Arc;

use did_core::error::Err;
use did_core::{tracerr, Result};

use crate::curve::{NamedCurve, SCALAR_LEN};
use crate::did_key::{DidKey, KeySource};
use crate::jwk::Jwk;
use crate::key::{KeySpec, KeyType, KeyUsage};
use crate::provider::{Algorithm, CryptoProvider};

/// Minimum master key length in bytes.
pub const MIN_MASTER_KEY_LEN: usize = 32;

const DOMAIN: &[u8] = b"did-pairwise";

// With a 2^-32 worst-case rejection rate per candidate (P-256), running out is not a practical
// outcome for a working provider.
const MAX_ATTEMPTS: u32 = 64;

/// Derives pairwise key pairs through a crypto provider.
#[derive(Debug)]
pub struct PairwiseKeyDeriver<P: CryptoProvider> {
    provider: Arc<P>,
}

impl<P: CryptoProvider> PairwiseKeyDeriver<P> {
    /// Create a deriver that runs its HMAC operations on `provider`.
    pub const fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Derive the key pair for (`subject_did`, `peer_id`) from `master_key` and return it as a
    /// resolved `DidKey` with the given spec.
    ///
    /// # Errors
    ///
    /// * `Err::UnsupportedPairwiseKeyType` - the spec is not for an EC key.
    /// * `Err::InsufficientSeedMaterial` - `master_key` is shorter than [`MIN_MASTER_KEY_LEN`].
    /// * `Err::UnsupportedAlgorithm` - the algorithm names no supported curve.
    /// * provider failures, propagated.
    pub async fn generate(
        &self, master_key: &[u8], subject_did: &str, peer_id: &str, spec: &KeySpec,
    ) -> Result<DidKey<P>> {
        if spec.key_type != KeyType::Ec {
            tracerr!(
                Err::UnsupportedPairwiseKeyType,
                "Pairwise key for type '{}' is not supported.",
                spec.key_type
            );
        }
        if master_key.len() < MIN_MASTER_KEY_LEN {
            tracerr!(
                Err::InsufficientSeedMaterial,
                "master key must be at least {MIN_MASTER_KEY_LEN} bytes, got {}",
                master_key.len()
            );
        }
        let crv = spec.algorithm.named_curve.as_deref().unwrap_or_default();
        let Some(curve) = NamedCurve::from_name(crv) else {
            tracerr!(Err::UnsupportedAlgorithm, "curve '{crv}' is not supported for pairwise keys");
        };

        tracing::debug!("deriving pairwise {} key for {subject_did} with {peer_id}", curve.name());

        let prf = Algorithm::hmac("SHA-512");
        let hmac_key = self
            .provider
            .import_key(&Jwk::oct(master_key, None), &prf, false, &[KeyUsage::Sign])
            .await?;

        for counter in 0..MAX_ATTEMPTS {
            let input = derivation_input(subject_did, peer_id, counter)?;
            let output = self.provider.sign(&prf, &hmac_key, &input).await?;
            let Some(candidate) = output.get(..SCALAR_LEN) else {
                tracerr!(
                    Err::CryptoProvider,
                    "HMAC output too short: {} bytes, need {SCALAR_LEN}",
                    output.len()
                );
            };
            if !curve.is_valid_scalar(candidate) {
                tracing::debug!("candidate scalar {counter} rejected");
                continue;
            }

            let (x, y) = curve.public_coordinates(candidate)?;
            let jwk = Jwk::ec(curve.name(), &x, &y, Some(candidate));
            let key = DidKey::with_spec(self.provider.clone(), spec.clone(), KeySource::Jwk(jwk));
            key.resolve_key().await?;
            return Ok(key);
        }

        tracerr!(Err::CryptoProvider, "no valid scalar after {MAX_ATTEMPTS} attempts")
    }
}

fn derivation_input(subject_did: &str, peer_id: &str, counter: u32) -> Result<Vec<u8>> {
    let mut input = Vec::with_capacity(DOMAIN.len() + subject_did.len() + peer_id.len() + 12);
    input.extend_from_slice(DOMAIN);
    for part in [subject_did, peer_id] {
        let Ok(len) = u32::try_from(part.len()) else {
            tracerr!(Err::InvalidFormat, "identifier too long for pairwise derivation");
        };
        input.extend_from_slice(&len.to_be_bytes());
        input.extend_from_slice(part.as_bytes());
    }
    input.extend_from_slice(&counter.to_be_bytes());
    Ok(input)
}
