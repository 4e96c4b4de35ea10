//! Named elliptic curves supported for key pairs and pairwise derivation.

use did_core::error::Err;
use did_core::{tracerr, Result};
use ecdsa::signature::{Signer, Verifier};
use ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::Secp256k1;
use p256::NistP256;
use rand::rngs::OsRng;

/// Length in bytes of a private scalar and of each public coordinate, for every supported curve.
pub const SCALAR_LEN: usize = 32;

/// Supported curves, named as in JWK `crv` and Web Crypto `namedCurve`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NamedCurve {
    /// secp256k1, `K-256`.
    K256,
    /// NIST P-256, `P-256`.
    P256,
}

impl NamedCurve {
    /// Look up a curve by name. `secp256k1` is accepted as an alias of `K-256`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "K-256" | "secp256k1" => Some(Self::K256),
            "P-256" => Some(Self::P256),
            _ => None,
        }
    }

    /// The curve name used in JWK `crv`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::K256 => "K-256",
            Self::P256 => "P-256",
        }
    }

    /// True if `scalar` is a valid private key for this curve: exactly [`SCALAR_LEN`] big-endian
    /// bytes, non-zero and less than the group order.
    #[must_use]
    pub fn is_valid_scalar(self, scalar: &[u8]) -> bool {
        scalar.len() == SCALAR_LEN && EcSecretKey::from_scalar(self, scalar).is_ok()
    }

    /// The affine public coordinates `(x, y)` for a private scalar.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidKey` - the scalar is not a valid private key for this curve.
    pub fn public_coordinates(self, scalar: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
        Ok(EcSecretKey::from_scalar(self, scalar)?.public_key().coordinates())
    }
}

/// Private key on a supported curve.
#[derive(Clone)]
pub(crate) enum EcSecretKey {
    K256(k256::SecretKey),
    P256(p256::SecretKey),
}

/// Public key on a supported curve.
#[derive(Clone, Debug)]
pub(crate) enum EcPublicKey {
    K256(k256::PublicKey),
    P256(p256::PublicKey),
}

impl EcSecretKey {
    pub(crate) fn random(curve: NamedCurve) -> Self {
        match curve {
            NamedCurve::K256 => Self::K256(k256::SecretKey::random(&mut OsRng)),
            NamedCurve::P256 => Self::P256(p256::SecretKey::random(&mut OsRng)),
        }
    }

    pub(crate) fn from_scalar(curve: NamedCurve, scalar: &[u8]) -> Result<Self> {
        if scalar.len() != SCALAR_LEN {
            tracerr!(Err::InvalidKey, "private scalar must be {SCALAR_LEN} bytes");
        }
        let key = match curve {
            NamedCurve::K256 => k256::SecretKey::from_slice(scalar).map(Self::K256),
            NamedCurve::P256 => p256::SecretKey::from_slice(scalar).map(Self::P256),
        };
        let Ok(key) = key else {
            tracerr!(Err::InvalidKey, "private scalar out of range for {}", curve.name());
        };
        Ok(key)
    }

    pub(crate) const fn curve(&self) -> NamedCurve {
        match self {
            Self::K256(_) => NamedCurve::K256,
            Self::P256(_) => NamedCurve::P256,
        }
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::K256(sk) => sk.to_bytes().to_vec(),
            Self::P256(sk) => sk.to_bytes().to_vec(),
        }
    }

    pub(crate) fn public_key(&self) -> EcPublicKey {
        match self {
            Self::K256(sk) => EcPublicKey::K256(sk.public_key()),
            Self::P256(sk) => EcPublicKey::P256(sk.public_key()),
        }
    }

    // ECDSA over SHA-256, fixed-size `r || s` encoding.
    pub(crate) fn sign(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            Self::K256(sk) => {
                let sig: Signature<Secp256k1> = SigningKey::<Secp256k1>::from(sk).sign(msg);
                sig.to_bytes().to_vec()
            }
            Self::P256(sk) => {
                let sig: Signature<NistP256> = SigningKey::<NistP256>::from(sk).sign(msg);
                sig.to_bytes().to_vec()
            }
        }
    }
}

impl EcPublicKey {
    pub(crate) fn from_coordinates(curve: NamedCurve, x: &[u8], y: &[u8]) -> Result<Self> {
        if x.len() != SCALAR_LEN || y.len() != SCALAR_LEN {
            tracerr!(
                Err::InvalidKey,
                "Invalid coordinate length. Expected {SCALAR_LEN} bytes, got {} and {}",
                x.len(),
                y.len()
            );
        }
        let sec1 = [&[0x04u8][..], x, y].concat();
        let key = match curve {
            NamedCurve::K256 => k256::PublicKey::from_sec1_bytes(&sec1).map(Self::K256),
            NamedCurve::P256 => p256::PublicKey::from_sec1_bytes(&sec1).map(Self::P256),
        };
        let Ok(key) = key else {
            tracerr!(Err::InvalidKey, "point is not on curve {}", curve.name());
        };
        Ok(key)
    }

    pub(crate) const fn curve(&self) -> NamedCurve {
        match self {
            Self::K256(_) => NamedCurve::K256,
            Self::P256(_) => NamedCurve::P256,
        }
    }

    pub(crate) fn coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        let point = match self {
            Self::K256(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            Self::P256(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
        };
        // uncompressed SEC1: 0x04 || x || y
        let (x, y) = point[1..].split_at(SCALAR_LEN);
        (x.to_vec(), y.to_vec())
    }

    pub(crate) fn verify(&self, msg: &[u8], sig: &[u8]) -> bool {
        match self {
            Self::K256(pk) => Signature::<Secp256k1>::from_slice(sig)
                .is_ok_and(|sig| VerifyingKey::<Secp256k1>::from(pk).verify(msg, &sig).is_ok()),
            Self::P256(pk) => Signature::<NistP256>::from_slice(sig)
                .is_ok_and(|sig| VerifyingKey::<NistP256>::from(pk).verify(msg, &sig).is_ok()),
        }
    }
}
