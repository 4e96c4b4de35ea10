//! In-memory software crypto provider.
//!
//! Keys exist only as long as their handles. Supports HMAC (SHA-256, SHA-384, SHA-512), ECDSA
//! with SHA-256 and ECDH key pairs on K-256 and P-256.

use std::fmt;

use base64ct::{Base64UrlUnpadded, Encoding};
use did_core::error::Err;
use did_core::{tracerr, Result};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Sha256, Sha384, Sha512};

use crate::curve::{EcPublicKey, EcSecretKey, NamedCurve};
use crate::jwk::Jwk;
use crate::key::KeyUsage;
use crate::provider::{Algorithm, CryptoProvider, GeneratedKey, KeyHandle, KeyKind};

/// Software provider holding keys in process memory.
#[derive(Clone, Copy, Debug, Default)]
pub struct EphemeralCrypto;

impl EphemeralCrypto {
    /// Create a new `EphemeralCrypto` instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HashAlg {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlg {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SHA-256" => Some(Self::Sha256),
            "SHA-384" => Some(Self::Sha384),
            "SHA-512" => Some(Self::Sha512),
            _ => None,
        }
    }

    const fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    fn mac(self, secret: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let mac = match self {
            Self::Sha256 => Hmac::<Sha256>::new_from_slice(secret)
                .map(|m| m.chain_update(data).finalize().into_bytes().to_vec()),
            Self::Sha384 => Hmac::<Sha384>::new_from_slice(secret)
                .map(|m| m.chain_update(data).finalize().into_bytes().to_vec()),
            Self::Sha512 => Hmac::<Sha512>::new_from_slice(secret)
                .map(|m| m.chain_update(data).finalize().into_bytes().to_vec()),
        };
        let Ok(mac) = mac else {
            tracerr!(Err::InvalidKey, "invalid HMAC key length");
        };
        Ok(mac)
    }

    fn verify(self, secret: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
        let verified = match self {
            Self::Sha256 => Hmac::<Sha256>::new_from_slice(secret)
                .map(|m| m.chain_update(data).verify_slice(signature).is_ok()),
            Self::Sha384 => Hmac::<Sha384>::new_from_slice(secret)
                .map(|m| m.chain_update(data).verify_slice(signature).is_ok()),
            Self::Sha512 => Hmac::<Sha512>::new_from_slice(secret)
                .map(|m| m.chain_update(data).verify_slice(signature).is_ok()),
        };
        let Ok(verified) = verified else {
            tracerr!(Err::InvalidKey, "invalid HMAC key length");
        };
        Ok(verified)
    }
}

// Algorithm families, parsed from a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Family {
    Hmac(HashAlg),
    Ecdsa(NamedCurve),
    Ecdh(NamedCurve),
}

impl Family {
    fn parse(algorithm: &Algorithm) -> Result<Self> {
        if algorithm.is("HMAC") {
            let hash = algorithm.hash.as_deref().unwrap_or_default();
            let Some(hash) = HashAlg::from_name(hash) else {
                tracerr!(Err::UnsupportedAlgorithm, "hash '{hash}' is not supported for HMAC");
            };
            return Ok(Self::Hmac(hash));
        }

        let is_ecdsa = algorithm.is("ECDSA");
        if !is_ecdsa && !algorithm.is("ECDH") {
            tracerr!(Err::UnsupportedAlgorithm, "Algorithm '{}' is not supported", algorithm.name);
        }
        let crv = algorithm.named_curve.as_deref().unwrap_or_default();
        let Some(curve) = NamedCurve::from_name(crv) else {
            tracerr!(Err::UnsupportedAlgorithm, "curve '{crv}' is not supported");
        };
        if !is_ecdsa {
            return Ok(Self::Ecdh(curve));
        }
        if let Some(hash) = &algorithm.hash {
            if HashAlg::from_name(hash) != Some(HashAlg::Sha256) {
                tracerr!(Err::UnsupportedAlgorithm, "hash '{hash}' is not supported for ECDSA");
            }
        }
        Ok(Self::Ecdsa(curve))
    }

    const fn curve(self) -> Option<NamedCurve> {
        match self {
            Self::Hmac(_) => None,
            Self::Ecdsa(curve) | Self::Ecdh(curve) => Some(curve),
        }
    }

    const fn permitted(self, kind: KeyKind) -> &'static [KeyUsage] {
        match (self, kind) {
            (Self::Hmac(_), KeyKind::Secret) => &[KeyUsage::Sign, KeyUsage::Verify],
            (Self::Ecdsa(_), KeyKind::Private) => &[KeyUsage::Sign],
            (Self::Ecdsa(_), KeyKind::Public) => &[KeyUsage::Verify],
            (Self::Ecdh(_), KeyKind::Private) => &[KeyUsage::DeriveKey, KeyUsage::DeriveBits],
            _ => &[],
        }
    }

    fn check_usages(self, kind: KeyKind, usages: &[KeyUsage]) -> Result<()> {
        if usages.is_empty() && kind != KeyKind::Public {
            tracerr!(Err::CryptoProvider, "usages must not be empty for a {kind:?} key");
        }
        let permitted = self.permitted(kind);
        if let Some(usage) = usages.iter().find(|u| !permitted.contains(*u)) {
            tracerr!(
                Err::CryptoProvider,
                "usage {usage:?} is not permitted for a {kind:?} {:?} key",
                self
            );
        }
        Ok(())
    }
}

#[derive(Clone)]
enum Material {
    Secret(Vec<u8>),
    Private(EcSecretKey),
    Public(EcPublicKey),
}

/// Handle to a key held by [`EphemeralCrypto`].
#[derive(Clone)]
pub struct EphemeralKey {
    family: Family,
    extractable: bool,
    usages: Vec<KeyUsage>,
    material: Material,
}

impl EphemeralKey {
    fn new(family: Family, extractable: bool, usages: Vec<KeyUsage>, material: Material) -> Self {
        Self {
            family,
            extractable,
            usages,
            material,
        }
    }

    /// The usages the key was created with.
    #[must_use]
    pub fn usages(&self) -> &[KeyUsage] {
        &self.usages
    }

    /// Whether the key may be exported.
    #[must_use]
    pub const fn extractable(&self) -> bool {
        self.extractable
    }

    fn permits(&self, usage: KeyUsage, algorithm: &Algorithm) -> Result<()> {
        if !self.usages.contains(&usage) {
            tracerr!(Err::CryptoProvider, "key does not permit {usage:?}");
        }
        if Family::parse(algorithm)? != self.family {
            tracerr!(Err::CryptoProvider, "key cannot be used with algorithm '{}'", algorithm.name);
        }
        Ok(())
    }
}

impl KeyHandle for EphemeralKey {
    fn kind(&self) -> KeyKind {
        match self.material {
            Material::Secret(_) => KeyKind::Secret,
            Material::Private(_) => KeyKind::Private,
            Material::Public(_) => KeyKind::Public,
        }
    }
}

impl fmt::Debug for EphemeralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKey")
            .field("kind", &self.kind())
            .field("family", &self.family)
            .field("extractable", &self.extractable)
            .field("usages", &self.usages)
            .finish_non_exhaustive()
    }
}

fn decode(field: Option<&String>, name: &str) -> Result<Vec<u8>> {
    let Some(value) = field else {
        tracerr!(Err::InvalidKey, "JWK is missing '{name}'");
    };
    Ok(Base64UrlUnpadded::decode_vec(value)?)
}

impl CryptoProvider for EphemeralCrypto {
    type Key = EphemeralKey;

    async fn generate_key(
        &self, algorithm: &Algorithm, extractable: bool, usages: &[KeyUsage],
    ) -> Result<GeneratedKey<EphemeralKey>> {
        let family = Family::parse(algorithm)?;

        let Some(curve) = family.curve() else {
            let Family::Hmac(hash) = family else {
                tracerr!(Err::UnsupportedAlgorithm, "cannot generate {family:?} keys");
            };
            family.check_usages(KeyKind::Secret, usages)?;
            let secret = self.random_bytes(algorithm.length.unwrap_or(hash.output_len()))?;
            let material = Material::Secret(secret);
            let key = EphemeralKey::new(family, extractable, usages.to_vec(), material);
            return Ok(GeneratedKey::Secret(key));
        };

        let (public_usages, private_usages): (Vec<KeyUsage>, Vec<KeyUsage>) =
            usages.iter().copied().partition(|u| u.is_public());
        family.check_usages(KeyKind::Private, &private_usages)?;
        family.check_usages(KeyKind::Public, &public_usages)?;

        let secret = EcSecretKey::random(curve);
        let public = Material::Public(secret.public_key());
        let private = Material::Private(secret);
        Ok(GeneratedKey::Pair {
            private: EphemeralKey::new(family, extractable, private_usages, private),
            public: EphemeralKey::new(family, true, public_usages, public),
        })
    }

    async fn import_key(
        &self, jwk: &Jwk, algorithm: &Algorithm, extractable: bool, usages: &[KeyUsage],
    ) -> Result<EphemeralKey> {
        let family = Family::parse(algorithm)?;

        let Some(curve) = family.curve() else {
            if jwk.kty != "oct" {
                tracerr!(Err::InvalidKey, "expected an oct JWK for HMAC, got '{}'", jwk.kty);
            }
            let secret = decode(jwk.k.as_ref(), "k")?;
            if secret.is_empty() {
                tracerr!(Err::InvalidKey, "HMAC key must not be empty");
            }
            family.check_usages(KeyKind::Secret, usages)?;
            let material = Material::Secret(secret);
            return Ok(EphemeralKey::new(family, extractable, usages.to_vec(), material));
        };

        if jwk.kty != "EC" {
            tracerr!(Err::InvalidKey, "expected an EC JWK, got '{}'", jwk.kty);
        }
        if jwk.crv.as_deref() != Some(curve.name()) {
            tracerr!(Err::InvalidKey, "JWK curve does not match '{}'", curve.name());
        }

        let material = if jwk.is_private() {
            let secret = EcSecretKey::from_scalar(curve, &decode(jwk.d.as_ref(), "d")?)?;
            if jwk.has_coordinates() {
                let (x, y) = secret.public_key().coordinates();
                if decode(jwk.x.as_ref(), "x")? != x || decode(jwk.y.as_ref(), "y")? != y {
                    tracerr!(Err::InvalidKey, "public coordinates do not match the private key");
                }
            }
            Material::Private(secret)
        } else {
            let x = decode(jwk.x.as_ref(), "x")?;
            let y = decode(jwk.y.as_ref(), "y")?;
            Material::Public(EcPublicKey::from_coordinates(curve, &x, &y)?)
        };

        let key = EphemeralKey::new(family, extractable, usages.to_vec(), material);
        family.check_usages(key.kind(), usages)?;
        Ok(key)
    }

    async fn export_key(&self, key: &EphemeralKey) -> Result<Jwk> {
        if !key.extractable {
            tracerr!(Err::CryptoProvider, "key is not extractable");
        }
        let jwk = match &key.material {
            Material::Secret(secret) => Jwk::oct(secret, None),
            Material::Private(secret) => {
                let (x, y) = secret.public_key().coordinates();
                Jwk::ec(secret.curve().name(), &x, &y, Some(&secret.to_bytes()))
            }
            Material::Public(public) => {
                let (x, y) = public.coordinates();
                Jwk::ec(public.curve().name(), &x, &y, None)
            }
        };
        Ok(jwk)
    }

    async fn sign(
        &self, algorithm: &Algorithm, key: &EphemeralKey, data: &[u8],
    ) -> Result<Vec<u8>> {
        key.permits(KeyUsage::Sign, algorithm)?;
        match (&key.material, key.family) {
            (Material::Secret(secret), Family::Hmac(hash)) => hash.mac(secret, data),
            (Material::Private(secret), Family::Ecdsa(_)) => Ok(secret.sign(data)),
            _ => tracerr!(Err::CryptoProvider, "key cannot sign"),
        }
    }

    async fn verify(
        &self, algorithm: &Algorithm, key: &EphemeralKey, signature: &[u8], data: &[u8],
    ) -> Result<bool> {
        key.permits(KeyUsage::Verify, algorithm)?;
        match (&key.material, key.family) {
            (Material::Secret(secret), Family::Hmac(hash)) => hash.verify(secret, data, signature),
            (Material::Public(public), Family::Ecdsa(_)) => Ok(public.verify(data, signature)),
            _ => tracerr!(Err::CryptoProvider, "key cannot verify"),
        }
    }

    fn random_bytes(&self, length: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; length];
        OsRng.fill_bytes(&mut bytes);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hmac_known_answer() {
        // RFC 4231 test case 2
        let crypto = EphemeralCrypto::new();
        let alg = Algorithm::hmac("SHA-256");
        let key = crypto
            .import_key(&Jwk::oct(b"Jefe", None), &alg, false, &[KeyUsage::Sign, KeyUsage::Verify])
            .await
            .expect("should import");
        let mac = crypto
            .sign(&alg, &key, b"what do ya want for nothing?")
            .await
            .expect("should sign");
        assert_eq!(&mac[..4], &[0x5b, 0xdc, 0xc1, 0x46]);
        assert!(crypto
            .verify(&alg, &key, &mac, b"what do ya want for nothing?")
            .await
            .expect("should verify"));

        let mut tampered = mac.clone();
        tampered[0] ^= 1;
        assert!(!crypto
            .verify(&alg, &key, &tampered, b"what do ya want for nothing?")
            .await
            .expect("should verify"));
        assert!(!crypto
            .verify(&alg, &key, &mac[..16], b"what do ya want for nothing?")
            .await
            .expect("should verify"));
    }

    #[tokio::test]
    async fn ecdh_pair_usages() {
        let crypto = EphemeralCrypto::new();
        let usages = [KeyUsage::DeriveKey, KeyUsage::DeriveBits];
        let generated = crypto
            .generate_key(&Algorithm::ecdh("K-256"), true, &usages)
            .await
            .expect("should generate");
        let GeneratedKey::Pair { private, public } = generated else {
            panic!("should be a key pair");
        };
        assert_eq!(private.usages(), &usages);
        assert!(public.usages().is_empty());

        let err = crypto
            .sign(&Algorithm::ecdh("K-256"), &private, b"data")
            .await
            .expect_err("should fail");
        assert!(err.is(Err::CryptoProvider));
    }

    #[tokio::test]
    async fn rejects_bad_usage() {
        let crypto = EphemeralCrypto::new();
        let err = crypto
            .generate_key(&Algorithm::ecdh("P-256"), true, &[KeyUsage::Sign])
            .await
            .expect_err("should fail");
        assert!(err.is(Err::CryptoProvider));
    }

    #[tokio::test]
    async fn non_extractable() {
        let crypto = EphemeralCrypto::new();
        let alg = Algorithm::ecdsa("P-256", "SHA-256");
        let generated = crypto
            .generate_key(&alg, false, &[KeyUsage::Sign, KeyUsage::Verify])
            .await
            .expect("should generate");
        let GeneratedKey::Pair { private, public } = generated else {
            panic!("should be a key pair");
        };
        let err = crypto.export_key(&private).await.expect_err("should fail");
        assert!(err.is(Err::CryptoProvider));

        let jwk = crypto.export_key(&public).await.expect("should export public");
        assert_eq!(jwk.crv.as_deref(), Some("P-256"));
        assert!(!jwk.is_private());
    }

    #[tokio::test]
    async fn mismatched_coordinates() {
        let crypto = EphemeralCrypto::new();
        let alg = Algorithm::ecdsa("K-256", "SHA-256");
        let a = generate_private(&crypto, &alg).await;
        let b = generate_private(&crypto, &alg).await;
        let a = crypto.export_key(&a).await.expect("should export");
        let b = crypto.export_key(&b).await.expect("should export");

        let mixed = Jwk { x: b.x, ..a };
        let err = crypto
            .import_key(&mixed, &alg, true, &[KeyUsage::Sign])
            .await
            .expect_err("should fail");
        assert!(err.is(Err::InvalidKey));
    }

    async fn generate_private(crypto: &EphemeralCrypto, alg: &Algorithm) -> EphemeralKey {
        let generated =
            crypto.generate_key(alg, true, &[KeyUsage::Sign]).await.expect("should generate");
        let GeneratedKey::Pair { private, .. } = generated else {
            panic!("should be a key pair");
        };
        private
    }

    #[test]
    fn unsupported_algorithm() {
        let alg = Algorithm {
            name: "AES-GCM".to_string(),
            ..Algorithm::default()
        };
        assert!(Family::parse(&alg).expect_err("should fail").is(Err::UnsupportedAlgorithm));
        let err = Family::parse(&Algorithm::hmac("MD5")).expect_err("should fail");
        assert!(err.is(Err::UnsupportedAlgorithm));
    }
}
