//! Key type, key use and the usage flags requested from a crypto provider.

use std::fmt;
use std::str::FromStr;

use did_core::error::Err;
use did_core::{tracerr, Result};
use serde::{Deserialize, Serialize};

use crate::provider::Algorithm;

/// The family of key. Determines which resolution and derivation path applies.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum KeyType {
    /// Symmetric key.
    #[serde(rename = "oct")]
    Oct,
    /// Elliptic curve key pair.
    #[serde(rename = "EC")]
    Ec,
    /// RSA key pair.
    #[serde(rename = "RSA")]
    Rsa,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oct => write!(f, "oct"),
            Self::Ec => write!(f, "EC"),
            Self::Rsa => write!(f, "RSA"),
        }
    }
}

/// Intended use of a key.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum KeyUse {
    /// Signing and verification.
    #[serde(rename = "sig")]
    Signature,
    /// Encryption or, for key pairs, key agreement.
    #[serde(rename = "enc")]
    Encryption,
}

impl fmt::Display for KeyUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature => write!(f, "sig"),
            Self::Encryption => write!(f, "enc"),
        }
    }
}

impl FromStr for KeyUse {
    type Err = did_core::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sig" => Ok(Self::Signature),
            "enc" => Ok(Self::Encryption),
            _ => tracerr!(
                Err::InvalidKeyUse,
                "The value for KeyUse '{s}' is invalid. Needs to be sig or enc"
            ),
        }
    }
}

/// Operations a provider key may be used for.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyUsage {
    /// Produce a signature or MAC.
    Sign,
    /// Check a signature or MAC.
    Verify,
    /// Encrypt data.
    Encrypt,
    /// Decrypt data.
    Decrypt,
    /// Derive a key through key agreement.
    DeriveKey,
    /// Derive raw bits through key agreement.
    DeriveBits,
}

impl KeyUsage {
    /// True for operations performed with the public half of a key pair.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Verify | Self::Encrypt)
    }
}

/// Everything needed to ask a provider for key material except the material itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySpec {
    /// Algorithm descriptor passed through to the provider.
    pub algorithm: Algorithm,
    /// Key family.
    pub key_type: KeyType,
    /// Intended use.
    pub key_use: KeyUse,
    /// Whether the provider may export the key.
    pub exportable: bool,
}

impl KeySpec {
    /// Create a key spec. Keys are exportable by default.
    #[must_use]
    pub fn new(algorithm: Algorithm, key_type: KeyType, key_use: KeyUse) -> Self {
        Self {
            algorithm,
            key_type,
            key_use,
            exportable: true,
        }
    }

    /// Set whether the key may be exported.
    #[must_use]
    pub fn exportable(mut self, exportable: bool) -> Self {
        self.exportable = exportable;
        self
    }

    /// True for key types that come as a private/public pair.
    #[must_use]
    pub const fn is_key_pair(&self) -> bool {
        matches!(self.key_type, KeyType::Ec | KeyType::Rsa)
    }

    /// The usage flags for the private half of a key pair, or for a secret.
    #[must_use]
    pub fn private_usages(&self) -> Vec<KeyUsage> {
        if !self.is_key_pair() {
            return self.usages();
        }
        self.usages().into_iter().filter(|u| !u.is_public()).collect()
    }

    /// The usage flags for the public half of a key pair.
    #[must_use]
    pub fn public_usages(&self) -> Vec<KeyUsage> {
        self.usages().into_iter().filter(|u| u.is_public()).collect()
    }

    /// The usage flags to request from the provider.
    ///
    /// Encryption use on a key pair maps to key agreement (`deriveKey`, `deriveBits`) because
    /// elliptic curve keys are used to agree on a key, not to encrypt directly.
    #[must_use]
    pub fn usages(&self) -> Vec<KeyUsage> {
        match self.key_use {
            KeyUse::Encryption if self.is_key_pair() => {
                vec![KeyUsage::DeriveKey, KeyUsage::DeriveBits]
            }
            KeyUse::Encryption => vec![KeyUsage::Encrypt, KeyUsage::Decrypt],
            KeyUse::Signature => vec![KeyUsage::Sign, KeyUsage::Verify],
        }
    }
}
