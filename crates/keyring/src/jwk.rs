//! Simplified JSON Web Key (JWK) structure, the exchange format between `DidKey` and a
//! `CryptoProvider`.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};

use crate::key::KeyUse;

/// Simplified JSON Web Key (JWK) key structure.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Jwk {
    /// Key type. `oct` or `EC`.
    pub kty: String,
    /// Intended use of the key. `sig` or `enc`.
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    /// Cryptographic curve name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// X coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Y coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// Private scalar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    /// Symmetric key value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
}

impl Jwk {
    /// A symmetric (`oct`) key holding `secret`.
    #[must_use]
    pub fn oct(secret: &[u8], key_use: Option<KeyUse>) -> Self {
        Self {
            kty: "oct".to_string(),
            use_: key_use.map(|u| u.to_string()),
            k: Some(Base64UrlUnpadded::encode_string(secret)),
            ..Self::default()
        }
    }

    /// An elliptic curve key. `d` is included for private keys only.
    #[must_use]
    pub fn ec(crv: &str, x: &[u8], y: &[u8], d: Option<&[u8]>) -> Self {
        Self {
            kty: "EC".to_string(),
            crv: Some(crv.to_string()),
            x: Some(Base64UrlUnpadded::encode_string(x)),
            y: Some(Base64UrlUnpadded::encode_string(y)),
            d: d.map(Base64UrlUnpadded::encode_string),
            ..Self::default()
        }
    }

    /// True if the key carries private material.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// The public half of an asymmetric key: a copy without the private scalar.
    #[must_use]
    pub fn to_public(&self) -> Self {
        Self {
            d: None,
            ..self.clone()
        }
    }

    /// True if both public coordinates are present.
    #[must_use]
    pub const fn has_coordinates(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn oct_layout() {
        let jwk = Jwk::oct(&[0u8; 4], Some(KeyUse::Signature));
        assert_eq!(
            serde_json::to_value(&jwk).expect("should serialize"),
            json!({"kty": "oct", "use": "sig", "k": "AAAAAA"})
        );
    }

    #[test]
    fn public_half() {
        let jwk = Jwk::ec("K-256", &[1; 32], &[2; 32], Some(&[3; 32]));
        assert!(jwk.is_private());
        let public = jwk.to_public();
        assert!(!public.is_private());
        assert_eq!(public.x, jwk.x);
        assert_eq!(public.crv.as_deref(), Some("K-256"));
    }
}
