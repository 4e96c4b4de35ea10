//! Public key entries of a DID document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A public key definition entry in a DID document.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "RawPublicKey", into = "RawPublicKey")]
pub struct PublicKey {
    /// Identifier of the key. Fully qualified once the owning document has been parsed, e.g.
    /// `did:example:entity.id#keys-1`.
    pub id: String,

    /// The key type, as listed in the linked data cryptosuite registry.
    pub type_: String,

    /// The DID of the controller of this key.
    pub controller: String,

    /// The encoded key value.
    pub key: PublicKeyFormat,
}

/// The value of a public key. A key entry carries exactly one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKeyFormat {
    /// `publicKeyPem`
    Pem(String),
    /// `publicKeyJwk`
    Jwk(Value),
    /// `publicKeyHex`
    Hex(String),
    /// `publicKeyBase64`
    Base64(String),
    /// `publicKeyBase58`
    Base58(String),
    /// `publicKeyMultibase`
    Multibase(String),
}

#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawPublicKey {
    id: String,
    #[serde(rename = "type")]
    type_: String,
    controller: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key_pem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key_jwk: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key_base58: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key_multibase: Option<String>,
}

impl TryFrom<RawPublicKey> for PublicKey {
    type Error = String;

    fn try_from(raw: RawPublicKey) -> Result<Self, Self::Error> {
        let mut values = [
            raw.public_key_pem.map(PublicKeyFormat::Pem),
            raw.public_key_jwk.map(PublicKeyFormat::Jwk),
            raw.public_key_hex.map(PublicKeyFormat::Hex),
            raw.public_key_base64.map(PublicKeyFormat::Base64),
            raw.public_key_base58.map(PublicKeyFormat::Base58),
            raw.public_key_multibase.map(PublicKeyFormat::Multibase),
        ]
        .into_iter()
        .flatten();

        let (Some(key), None) = (values.next(), values.next()) else {
            return Err(format!("public key {} must have exactly one key value", raw.id));
        };

        Ok(Self {
            id: raw.id,
            type_: raw.type_,
            controller: raw.controller,
            key,
        })
    }
}

impl From<PublicKey> for RawPublicKey {
    fn from(key: PublicKey) -> Self {
        let mut raw = Self {
            id: key.id,
            type_: key.type_,
            controller: key.controller,
            ..Self::default()
        };
        match key.key {
            PublicKeyFormat::Pem(v) => raw.public_key_pem = Some(v),
            PublicKeyFormat::Jwk(v) => raw.public_key_jwk = Some(v),
            PublicKeyFormat::Hex(v) => raw.public_key_hex = Some(v),
            PublicKeyFormat::Base64(v) => raw.public_key_base64 = Some(v),
            PublicKeyFormat::Base58(v) => raw.public_key_base58 = Some(v),
            PublicKeyFormat::Multibase(v) => raw.public_key_multibase = Some(v),
        }
        raw
    }
}

impl PublicKey {
    /// The DID portion of the key id.
    #[must_use]
    pub fn did(&self) -> &str {
        self.id.split('#').next().unwrap_or_default()
    }
}
