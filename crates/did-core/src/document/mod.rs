//! # DID Document
//!
//! A DID Document is a JSON record associated with a DID, describing the public keys and service
//! endpoints of the DID subject. Only the `@context` and `id` members are required; everything
//! else is optional and unrecognised members are carried through untouched.

pub mod public_key;
pub mod service;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Err;
use crate::{Did, Result};
pub use public_key::{PublicKey, PublicKeyFormat};
pub use service::{Endpoint, Service};

/// The default context for a DID document.
pub const DID_CONTEXT: &str = "https://w3id.org/did/v1";

/// A parsed DID Document.
///
/// Public key identifiers are always fully qualified: an `id` with no fragment separator, or
/// consisting of a fragment only, is prefixed with the document's own DID when the document is
/// parsed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawDocument")]
pub struct DidDocument {
    /// The JSON-LD context of the document.
    #[serde(rename = "@context")]
    pub context: String,

    /// The DID the document describes.
    pub id: Did,

    /// Public keys, with fully qualified ids.
    #[serde(rename = "publicKey", skip_serializing_if = "Vec::is_empty")]
    pub public_key: Vec<PublicKey>,

    /// Service endpoints, in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<Service>,

    /// Document members this library does not interpret.
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

// Wire shape of a document before key ids are qualified.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "@context")]
    context: String,
    id: Did,
    #[serde(rename = "publicKey", default)]
    public_key: Vec<PublicKey>,
    #[serde(default)]
    service: Vec<Service>,
    #[serde(flatten)]
    additional: Map<String, Value>,
}

impl TryFrom<RawDocument> for DidDocument {
    type Error = String;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        if !crate::is_did(&raw.id) {
            return Err(format!("document id is not a DID: {}", raw.id));
        }
        let public_key = raw
            .public_key
            .into_iter()
            .map(|mut key| {
                key.id = qualify_key_id(&raw.id, &key.id);
                key
            })
            .collect();

        Ok(Self {
            context: raw.context,
            id: raw.id,
            public_key,
            service: raw.service,
            additional: raw.additional,
        })
    }
}

impl DidDocument {
    /// Parse a DID document from its JSON representation.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidFormat` - a required member (`@context`, `id`) is missing, the `id` is not a
    ///   DID, or a public key entry does not have exactly one key value.
    pub fn from_json(json: Value) -> Result<Self> {
        for field in ["@context", "id"] {
            if json.get(field).is_none() {
                crate::tracerr!(Err::InvalidFormat, "{field} is required");
            }
        }
        match serde_json::from_value(json) {
            Ok(doc) => Ok(doc),
            Err(e) => crate::tracerr!(Err::InvalidFormat, "invalid DID document: {e}"),
        }
    }

    /// Returns the DID portion of a fully qualified key id.
    ///
    /// `did:example:abc#key1` yields `did:example:abc`. An id with no fragment yields an empty
    /// string.
    #[must_use]
    pub fn did_from_key_id(key_id: &str) -> &str {
        key_id.find('#').map_or("", |idx| &key_id[..idx])
    }

    /// Find the public key with the given fully qualified id.
    #[must_use]
    pub fn public_key(&self, id: &str) -> Option<&PublicKey> {
        self.public_key.iter().find(|k| k.id == id)
    }

    /// All service endpoints in the document. Empty when the document has no `service` member.
    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.service
    }

    /// Service endpoints of the given type, in document order.
    #[must_use]
    pub fn services_by_type(&self, type_: &str) -> Vec<&Service> {
        self.service.iter().filter(|s| s.type_ == type_).collect()
    }
}

// Prefix bare or fragment-only key ids with the document DID.
fn qualify_key_id(did: &str, id: &str) -> String {
    match id.find('#') {
        None => format!("{did}#{id}"),
        Some(0) => format!("{did}{id}"),
        Some(_) => id.to_string(),
    }
}
