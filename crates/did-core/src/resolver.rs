//! Definition for a DID document resolver.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::DidDocument;
use crate::Result;

/// Return type from a DID document resolution.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// The resolved DID document.
    pub did_document: DidDocument,

    /// Resolver metadata, passed through uninterpreted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// A Resolver is responsible for resolving a DID to a DID document representation.
#[allow(async_fn_in_trait)]
pub trait Resolver {
    /// Resolve a DID to a DID document.
    ///
    /// # Errors
    ///
    /// * `Err::NotFound` - no document exists for the DID.
    /// * `Err::ResolutionFailed` - the resolver reported any other failure.
    async fn resolve(&self, did: &str) -> Result<Resolution>;
}
