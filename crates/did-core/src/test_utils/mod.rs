//! Resolver implementation for use in tests.

use std::sync::{Arc, Mutex};

use crate::document::DidDocument;
use crate::error::Err;
use crate::resolver::{Resolution, Resolver};
use crate::{tracerr, Result};

type Handler = Arc<dyn Fn(&str) -> Result<DidDocument> + Send + Sync>;

/// A resolver that returns whatever document the test hands it.
#[derive(Clone, Default)]
pub struct TestResolver {
    handler: Arc<Mutex<Option<Handler>>>,
}

impl TestResolver {
    /// Create a resolver with no handler set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the function called whenever this resolver is asked to resolve a DID.
    pub fn set_handler(
        &self, handler: impl Fn(&str) -> Result<DidDocument> + Send + Sync + 'static,
    ) {
        *self.handler.lock().expect("lock on handler mutex failed") = Some(Arc::new(handler));
    }

    /// Remove the handler.
    pub fn reset_handler(&self) {
        *self.handler.lock().expect("lock on handler mutex failed") = None;
    }
}

impl Resolver for TestResolver {
    async fn resolve(&self, did: &str) -> Result<Resolution> {
        let handler = self.handler.lock().expect("lock on handler mutex failed").clone();
        let Some(handler) = handler else {
            tracerr!(Err::InvalidConfig, "TestResolver handler not set");
        };
        Ok(Resolution {
            did_document: handler(did)?,
            metadata: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn handler_lifecycle() {
        let resolver = TestResolver::new();
        let err = resolver.resolve("did:example:abc").await.expect_err("no handler");
        assert!(err.is(Err::InvalidConfig));

        resolver.set_handler(|did| {
            DidDocument::from_json(json!({"@context": crate::DID_CONTEXT, "id": did}))
        });
        let res = resolver.resolve("did:example:abc").await.expect("should resolve");
        assert_eq!(res.did_document.id, "did:example:abc");

        resolver.reset_handler();
        assert!(resolver.resolve("did:example:abc").await.is_err());
    }
}
