//! Publish a pairwise key in a DID document and resolve it back through a test resolver.

use std::sync::Arc;

use did_pairwise::document::{DidDocument, PublicKeyFormat};
use did_pairwise::error::Err;
use did_pairwise::keyring::{Algorithm, DidKey, EphemeralCrypto, KeySource, KeyType, KeyUse};
use did_pairwise::test_utils::TestResolver;
use did_pairwise::Resolver;
use serde_json::json;

const SUBJECT: &str = "did:example:abc";
const PEER: &str = "did:example:peer1";

#[tokio::test]
async fn peer_verifies_with_resolved_key() {
    let key = DidKey::new(
        Arc::new(EphemeralCrypto::new()),
        Algorithm::ecdsa("P-256", "SHA-256"),
        KeyType::Ec,
        KeyUse::Signature,
        KeySource::Generate,
    );
    let pairwise = key.derive_pairwise(&[42u8; 32], SUBJECT, PEER).await.expect("should derive");
    let public = pairwise.public_jwk().await.expect("should export");

    // the document the subject shares with this peer only
    let doc = DidDocument::from_json(json!({
        "@context": "https://w3id.org/did/v1",
        "id": SUBJECT,
        "publicKey": [{
            "id": "#pairwise",
            "type": "EcdsaSecp256r1VerificationKey2019",
            "controller": SUBJECT,
            "publicKeyJwk": public,
        }]
    }))
    .expect("should parse");

    let resolver = TestResolver::new();
    resolver.set_handler(move |did| {
        assert_eq!(did, SUBJECT);
        Ok(doc.clone())
    });

    let resolution = resolver.resolve(SUBJECT).await.expect("should resolve");
    let entry =
        resolution.did_document.public_key("did:example:abc#pairwise").expect("should find key");
    let PublicKeyFormat::Jwk(jwk) = &entry.key else {
        panic!("should be a JWK");
    };

    let verifier = DidKey::new(
        Arc::new(EphemeralCrypto::new()),
        Algorithm::ecdsa("P-256", "SHA-256"),
        KeyType::Ec,
        KeyUse::Signature,
        KeySource::Jwk(serde_json::from_value(jwk.clone()).expect("should deserialize")),
    );
    let sig = pairwise.sign(b"hello peer").await.expect("should sign");
    assert!(verifier.verify(b"hello peer", &sig).await.expect("should verify"));

    resolver.reset_handler();
    let err = resolver.resolve(SUBJECT).await.expect_err("should fail");
    assert!(err.is(Err::InvalidConfig));
}
