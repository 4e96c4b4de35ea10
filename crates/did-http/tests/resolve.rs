//! Resolution against a local stand-in for a universal resolver.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use did_core::error::Err;
use did_core::Resolver;
use did_http::{HttpResolver, HttpResolverOptions};
use serde_json::json;

async fn identifiers(Path(did): Path<String>) -> impl IntoResponse {
    match did.as_str() {
        "did:example:abc" => (
            StatusCode::OK,
            Json(json!({
                "document": {
                    "@context": "https://w3id.org/did/v1",
                    "id": "did:example:abc",
                    "publicKey": [{
                        "id": "#key-1",
                        "type": "EcdsaSecp256k1VerificationKey2019",
                        "controller": "did:example:abc",
                        "publicKeyHex": "02b97c30de767f084ce3080168ee293053ba33b235d7116a3263d29f1450936b71"
                    }],
                    "service": [{
                        "id": "did:example:abc#hub",
                        "type": "IdentityHub",
                        "serviceEndpoint": "https://hub.example.com"
                    }]
                },
                "resolverMetadata": {"driverId": "driver-example", "duration": 12}
            })),
        ),
        "did:example:malformed" => (
            StatusCode::OK,
            Json(json!({"document": {"id": "did:example:malformed"}})),
        ),
        "did:example:broken" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
        _ => (StatusCode::NOT_FOUND, Json(json!({}))),
    }
}

// Serve the resolver API on an ephemeral port and return its base URL.
async fn serve() -> String {
    let app = Router::new().route("/1.0/identifiers/:did", get(identifiers));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("failed to bind");
    let addr = listener.local_addr().expect("should have address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("failed to run server");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn resolves_document() {
    let resolver = HttpResolver::new(serve().await);
    let resolution = resolver.resolve("did:example:abc").await.expect("should resolve");

    let doc = resolution.did_document;
    assert_eq!(doc.id, "did:example:abc");
    assert!(doc.public_key("did:example:abc#key-1").is_some());
    assert_eq!(doc.services_by_type("IdentityHub").len(), 1);
    assert_eq!(resolution.metadata, Some(json!({"driverId": "driver-example", "duration": 12})));
}

#[tokio::test]
async fn trailing_slash() {
    let resolver = HttpResolver::new(format!("{}/", serve().await));
    resolver.resolve("did:example:abc").await.expect("should resolve");
}

#[tokio::test]
async fn not_found() {
    let resolver = HttpResolver::new(serve().await);
    let err = resolver.resolve("did:example:missing").await.expect_err("should fail");
    assert!(err.is(Err::NotFound));
    assert_eq!(err.to_string(), "Decentralized ID Document not found for did:example:missing");
}

#[tokio::test]
async fn resolver_error() {
    let resolver = HttpResolver::new(serve().await);
    let err = resolver.resolve("did:example:broken").await.expect_err("should fail");
    assert!(err.is(Err::ResolutionFailed));
    assert_eq!(err.to_string(), "Universal Resolver reported an error: Internal Server Error");
}

#[tokio::test]
async fn malformed_document() {
    let resolver = HttpResolver::new(serve().await);
    let err = resolver.resolve("did:example:malformed").await.expect_err("should fail");
    assert!(err.is(Err::InvalidFormat));
}

#[tokio::test]
async fn unreachable_resolver() {
    let resolver = HttpResolver::with_options(HttpResolverOptions {
        resolver_url: "http://127.0.0.1:9".to_string(),
        client: Some(reqwest::Client::new()),
        timeout: Some(std::time::Duration::from_secs(2)),
    });
    let err = resolver.resolve("did:example:abc").await.expect_err("should fail");
    assert!(err.is(Err::RequestError));
}
