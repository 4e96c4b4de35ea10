//! # DID HTTP Resolver
//!
//! Resolves DIDs of any method through a universal resolver: a service exposing
//! `GET <base>/1.0/identifiers/<did>` that answers with
//! `{"document": <DID document>, "resolverMetadata": {...}}`.
//!
//! ```no_run
//! use did_core::Resolver;
//! use did_http::HttpResolver;
//!
//! # async fn run() -> did_core::Result<()> {
//! let resolver = HttpResolver::new("https://resolver.example.com");
//! let resolution = resolver.resolve("did:example:abc").await?;
//! println!("{}", resolution.did_document.id);
//! # Ok(())
//! # }
//! ```

mod resolver;

pub use resolver::{HttpResolver, HttpResolverOptions, RESOLVER_TIMEOUT_ENV, RESOLVER_URL_ENV};
