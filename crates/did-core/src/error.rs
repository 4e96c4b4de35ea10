//! # DID Core Errors
//!
//! This module defines the error types used by the DID Core library and by the crates built on it
//! (key derivation, HTTP resolution). Every failure carries one of the [`Err`] codes so callers can
//! inspect what went wrong without parsing messages.

use std::fmt::Display;

use thiserror::Error;

/// Simplify creation of errors with tracing.
///
/// # Example
/// ```
/// use did_core::error::Err;
/// use did_core::{tracerr, Result};
///
/// fn with_msg() -> Result<()> {
///     tracerr!(Err::InvalidFormat, "message: {}", "some message")
/// }
///
/// fn no_msg() -> Result<()> {
///     tracerr!(Err::InvalidFormat)
/// }
/// ```
#[macro_export]
macro_rules! tracerr {
    // with context
    ($code:expr, $($msg:tt)*) => {
        {
        use $crate::error::Context as _;
        tracing::error!($($msg)*);
        return Err($code).context(format!($($msg)*));
        }
    };
    // no context
    ($code:expr) => {
        {
        tracing::error!("{}", $code);
        return Err($code.into());
        }
    }
}

/// Public error type for DID Core.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] anyhow::Error);

impl Error {
    /// Transfer the error to `OAuth2` compatible format.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.0.root_cause().to_string(),
            "error_description": self.to_string(),
        })
    }

    /// Returns true if `err` is the code held by this error object.
    #[must_use]
    pub fn is(&self, err: Err) -> bool {
        self.0.downcast_ref::<Err>().is_some_and(|e| e == &err)
    }

    /// The error code held by this error object, if any.
    #[must_use]
    pub fn code(&self) -> Option<Err> {
        self.0.downcast_ref::<Err>().copied()
    }
}

/// Typed errors for DID Core.
#[derive(Clone, Copy, Error, Debug, PartialEq, Eq)]
pub enum Err {
    /// Invalid format. (See context for details)
    #[error("invalid_format")]
    InvalidFormat,

    /// Invalid key is where the format of the key is incorrect or cannot be used for the
    /// requested operation.
    #[error("invalid_key")]
    InvalidKey,

    /// Key not found in a DID document or key store.
    #[error("key_not_found")]
    KeyNotFound,

    /// An error occurred trying to deserialize data.
    #[error("deserialization_error")]
    DeserializationError,

    /// An error occurred trying to serialize data.
    #[error("serialization_error")]
    SerializationError,

    /// Environment configuration could not be resolved.
    #[error("invalid_config")]
    InvalidConfig,

    /// Request failed. This is used when a request to a downstream API fails to connect or get a
    /// response.
    #[error("request_error")]
    RequestError,

    /// A requested algorithm is not supported by the crypto provider.
    #[error("unsupported_algorithm")]
    UnsupportedAlgorithm,

    /// No DID document was found for the requested DID.
    #[error("not_found")]
    NotFound,

    /// The resolver reported an error other than the document not being found.
    #[error("resolution_failed")]
    ResolutionFailed,

    /// The key type has no key material resolution path.
    #[error("unsupported_key_type")]
    UnsupportedKeyType,

    /// Pairwise derivation was requested for a key type that does not support it.
    #[error("unsupported_pairwise_key_type")]
    UnsupportedPairwiseKeyType,

    /// Key use value outside of `sig` and `enc`.
    #[error("invalid_key_use")]
    InvalidKeyUse,

    /// Signing was requested on a key that holds no private or secret half.
    #[error("no_signing_key")]
    NoSigningKey,

    /// Verification was requested on a key that holds no public or secret half.
    #[error("no_verification_key")]
    NoVerificationKey,

    /// Master key material is too short to derive a pairwise key from.
    #[error("insufficient_seed_material")]
    InsufficientSeedMaterial,

    /// The underlying crypto provider failed.
    #[error("crypto_provider_error")]
    CryptoProvider,
}

/// Context is used to decorate errors with useful context information.
pub trait Context<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Adds context to the error.
    ///
    /// # Errors
    ///
    /// * Original error with context appended.
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E> Context<T, E> for core::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(e) => Err(Error(anyhow::Error::from(e).context(context))),
        }
    }
}

impl From<Err> for Error {
    fn from(error: Err) -> Self {
        Self(error.into())
    }
}

impl From<base64ct::Error> for Error {
    fn from(err: base64ct::Error) -> Self {
        Self(anyhow::Error::from(err).context(Err::InvalidFormat))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self(anyhow::Error::from(err).context(Err::DeserializationError))
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    use super::*;
    use crate::Result;

    #[test]
    fn base_err() {
        let err: Error = Err::InvalidFormat.into();

        assert_eq!(
            err.to_json(),
            json!({"error":"invalid_format","error_description":"invalid_format"})
        );
        assert!(err.is(Err::InvalidFormat));
        assert!(!err.is(Err::InvalidKey));
    }

    #[test]
    fn context_err() {
        let res: Result<()> = Err(Err::NoSigningKey).context("public key only");
        let err = res.expect_err("expected error");

        assert_eq!(
            err.to_json(),
            json!({"error":"no_signing_key","error_description":"public key only"})
        );
        assert_eq!(err.code(), Some(Err::NoSigningKey));
    }

    #[test]
    fn foreign_err_keeps_code() {
        let res: Result<serde_json::Value> =
            serde_json::from_str("{not json").map_err(Into::into);
        let err = res.expect_err("expected error");
        assert!(err.is(Err::DeserializationError));
    }

    #[test]
    fn test_macro() {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("setting subscriber failed");

        let Err(e) = run_macro() else {
            panic!("expected error");
        };

        assert_eq!(e.to_string(), "test me");
        assert!(e.is(Err::InsufficientSeedMaterial));
    }

    fn run_macro() -> Result<()> {
        tracerr!(Err::InsufficientSeedMaterial, "test {}", "me")
    }
}
