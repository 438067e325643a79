//! Interfaces to the key store, the signing device and the signing primitive.

use std::time::Duration;

use crate::encode::EncodedDigest;
use crate::key::{KeyHandle, KeyMaterial, Keygrip, ShadowInfo};
use crate::request::{CacheMode, DigestAlgorithm};
use crate::signature::Signature;

/// An error that can occur when looking up a key.
#[derive(Debug, thiserror::Error)]
pub enum KeyLookupError {
    /// No private key exists for the requested keygrip.
    #[error("No secret key is available")]
    NoSecretKey,

    /// The key store failed.
    #[error("Key store failure while {context}:\n{source}")]
    Backend {
        /// The context in which the error occurred.
        ///
        /// This is meant to complete the sentence "Key store failure while ".
        context: &'static str,
        /// The source error.
        source: Box<dyn std::error::Error + 'static + Send + Sync>,
    },
}

/// An error that can occur when signing on an external device.
#[derive(Debug, thiserror::Error)]
#[error("Device failure while {context}:\n{source}")]
pub struct DeviceError {
    /// The context in which the error occurred.
    ///
    /// This is meant to complete the sentence "Device failure while ".
    pub context: &'static str,
    /// The source error.
    pub source: Box<dyn std::error::Error + 'static + Send + Sync>,
}

/// An error that can occur in a local signing primitive.
#[derive(Debug, thiserror::Error)]
#[error("Signing failed while {context}:\n{source}")]
pub struct PrimitiveError {
    /// The context in which the error occurred.
    ///
    /// This is meant to complete the sentence "Signing failed while ".
    pub context: &'static str,
    /// The source error.
    pub source: Box<dyn std::error::Error + 'static + Send + Sync>,
}

/// A store that resolves keygrips to private keys.
///
/// Implementations cover reading key files, decrypting protected keys and
/// passphrase caching. The engine treats all of that as a black box and only
/// distinguishes between "no such key" and any other failure.
pub trait KeyStore {
    /// Resolves a keygrip to a private key.
    ///
    /// `cache_nonce`, `description`, `cache_mode` and `ttl` are passphrase
    /// cache hints and prompt texts the store is free to use or ignore.
    ///
    /// # Errors
    ///
    /// Returns [`KeyLookupError::NoSecretKey`] if no key exists for `keygrip`
    /// and [`KeyLookupError::Backend`] for any other failure.
    fn resolve(
        &self,
        keygrip: &Keygrip,
        cache_nonce: Option<&str>,
        description: Option<&str>,
        cache_mode: CacheMode,
        ttl: Option<Duration>,
    ) -> Result<KeyHandle, KeyLookupError>;
}

/// A signing device holding the keys referenced by shadowed key objects.
pub trait DeviceSigner {
    /// Signs `data` with the device key described by `shadow_info`.
    ///
    /// The data is passed without any framing. `algorithm` names the digest
    /// algorithm the data was created with. The device returns the raw
    /// signature: the complete integer for RSA keys and the concatenation
    /// of two equally sized components for ECDSA and EdDSA keys.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceError`] if the device rejects the operation or
    /// communication fails. The engine propagates the error without retrying.
    fn sign_digest(
        &self,
        data: &[u8],
        algorithm: &DigestAlgorithm,
        shadow_info: &ShadowInfo,
    ) -> Result<Vec<u8>, DeviceError>;
}

/// A local signing primitive operating on encoded digests.
pub trait SigningPrimitive {
    /// Signs an encoded digest with local private key material.
    ///
    /// The implementation performs the signing arithmetic and returns final
    /// signature components in signed-magnitude form.
    ///
    /// # Errors
    ///
    /// Returns a [`PrimitiveError`] if the key material cannot be used or the
    /// signing arithmetic fails.
    fn sign(
        &self,
        digest: &EncodedDigest,
        key: &KeyMaterial,
    ) -> Result<Signature, PrimitiveError>;
}
