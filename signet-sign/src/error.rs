//! Error handling for the signing engine.

/// An error that may occur when dispatching a signing request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No private key is available for the request.
    ///
    /// Either the request carries no keygrip or the key store knows no key
    /// for it. This is an expected terminal outcome and not logged by the
    /// engine.
    #[error("No secret key is available")]
    NoSecretKey,

    /// An error with a key occurred.
    #[error("Key error: {0}")]
    Key(#[from] crate::key::Error),

    /// A digest could not be encoded for signing.
    #[error("Digest encoding error: {0}")]
    Encode(#[from] crate::encode::Error),

    /// A raw device signature could not be normalized.
    #[error("Signature normalization error: {0}")]
    Normalize(#[from] crate::normalize::Error),

    /// Retrieving the private key from the key store failed.
    #[error("Key lookup error: {0}")]
    KeyLookup(crate::traits::KeyLookupError),

    /// Signing on the external device failed.
    #[error("Device signing error: {0}")]
    Device(#[from] crate::traits::DeviceError),

    /// The local signing primitive failed.
    #[error("Signing error: {0}")]
    Primitive(#[from] crate::traits::PrimitiveError),
}
