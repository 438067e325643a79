//! Running signing requests against a key store, a device and a primitive.

use log::{debug, error};

use crate::encode;
use crate::error::Error;
use crate::key::{self, KeyHandle};
use crate::normalize;
use crate::request::SigningRequest;
use crate::signature::Signature;
use crate::traits::{DeviceSigner, KeyLookupError, KeyStore, SigningPrimitive};

/// An engine that creates signatures from signing requests.
///
/// Couples a [`KeyStore`], a [`DeviceSigner`] and a [`SigningPrimitive`] and
/// runs each request end to end: key lookup, algorithm classification, digest
/// encoding and the signing operation itself. Keys resolved to local material
/// are signed by the primitive, keys resolved to a device slot are signed
/// on the device and the returned raw buffer is normalized into signature
/// components.
///
/// # Examples
///
/// ```
/// use signet_sign::{
///     CacheMode,
///     DeviceError,
///     DeviceSigner,
///     DigestAlgorithm,
///     EncodedDigest,
///     KeyHandle,
///     KeyLookupError,
///     KeyMaterial,
///     KeyStore,
///     Keygrip,
///     PrimitiveError,
///     RequestDigest,
///     ShadowInfo,
///     Signature,
///     SigningEngine,
///     SigningPrimitive,
///     SigningRequest,
/// };
///
/// /// A key store without any keys.
/// #[derive(Debug)]
/// struct EmptyStore;
///
/// impl KeyStore for EmptyStore {
///     fn resolve(
///         &self,
///         _keygrip: &Keygrip,
///         _cache_nonce: Option<&str>,
///         _description: Option<&str>,
///         _cache_mode: CacheMode,
///         _ttl: Option<std::time::Duration>,
///     ) -> Result<KeyHandle, KeyLookupError> {
///         Err(KeyLookupError::NoSecretKey)
///     }
/// }
///
/// /// A backend that rejects every operation.
/// #[derive(Debug)]
/// struct NoBackend;
///
/// impl DeviceSigner for NoBackend {
///     fn sign_digest(
///         &self,
///         _data: &[u8],
///         _algorithm: &DigestAlgorithm,
///         _shadow_info: &ShadowInfo,
///     ) -> Result<Vec<u8>, DeviceError> {
///         Err(DeviceError {
///             context: "signing on a device",
///             source: "no device is connected".into(),
///         })
///     }
/// }
///
/// impl SigningPrimitive for NoBackend {
///     fn sign(
///         &self,
///         _digest: &EncodedDigest,
///         _key: &KeyMaterial,
///     ) -> Result<Signature, PrimitiveError> {
///         Err(PrimitiveError {
///             context: "creating a signature",
///             source: "no primitive is available".into(),
///         })
///     }
/// }
///
/// # fn main() -> testresult::TestResult {
/// let engine = SigningEngine::new(
///     Box::new(EmptyStore),
///     Box::new(NoBackend),
///     Box::new(NoBackend),
/// );
/// let request = SigningRequest::new(RequestDigest::new(DigestAlgorithm::Sha256, [0x4f; 32]))
///     .with_keygrip("5e2f2a5282b72f2ebfc588ff925c73a5a452ca19".parse()?);
///
/// assert!(matches!(
///     engine.sign(&request),
///     Err(signet_sign::Error::NoSecretKey)
/// ));
/// # Ok(())
/// # }
/// ```
pub struct SigningEngine {
    store: Box<dyn KeyStore>,
    device: Box<dyn DeviceSigner>,
    primitive: Box<dyn SigningPrimitive>,
}

impl SigningEngine {
    /// Creates a new signing engine from its three collaborators.
    pub fn new(
        store: Box<dyn KeyStore>,
        device: Box<dyn DeviceSigner>,
        primitive: Box<dyn SigningPrimitive>,
    ) -> Self {
        Self {
            store,
            device,
            primitive,
        }
    }

    /// Creates a signature for a signing request.
    ///
    /// Resolves the request's keygrip in the key store, classifies the key and
    /// either encodes the digest for the local primitive or hands the
    /// unencoded data to the device the key lives on. Device output is
    /// normalized into signed-magnitude components, the primitive is trusted
    /// to return them in that form already.
    ///
    /// Key material is dropped, and with it wiped, before the function
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if
    /// - the request carries no keygrip or no key exists for it
    ///   ([`Error::NoSecretKey`]),
    /// - the key store fails in any other way,
    /// - the key object cannot be classified,
    /// - the digest fails the encoding rules of the key's algorithm family,
    /// - the device or the primitive fails,
    /// - the buffer returned by the device is malformed.
    pub fn sign(&self, request: &SigningRequest) -> Result<Signature, Error> {
        let Some(keygrip) = request.keygrip() else {
            return Err(Error::NoSecretKey);
        };
        debug!("Create a signature with key {keygrip}");

        let handle = self
            .store
            .resolve(
                keygrip,
                request.cache_nonce(),
                request.description(),
                request.cache_mode(),
                request.cache_ttl(),
            )
            .map_err(|e| match e {
                KeyLookupError::NoSecretKey => Error::NoSecretKey,
                e => {
                    error!("failed to read the secret key: {e}");
                    Error::KeyLookup(e)
                }
            })?;
        let key_info = key::classify(handle.key())?;

        match &handle {
            KeyHandle::Diverted { shadow_info, .. } => {
                let raw = self
                    .device
                    .sign_digest(
                        request.data_to_sign(),
                        request.digest().algorithm(),
                        shadow_info,
                    )
                    .map_err(|e| {
                        error!("smartcard signing failed: {e}");
                        e
                    })?;
                Ok(normalize::from_device(key_info.family, &raw)?)
            }
            KeyHandle::Local(key) => {
                let digest = encode::encode_digest(request, &key_info)?;
                self.primitive.sign(&digest, key).map_err(|e| {
                    error!("signing failed: {e}");
                    e.into()
                })
            }
        }
    }
}

/// The engine's collaborators are trait objects without a [`Debug`] bound.
impl std::fmt::Debug for SigningEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningEngine").finish_non_exhaustive()
    }
}
