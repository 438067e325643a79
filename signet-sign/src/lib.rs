//! A library for the signing core of a private key daemon.
//!
//! Covers the path from a digest to a signature in its S-expression wire
//! form: classifying key objects, encoding digests for gcrypt compatible
//! signing primitives (with the security validations the encodings require),
//! dispatching to a local primitive or to an external signing device and
//! normalizing device output into signed-magnitude signature components.
//!
//! The library does not implement signing arithmetic, key storage or
//! passphrase handling itself. Those are provided by implementations of the
//! [`KeyStore`], [`DeviceSigner`] and [`SigningPrimitive`] traits, which a
//! [`SigningEngine`] couples into one signing operation:
//!
//! - A [`SigningRequest`] names a key by [`Keygrip`] and carries the digest
//!   to sign together with passphrase cache hints for the key store.
//! - [`classify_key`] derives a key object's [algorithm family][KeyFamily]
//!   and sizes, which select the digest encoding.
//! - [`encode_digest`] builds the [`EncodedDigest`] a primitive consumes:
//!   PKCS#1 framing for RSA, validated and truncated digests for DSA and
//!   ECDSA, verbatim data for EdDSA and a raw PKCS#1 frame for the combined
//!   TLS 1.0 digest.
//! - [`Signature::write_canonical`] renders the result as a canonical
//!   `sig-val` S-expression.
//!
//! S-expression parsing and rendering live in the companion crate
//! [`signet_sexp`].
//!
//! # Examples
//!
//! ```
//! use signet_sign::{
//!     DigestAlgorithm,
//!     EncodedDigest,
//!     KeyAlgorithmInfo,
//!     KeyFamily,
//!     RequestDigest,
//!     SigningRequest,
//!     encode_digest,
//! };
//!
//! # fn main() -> testresult::TestResult {
//! // A SHA-256 digest for a NIST P-256 key is signed with deterministic
//! // nonce derivation and keeps its full length.
//! let request = SigningRequest::new(RequestDigest::new(DigestAlgorithm::Sha256, [0x11; 32]));
//! let key_info = KeyAlgorithmInfo {
//!     family: KeyFamily::Ecdsa,
//!     group_bits: 256,
//!     key_bits: 256,
//! };
//!
//! assert_eq!(
//!     encode_digest(&request, &key_info)?,
//!     EncodedDigest::Rfc6979Hash {
//!         algorithm: "sha256",
//!         digest: vec![0x11; 32],
//!     }
//! );
//! # Ok(())
//! # }
//! ```

mod dispatch;
mod encode;
mod error;
mod key;
mod normalize;
mod request;
mod signature;
mod traits;

pub use dispatch::SigningEngine;
pub use encode::{EncodedDigest, Error as EncodeError, encode_digest};
pub use error::Error;
pub use key::{
    Error as KeyError,
    KeyAlgorithmInfo,
    KeyFamily,
    KeyHandle,
    KeyMaterial,
    Keygrip,
    ShadowInfo,
    classify as classify_key,
};
pub use normalize::{
    Error as NormalizeError,
    from_device as normalize_device_signature,
    to_signed_magnitude,
};
pub use request::{CacheMode, DigestAlgorithm, RequestDigest, SigningRequest};
pub use signature::Signature;
pub use traits::{
    DeviceError,
    DeviceSigner,
    KeyLookupError,
    KeyStore,
    PrimitiveError,
    SigningPrimitive,
};
