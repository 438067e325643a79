//! Normalization of raw device signatures.

use log::error;

use crate::key::KeyFamily;
use crate::signature::Signature;

/// An error that can occur when normalizing a raw device signature.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A two component signature buffer has an odd length.
    #[error("Cannot split a {length} byte {family} signature into two equally sized components")]
    UnevenSignatureBuffer {
        /// The family of the signing key.
        family: KeyFamily,
        /// The byte length of the returned buffer.
        length: usize,
    },

    /// Device signing is not implemented for this key family.
    #[error("Device signing is not implemented for {family} keys")]
    NotImplemented {
        /// The family of the signing key.
        family: KeyFamily,
    },
}

/// Converts an unsigned big-endian integer into signed-magnitude form.
///
/// Returns a copy of `value`, prefixed with a zero byte when the most
/// significant bit is set, so that the value cannot be mistaken for a
/// negative number.
///
/// # Examples
///
/// ```
/// use signet_sign::to_signed_magnitude;
///
/// assert_eq!(to_signed_magnitude(&[0x7f, 0xff]), [0x7f, 0xff]);
/// assert_eq!(to_signed_magnitude(&[0x80, 0x00]), [0x00, 0x80, 0x00]);
/// ```
pub fn to_signed_magnitude(value: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(value.len() + 1);
    if value.first().is_some_and(|byte| byte & 0x80 != 0) {
        bytes.push(0x00);
    }
    bytes.extend_from_slice(value);
    bytes
}

/// Normalizes the raw signature buffer returned by a signing device.
///
/// RSA devices return the complete signature integer, which becomes the `s`
/// component. ECDSA and EdDSA devices return the concatenation of the `r` and
/// `s` components in equal sizes. Every component is brought into
/// signed-magnitude form.
///
/// # Errors
///
/// Returns an [`Error`] if
/// - a two component buffer has an odd length and cannot be split,
/// - the family has no device signing support (DSA).
pub fn from_device(family: KeyFamily, buffer: &[u8]) -> Result<Signature, Error> {
    match family {
        KeyFamily::Rsa => Ok(Signature::Rsa {
            s: to_signed_magnitude(buffer),
        }),
        KeyFamily::Ecdsa | KeyFamily::EdDsa => {
            if buffer.len() % 2 != 0 {
                error!(
                    "the device returned an uneven {} byte {family} signature",
                    buffer.len()
                );
                return Err(Error::UnevenSignatureBuffer {
                    family,
                    length: buffer.len(),
                });
            }
            let (r, s) = buffer.split_at(buffer.len() / 2);
            let r = to_signed_magnitude(r);
            let s = to_signed_magnitude(s);
            Ok(if family == KeyFamily::Ecdsa {
                Signature::Ecdsa { r, s }
            } else {
                Signature::EdDsa { r, s }
            })
        }
        KeyFamily::Dsa => Err(Error::NotImplemented { family }),
    }
}
