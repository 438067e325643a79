//! Digest encoding for the signing primitives.

use log::warn;
use signet_sexp::Sexp;

use crate::key::{KeyAlgorithmInfo, KeyFamily};
use crate::normalize::to_signed_magnitude;
use crate::request::{DigestAlgorithm, SigningRequest};

/// The minimum number of `0xff` padding bytes in a PKCS#1 block type 1 frame.
const MIN_PKCS1_PADDING: usize = 8;

/// The maximum length of a hash algorithm name in a data S-expression.
const MAX_HASH_NAME_LEN: usize = 15;

/// The smallest group size considered safe for DSA and ECDSA, in bits.
const MIN_GROUP_BITS: u32 = 160;

/// The smallest digest an ECDSA key tolerates, in bytes.
const MIN_TOLERATED_ECDSA_DIGEST_LEN: usize = 20;

/// An error that can occur when encoding a digest for signing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A DSA key has a group size that is not byte aligned.
    #[error("DSA requires the hash length to be a multiple of 8 bits (got a {group_bits} bit group)")]
    InvalidGroupSize {
        /// The bit size of the DSA subgroup.
        group_bits: u32,
    },

    /// A key has an unsafely small group size.
    #[error("{family} key uses an unsafe ({group_bits} bit) group size")]
    UnsafeGroupSize {
        /// The family of the key.
        family: KeyFamily,
        /// The bit size of the subgroup or curve order.
        group_bits: u32,
    },

    /// A digest is too short for the key it is to be signed with.
    #[error("a {digest_bits} bit hash is not valid for a {group_bits} bit {family} key")]
    DigestTooShort {
        /// The bit size of the digest.
        digest_bits: usize,
        /// The bit size of the subgroup or curve order.
        group_bits: u32,
        /// The family of the key.
        family: KeyFamily,
    },

    /// A digest does not leave room for the padding of a PKCS#1 frame.
    #[error("a {digest_len} byte digest does not fit into a {frame_len} byte PKCS#1 frame")]
    FrameTooShort {
        /// The byte length of the digest.
        digest_len: usize,
        /// The byte length of the frame, dictated by the key's modulus.
        frame_len: usize,
    },

    /// A hash algorithm name is too long for a data S-expression.
    #[error("Hash algorithm name {name} exceeds {MAX_HASH_NAME_LEN} characters")]
    HashNameTooLong {
        /// The offending name.
        name: String,
    },
}

/// A digest encoded for one of the signing primitives.
///
/// The variants correspond to the data forms gcrypt compatible primitives
/// accept, see [`EncodedDigest::to_sexp`] for the exact rendering.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EncodedDigest {
    /// A hash signed with PKCS#1 v1.5 framing applied by the primitive.
    Pkcs1Hash {
        /// The lower cased hash algorithm name.
        algorithm: String,
        /// The digest bytes.
        digest: Vec<u8>,
    },

    /// A bare integer signed without any framing.
    RawValue {
        /// The big-endian value to sign.
        value: Vec<u8>,
    },

    /// A validated hash for DSA or ECDSA with deterministic nonces.
    Rfc6979Hash {
        /// The hash algorithm name used for nonce generation.
        algorithm: &'static str,
        /// The digest bytes, truncated to the group size where necessary.
        digest: Vec<u8>,
    },

    /// Data signed with EdDSA.
    EdDsaValue {
        /// The data to sign, passed on verbatim.
        value: Vec<u8>,
    },

    /// A complete, caller visible PKCS#1 block type 1 frame.
    RawPkcs1Frame {
        /// The frame, sized to the key's modulus.
        frame: Vec<u8>,
    },
}

impl EncodedDigest {
    /// Renders the encoded digest as the data S-expression handed to a
    /// gcrypt compatible signing primitive.
    ///
    /// The forms are:
    /// - `(data (flags pkcs1) (hash <algo> <digest>))`
    /// - `(data (flags) (value <value>))`
    /// - `(data (flags rfc6979) (hash <algo> <digest>))`
    /// - `(data (flags eddsa) (hash-algo sha512) (value <data>))`
    /// - `(data (flags raw) (value <frame>))`
    ///
    /// Bare integer values are rendered as standard format MPIs: leading
    /// zero bytes are stripped and a zero byte is prefixed when the most
    /// significant bit is set. Hash values, EdDSA data and PKCS#1 frames
    /// are rendered verbatim.
    pub fn to_sexp(&self) -> Sexp {
        match self {
            Self::Pkcs1Hash { algorithm, digest } => Sexp::list([
                Sexp::atom(*b"data"),
                Sexp::list([Sexp::atom(*b"flags"), Sexp::atom(*b"pkcs1")]),
                Sexp::list([
                    Sexp::atom(*b"hash"),
                    Sexp::atom(algorithm.as_bytes()),
                    Sexp::atom(digest.clone()),
                ]),
            ]),
            Self::RawValue { value } => Sexp::list([
                Sexp::atom(*b"data"),
                Sexp::list([Sexp::atom(*b"flags")]),
                Sexp::list([Sexp::atom(*b"value"), Sexp::atom(standard_mpi(value))]),
            ]),
            Self::Rfc6979Hash { algorithm, digest } => Sexp::list([
                Sexp::atom(*b"data"),
                Sexp::list([Sexp::atom(*b"flags"), Sexp::atom(*b"rfc6979")]),
                Sexp::list([
                    Sexp::atom(*b"hash"),
                    Sexp::atom(algorithm.as_bytes()),
                    Sexp::atom(digest.clone()),
                ]),
            ]),
            Self::EdDsaValue { value } => Sexp::list([
                Sexp::atom(*b"data"),
                Sexp::list([Sexp::atom(*b"flags"), Sexp::atom(*b"eddsa")]),
                Sexp::list([Sexp::atom(*b"hash-algo"), Sexp::atom(*b"sha512")]),
                Sexp::list([Sexp::atom(*b"value"), Sexp::atom(value.clone())]),
            ]),
            Self::RawPkcs1Frame { frame } => Sexp::list([
                Sexp::atom(*b"data"),
                Sexp::list([Sexp::atom(*b"flags"), Sexp::atom(*b"raw")]),
                Sexp::list([Sexp::atom(*b"value"), Sexp::atom(frame.clone())]),
            ]),
        }
    }
}

/// Builds the algorithm-correct data structure for signing a digest.
///
/// Selects the encoding from the key's family and the request: EdDSA keys
/// sign the data verbatim, the combined TLS 1.0 digest gets a raw PKCS#1
/// block type 1 frame, digests for DSA and ECDSA keys are validated against
/// the key's group size and truncated where needed and everything else is
/// signed as a PKCS#1 hash or, for raw requests, as a bare integer.
///
/// The data to encode is the request's override data if present and the
/// digest value otherwise.
///
/// # Errors
///
/// Returns an [`Error`] if
/// - a DSA key has a group size that is not byte aligned,
/// - a DSA or ECDSA key has a group size below 160 bits,
/// - the digest is shorter than the group size allows,
/// - the digest does not leave room for the padding of a raw PKCS#1 frame,
/// - the digest algorithm name is too long for a data S-expression.
pub fn encode_digest(
    request: &SigningRequest,
    key_info: &KeyAlgorithmInfo,
) -> Result<EncodedDigest, Error> {
    let data = request.data_to_sign();

    if key_info.family == KeyFamily::EdDsa {
        return Ok(EncodedDigest::EdDsaValue {
            value: data.to_vec(),
        });
    }

    if request.digest().algorithm() == &DigestAlgorithm::Md5Sha1 {
        return encode_raw_pkcs1(data, key_info.key_bits);
    }

    if matches!(key_info.family, KeyFamily::Dsa | KeyFamily::Ecdsa) {
        return encode_for_dsa(data, key_info);
    }

    if request.digest().is_raw() {
        return Ok(EncodedDigest::RawValue {
            value: data.to_vec(),
        });
    }

    encode_hash(request.digest().algorithm(), data)
}

/// Encodes a digest to be signed with PKCS#1 framing by the primitive.
fn encode_hash(algorithm: &DigestAlgorithm, digest: &[u8]) -> Result<EncodedDigest, Error> {
    let name = algorithm.name();
    if name.len() > MAX_HASH_NAME_LEN {
        return Err(Error::HashNameTooLong { name });
    }
    Ok(EncodedDigest::Pkcs1Hash {
        algorithm: name,
        digest: digest.to_vec(),
    })
}

/// Assembles a PKCS#1 block type 1 frame around an already framed digest.
///
/// The frame is `00 01 <0xff padding> 00 <digest>`, sized to the key's
/// modulus. The combined TLS 1.0 digest is signed this way as it carries no
/// digest info structure of its own. At least [`MIN_PKCS1_PADDING`] bytes of
/// padding must fit.
fn encode_raw_pkcs1(digest: &[u8], key_bits: u32) -> Result<EncodedDigest, Error> {
    let frame_len = (key_bits as usize).div_ceil(8);
    let padding = frame_len
        .checked_sub(digest.len())
        .and_then(|room| room.checked_sub(3))
        .unwrap_or(0);
    if digest.is_empty() || padding < MIN_PKCS1_PADDING {
        return Err(Error::FrameTooShort {
            digest_len: digest.len(),
            frame_len,
        });
    }

    let mut frame = Vec::with_capacity(frame_len);
    frame.push(0x00);
    frame.push(0x01);
    frame.extend(std::iter::repeat_n(0xff, padding));
    frame.push(0x00);
    frame.extend_from_slice(digest);
    debug_assert_eq!(frame.len(), frame_len);
    Ok(EncodedDigest::RawPkcs1Frame { frame })
}

/// Validates and truncates a digest for a DSA or ECDSA key.
///
/// DSA groups must be byte aligned and every group must have at least
/// [`MIN_GROUP_BITS`] bits. The digest must be at least as long as the group
/// size, except that ECDSA tolerates digests of
/// [`MIN_TOLERATED_ECDSA_DIGEST_LEN`] bytes and more with a warning, and
/// groups above 521 bits only require a 64 byte digest, the largest a common
/// hash produces. Longer digests keep their most significant bytes.
fn encode_for_dsa(digest: &[u8], key_info: &KeyAlgorithmInfo) -> Result<EncodedDigest, Error> {
    let group_bits = key_info.group_bits;
    if key_info.family == KeyFamily::Dsa && group_bits % 8 != 0 {
        return Err(Error::InvalidGroupSize { group_bits });
    }
    if group_bits < MIN_GROUP_BITS {
        return Err(Error::UnsafeGroupSize {
            family: key_info.family,
            group_bits,
        });
    }

    let group_len = group_bits as usize / 8;
    let min_len = if key_info.family == KeyFamily::Ecdsa && group_bits > 521 {
        64
    } else {
        group_len
    };
    if digest.len() < min_len {
        if key_info.family == KeyFamily::Dsa || digest.len() < MIN_TOLERATED_ECDSA_DIGEST_LEN {
            return Err(Error::DigestTooShort {
                digest_bits: digest.len() * 8,
                group_bits,
                family: key_info.family,
            });
        }
        warn!(
            "tolerating a {} bit hash for a {} bit {} key",
            digest.len() * 8,
            group_bits,
            key_info.family
        );
    }

    let truncated = &digest[..usize::min(group_len, digest.len())];
    Ok(EncodedDigest::Rfc6979Hash {
        algorithm: rfc6979_hash_name(truncated.len()),
        digest: truncated.to_vec(),
    })
}

/// Maps a digest length to the hash algorithm name used for deterministic
/// nonce generation.
///
/// Unknown lengths fall back to `sha256`.
fn rfc6979_hash_name(digest_len: usize) -> &'static str {
    match digest_len {
        20 => "sha1",
        28 => "sha224",
        32 => "sha256",
        48 => "sha384",
        64 => "sha512",
        _ => "sha256",
    }
}

/// Encodes bytes as a standard format MPI.
///
/// Leading zero bytes are stripped, then a zero byte is prefixed when the
/// most significant bit of the remaining value is set.
fn standard_mpi(value: &[u8]) -> Vec<u8> {
    let first = value
        .iter()
        .position(|byte| *byte != 0)
        .unwrap_or(value.len());
    to_signed_magnitude(&value[first..])
}
